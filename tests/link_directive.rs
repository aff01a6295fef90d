#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing
)]
//! Integration tests for the `link` directive.
//!
//! These run configuration through the loader, the dispatcher, and the
//! built-in plugins against a temporary dotfiles tree and home directory,
//! and check the reconciliation properties end to end: idempotence, relative
//! payloads, glob expansion, the self-deletion guard, and dry-run purity.
#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::{MetadataExt as _, symlink};
use std::path::PathBuf;

use common::Sandbox;
use dotlink::dispatcher::Dispatcher;
use dotlink::plugins::PluginRegistry;

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

/// Applying the same configuration twice changes nothing the second time.
#[test]
fn second_apply_is_a_no_op() {
    let sb = Sandbox::new()
        .with_source("vimrc", "set number")
        .with_source("config/git/config", "[user]");
    let body = "- link:\n    $HOME_DIR/.vimrc:\n    $HOME_DIR/.config/git: {path: config/git, create: true}\n";

    assert!(sb.run(body));
    let after_first = sb.snapshot();
    let created = sb.log.messages().iter().filter(|m| m.starts_with("Creating symlink")).count();
    assert_eq!(created, 2);

    assert!(sb.run(body));
    assert_eq!(sb.snapshot(), after_first);
    let created_again = sb.log.messages().iter().filter(|m| m.starts_with("Creating symlink")).count();
    assert_eq!(created_again, 2, "second run must not create anything");
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A relative link from `home/.f` to `dotfiles/f` records `../dotfiles/f`.
#[test]
fn relative_payload_is_computed_from_target_directory() {
    let sb = Sandbox::new().with_source("f", "");
    assert!(sb.run("- link:\n    $HOME_DIR/.f: {path: f, relative: true}\n"));
    assert_eq!(
        fs::read_link(sb.home_path(".f")).unwrap(),
        PathBuf::from("../dotfiles/f")
    );
}

/// With `canonicalize: false` the payload keeps a symlinked base directory.
#[test]
fn canonicalize_false_keeps_literal_base() {
    let sb = Sandbox::new().with_source("zshrc", "");
    let alias = sb.root.join("alias");
    symlink(&sb.dotfiles, &alias).unwrap();
    let config = sb.config("install.conf.yaml", "- link:\n    $HOME_DIR/.zshrc: {canonicalize: false}\n    $HOME_DIR/.zshenv: zshrc\n");

    let tasks = dotlink::config::load_tasks(&[config], sb.log.as_ref()).unwrap();
    let mut ctx = dotlink::plugins::Context::new(&alias, sb.log.clone()).unwrap();
    assert!(Dispatcher::new(PluginRegistry::builtins()).dispatch(&tasks, &mut ctx));

    assert_eq!(fs::read_link(sb.home_path(".zshrc")).unwrap(), alias.join("zshrc"));
    assert_eq!(
        fs::read_link(sb.home_path(".zshenv")).unwrap(),
        sb.dotfiles.join("zshrc")
    );
}

// ---------------------------------------------------------------------------
// Globbing
// ---------------------------------------------------------------------------

/// A glob links every match except the excluded ones, with the prefix applied.
#[test]
fn glob_links_matches_minus_exclusions() {
    let sb = Sandbox::new()
        .with_source("bin/alpha", "")
        .with_source("bin/beta", "")
        .with_source("bin/gamma", "")
        .with_source("bin/.hidden", "");
    assert!(sb.run(
        "- link:\n    $HOME_DIR/bin/:\n      path: bin/*\n      glob: true\n      create: true\n      exclude: [bin/beta]\n"
    ));
    assert_eq!(
        fs::read_link(sb.home_path("bin/alpha")).unwrap(),
        sb.dotfiles.join("bin/alpha")
    );
    assert!(sb.home_path("bin/gamma").is_symlink());
    assert!(!sb.home_path("bin/beta").exists());
    assert!(!sb.home_path("bin/.hidden").exists());
}

/// A recursive glob yields files only and keeps their nested layout.
#[test]
fn recursive_glob_links_files_under_nested_targets() {
    let sb = Sandbox::new()
        .with_source("conf/a/one", "")
        .with_source("conf/a/b/two", "");
    assert!(sb.run(
        "- link:\n    $HOME_DIR/.conf/: {path: conf/**, glob: true, create: true}\n"
    ));
    assert!(sb.home_path(".conf/a/one").is_symlink());
    assert!(sb.home_path(".conf/a/b/two").is_symlink());
    assert!(!sb.home_path(".conf/a").is_symlink());
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// A symlink to somewhere else is left alone unless `relink` is set.
#[test]
fn foreign_symlink_is_replaced_only_with_relink() {
    let sb = Sandbox::new().with_source("bashrc", "");
    let foreign = sb.root.join("foreign");
    fs::write(&foreign, "").unwrap();
    symlink(&foreign, sb.home_path(".bashrc")).unwrap();

    assert!(!sb.run("- link:\n    $HOME_DIR/.bashrc:\n"));
    assert_eq!(fs::read_link(sb.home_path(".bashrc")).unwrap(), foreign);
    assert!(sb.log.warnings().iter().any(|w| w.starts_with("Incorrect link")));

    assert!(sb.run("- defaults:\n    link: {relink: true}\n- link:\n    $HOME_DIR/.bashrc:\n"));
    assert_eq!(
        fs::read_link(sb.home_path(".bashrc")).unwrap(),
        sb.dotfiles.join("bashrc")
    );
}

/// A regular file is replaced only with `force`, and never when the source is missing.
#[test]
fn force_replaces_files_but_not_for_missing_sources() {
    let sb = Sandbox::new().with_source("gitconfig", "");
    fs::write(sb.home_path(".gitconfig"), "local").unwrap();
    fs::write(sb.home_path(".missing"), "keep").unwrap();

    assert!(!sb.run("- link:\n    $HOME_DIR/.gitconfig: {force: true}\n    $HOME_DIR/.missing: {force: true}\n"));
    assert!(sb.home_path(".gitconfig").is_symlink());
    assert_eq!(fs::read_to_string(sb.home_path(".missing")).unwrap(), "keep");
}

/// A target reached through a symlinked ancestor is never deleted, even with `force`.
#[test]
fn self_deletion_guard_protects_source() {
    let sb = Sandbox::new().with_source("config/app/settings", "precious");
    symlink(sb.dotfiles.join("config"), sb.home_path(".config")).unwrap();

    assert!(!sb.run("- link:\n    $HOME_DIR/.config/app/settings: {path: config/app/settings, force: true}\n"));
    assert_eq!(
        fs::read_to_string(sb.dotfiles.join("config/app/settings")).unwrap(),
        "precious"
    );
    assert!(sb.log.contains("appears to be the same file"));
}

// ---------------------------------------------------------------------------
// Hard links
// ---------------------------------------------------------------------------

/// Hard links are created once and then recognized by inode.
#[test]
fn hardlink_is_idempotent_by_inode() {
    let sb = Sandbox::new().with_source("profile", "export A=1");
    let body = "- link:\n    $HOME_DIR/.profile: {type: hardlink}\n";
    assert!(sb.run(body));
    assert!(sb.run(body));

    let target = fs::metadata(sb.home_path(".profile")).unwrap();
    let source = fs::metadata(sb.dotfiles.join("profile")).unwrap();
    assert!(!sb.home_path(".profile").is_symlink());
    assert_eq!(target.ino(), source.ino());
    assert_eq!(target.dev(), source.dev());
    assert_eq!(
        sb.log.messages().iter().filter(|m| m.starts_with("Creating hardlink")).count(),
        1
    );
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// A dry run with force, relink, create, and clean leaves the tree untouched.
#[test]
fn dry_run_mutates_nothing() {
    let sb = Sandbox::new()
        .with_source("vimrc", "")
        .with_source("themes/dark", "");
    fs::write(sb.home_path(".vimrc"), "local").unwrap();
    symlink(sb.dotfiles.join("gone"), sb.home_path(".stale")).unwrap();
    let config = sb.config(
        "install.conf.yaml",
        "- defaults:\n    link: {force: true, relink: true, create: true}\n\
         - clean: [$HOME_DIR]\n\
         - create: [$HOME_DIR/.cache]\n\
         - link:\n    $HOME_DIR/.vimrc:\n    $HOME_DIR/.themes/: {path: themes/*, glob: true}\n\
         - shell: [touch $HOME_DIR/ran]\n",
    );

    let before = sb.snapshot();
    assert!(sb.apply(&[config], Dispatcher::new(PluginRegistry::builtins()), true));
    assert_eq!(sb.snapshot(), before);
    assert!(!sb.log.dry_runs().is_empty());
}

/// Unknown link types fail the directive before any target is touched.
#[test]
fn unknown_link_type_fails_whole_directive() {
    let sb = Sandbox::new().with_source("vimrc", "");
    assert!(!sb.run("- link:\n    $HOME_DIR/.vimrc:\n    $HOME_DIR/.other: {path: vimrc, type: softlink}\n"));
    assert!(!sb.home_path(".vimrc").exists());
    assert!(sb.log.contains("The link type is not recognized: 'softlink'"));
}
