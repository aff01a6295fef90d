// Shared helpers for integration tests.
//
// Provides a temporary sandbox holding a dotfiles directory and a fake home
// directory, and runs configuration through the real loader, dispatcher, and
// built-in plugins with an in-memory log.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotlink::config::load_tasks;
use dotlink::dispatcher::Dispatcher;
use dotlink::logging::MemoryLog;
use dotlink::plugins::{Context, PluginRegistry};

/// A dotfiles directory and a home directory under one [`tempfile::TempDir`].
///
/// Both paths are canonical so that symlink destinations compare equal to
/// the paths the engine computes.
pub struct Sandbox {
    tmp: tempfile::TempDir,
    /// Canonical root of the sandbox.
    pub root: PathBuf,
    /// Base directory holding the sources.
    pub dotfiles: PathBuf,
    /// Directory receiving the links.
    pub home: PathBuf,
    /// Log shared by every run in this sandbox.
    pub log: Arc<MemoryLog>,
}

impl Sandbox {
    /// Create an empty sandbox.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(tmp.path()).expect("canonicalize temp dir");
        let dotfiles = root.join("dotfiles");
        let home = root.join("home");
        fs::create_dir_all(&dotfiles).expect("create dotfiles dir");
        fs::create_dir_all(&home).expect("create home dir");
        Self {
            tmp,
            root,
            dotfiles,
            home,
            log: Arc::new(MemoryLog::new()),
        }
    }

    /// Write a source file under the dotfiles directory, creating parents.
    pub fn with_source(self, relative: &str, contents: &str) -> Self {
        let path = self.dotfiles.join(relative);
        fs::create_dir_all(path.parent().expect("source has a parent")).expect("create parent");
        fs::write(&path, contents).expect("write source");
        self
    }

    /// Write a config file into the dotfiles directory.
    ///
    /// `$HOME_DIR` in `body` is replaced by the sandbox home directory.
    pub fn config(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dotfiles.join(name);
        let body = body.replace("$HOME_DIR", &self.home.display().to_string());
        fs::write(&path, body).expect("write config");
        path
    }

    /// A fresh context rooted at the dotfiles directory.
    pub fn context(&self) -> Context {
        Context::new(&self.dotfiles, self.log.clone()).expect("create context")
    }

    /// Load `configs` and dispatch them through the built-in plugins.
    pub fn apply(&self, configs: &[PathBuf], dispatcher: Dispatcher, dry_run: bool) -> bool {
        let tasks = load_tasks(configs, self.log.as_ref()).expect("load tasks");
        let mut ctx = self.context().with_dry_run(dry_run);
        dispatcher.dispatch(&tasks, &mut ctx)
    }

    /// Write `body` as `install.conf.yaml` and apply it.
    pub fn run(&self, body: &str) -> bool {
        let config = self.config("install.conf.yaml", body);
        self.apply(&[config], Dispatcher::new(PluginRegistry::builtins()), false)
    }

    /// Write `body` as `install.conf.yaml` and apply it as a dry run.
    pub fn dry_run(&self, body: &str) -> bool {
        let config = self.config("install.conf.yaml", body);
        self.apply(&[config], Dispatcher::new(PluginRegistry::builtins()), true)
    }

    /// Path under the home directory.
    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }

    /// Every path under the sandbox with its kind and, for links, destination.
    ///
    /// Used to prove that a run left the filesystem untouched.
    pub fn snapshot(&self) -> Vec<String> {
        let mut out = Vec::new();
        walk(&self.root, &self.root, &mut out);
        out.sort();
        out
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        let shown = path.strip_prefix(root).expect("under root").display().to_string();
        let meta = fs::symlink_metadata(&path).expect("metadata");
        if meta.is_symlink() {
            let dest = fs::read_link(&path).expect("read link");
            out.push(format!("link {shown} -> {}", dest.display()));
        } else if meta.is_dir() {
            out.push(format!("dir  {shown}"));
            walk(root, &path, out);
        } else {
            let contents = fs::read_to_string(&path).unwrap_or_default();
            out.push(format!("file {shown} ({contents})"));
        }
    }
}
