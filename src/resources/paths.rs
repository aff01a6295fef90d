//! Lexical path helpers shared by the link engine and the other directives.
use std::path::{Component, Path, PathBuf};

/// Expand `$VAR`/`${VAR}` references and a leading `~` in `raw`.
///
/// Undefined variables are left in place rather than treated as errors.
#[must_use]
pub fn expand_user(raw: &str) -> String {
    let vars = shellexpand::env_with_context_no_errors(raw, |name| std::env::var(name).ok());
    shellexpand::tilde(vars.as_ref()).into_owned()
}

/// Normalize `path` without touching the filesystem.
///
/// Drops `.` components and trailing separators, and folds `..` into the
/// preceding component. Leading `..` components of a relative path are kept;
/// `..` directly under the root is dropped.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => out.push(comp),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Resolve `path` against `base` when relative, then normalize it.
#[must_use]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexical relative path from the directory containing `target` to `source`.
///
/// Works whether or not `source` exists. Falls back to `source` itself when
/// no relative path can be expressed (e.g. different Windows drives).
#[must_use]
pub fn relative_payload(source: &Path, target: &Path) -> PathBuf {
    let target = normalize(target);
    let dir = target.parent().unwrap_or(&target);
    match pathdiff::diff_paths(normalize(source), dir) {
        Some(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Some(rel) => rel,
        None => source.to_path_buf(),
    }
}

/// Strip a Windows extended-length prefix (`\\?\`) from `path`.
#[must_use]
pub fn strip_verbatim(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    s.strip_prefix(r"\\?\")
        .map_or_else(|| path.to_path_buf(), PathBuf::from)
}

/// Compare two paths, ignoring extended-length prefixes.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    strip_verbatim(a) == strip_verbatim(b)
}

/// Whether `path` lies inside `directory`, compared component-wise.
#[must_use]
pub fn is_within(path: &Path, directory: &Path) -> bool {
    normalize(&strip_verbatim(path)).starts_with(normalize(&strip_verbatim(directory)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c/")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn absolutize_joins_relative_paths() {
        let base = Path::new("/root/dotfiles");
        assert_eq!(
            absolutize(Path::new("../home/.vimrc"), base),
            PathBuf::from("/root/home/.vimrc")
        );
        assert_eq!(
            absolutize(Path::new("/etc/hosts"), base),
            PathBuf::from("/etc/hosts")
        );
    }

    #[test]
    fn relative_payload_is_lexical() {
        let payload = relative_payload(
            Path::new("/root/dotfiles/f"),
            Path::new("/root/home/.f"),
        );
        assert_eq!(payload, PathBuf::from("../dotfiles/f"));
    }

    #[test]
    fn relative_payload_nested_target() {
        let payload = relative_payload(
            Path::new("/root/dotfiles/config/nvim"),
            Path::new("/root/home/.config/nvim"),
        );
        assert_eq!(payload, PathBuf::from("../../dotfiles/config/nvim"));
    }

    #[test]
    fn strip_verbatim_only_touches_prefix() {
        assert_eq!(
            strip_verbatim(Path::new(r"\\?\C:\dotfiles\vimrc")),
            PathBuf::from(r"C:\dotfiles\vimrc")
        );
        assert_eq!(
            strip_verbatim(Path::new("/dotfiles/vimrc")),
            PathBuf::from("/dotfiles/vimrc")
        );
        assert!(paths_equal(
            Path::new(r"\\?\C:\x"),
            Path::new(r"C:\x")
        ));
    }

    #[test]
    fn is_within_compares_components() {
        assert!(is_within(Path::new("/dotfiles/vim/vimrc"), Path::new("/dotfiles")));
        assert!(!is_within(Path::new("/dotfiles2/vimrc"), Path::new("/dotfiles")));
    }

    #[test]
    fn expand_user_leaves_unknown_variables() {
        assert_eq!(
            expand_user("$DOTLINK_SURELY_UNDEFINED_VAR/x"),
            "$DOTLINK_SURELY_UNDEFINED_VAR/x"
        );
        assert_eq!(expand_user("plain/path"), "plain/path");
    }
}
