//! Glob expansion of link sources and derivation of their targets.
use std::collections::BTreeSet;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};

use super::paths::normalize;

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Whether `s` contains any of the wildcard characters `?`, `*` or `[`.
#[must_use]
pub fn has_glob_chars(s: &str) -> bool {
    s.contains(['?', '*', '['])
}

/// Whether `s` ends with a path separator.
fn ends_with_separator(s: &str) -> bool {
    s.ends_with('/') || s.ends_with(MAIN_SEPARATOR)
}

/// Glob a single pattern.
///
/// Relative patterns are matched under `base` and reported relative to it.
/// A trailing separator restricts the matches to directories; a `**`
/// segment without one restricts them to files. A final `**` component
/// walks the whole tree below it, since `glob` alone only yields the
/// directories there.
fn glob_one(pattern: &str, base: &Path) -> Result<BTreeSet<PathBuf>, PatternError> {
    let dirs_only = ends_with_separator(pattern);
    let files_only = pattern.contains("**") && !dirs_only;
    let mut normalized = normalize(Path::new(pattern));
    if files_only && normalized.file_name().is_some_and(|name| name == "**") {
        normalized.push("*");
    }
    let relative = !normalized.is_absolute();

    let full = if relative {
        format!(
            "{}{MAIN_SEPARATOR}{}",
            Pattern::escape(&base.to_string_lossy()),
            normalized.to_string_lossy()
        )
    } else {
        normalized.to_string_lossy().into_owned()
    };

    let mut found = BTreeSet::new();
    for path in glob::glob_with(&full, OPTIONS)?.filter_map(Result::ok) {
        if (files_only && !path.is_file()) || (dirs_only && !path.is_dir()) {
            continue;
        }
        let reported = if relative {
            path.strip_prefix(base).map_or_else(|_| path.clone(), Path::to_path_buf)
        } else {
            path
        };
        found.insert(normalize(&reported));
    }
    Ok(found)
}

/// Expand `pattern`, minus everything matched by `excludes`.
///
/// Exclusions are globbed exactly like the pattern and subtracted as a set.
/// The result is ordered, so unchanged inputs give identical output.
///
/// # Errors
///
/// Returns [`PatternError`] if the pattern or an exclusion is malformed.
pub fn expand(
    pattern: &str,
    excludes: &[String],
    base: &Path,
) -> Result<BTreeSet<PathBuf>, PatternError> {
    let mut include = glob_one(pattern, base)?;
    for exclude in excludes {
        for path in glob_one(exclude, base)? {
            include.remove(&path);
        }
    }
    Ok(include)
}

/// Character-wise common prefix of two strings.
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i);
    a.get(..len).unwrap_or_default()
}

/// Everything before the last separator in `s`, or `""` if there is none.
fn dirname(s: &str) -> &str {
    match s.rfind(['/', MAIN_SEPARATOR]) {
        Some(0) => s.get(..1).unwrap_or_default(),
        Some(i) => s.get(..i).unwrap_or_default(),
        None => "",
    }
}

/// Derive the concrete target for one glob match.
///
/// The common prefix of `pattern` and `matched` is cut back to its last
/// directory; what follows is the part of the match that varies. `prefix`
/// is prepended to it and the result is placed under `destination`.
#[must_use]
pub fn derive_target(pattern: &str, matched: &Path, destination: &Path, prefix: &str) -> PathBuf {
    let pattern = normalize(Path::new(pattern));
    let pattern = pattern.to_string_lossy();
    let matched = matched.to_string_lossy();
    let common = dirname(common_prefix(&pattern, &matched));
    let item = matched
        .strip_prefix(common)
        .unwrap_or(&matched)
        .trim_start_matches(['/', MAIN_SEPARATOR]);
    destination.join(format!("{prefix}{item}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "config/foo/a",
            "config/bar/b",
            "config/baz/c",
            "config/.hidden/h",
            "bin/tool",
            "bin/nested/deep",
        ] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file).unwrap();
        }
        dir
    }

    fn strs(set: &BTreeSet<PathBuf>) -> Vec<String> {
        set.iter().map(|p| p.to_string_lossy().replace('\\', "/")).collect()
    }

    #[test]
    fn has_glob_chars_detects_wildcards() {
        assert!(has_glob_chars("config/*"));
        assert!(has_glob_chars("file?.txt"));
        assert!(has_glob_chars("[ab]rc"));
        assert!(!has_glob_chars("config/nvim"));
    }

    #[test]
    fn expand_single_star_skips_hidden() {
        let dir = tree();
        let found = expand("config/*", &[], dir.path()).unwrap();
        assert_eq!(strs(&found), vec!["config/bar", "config/baz", "config/foo"]);
    }

    #[test]
    fn expand_subtracts_excludes() {
        let dir = tree();
        let found = expand("config/*", &["config/baz".to_string()], dir.path()).unwrap();
        assert_eq!(strs(&found), vec!["config/bar", "config/foo"]);
    }

    #[test]
    fn expand_recursive_keeps_files_only() {
        let dir = tree();
        let found = expand("bin/**/*", &[], dir.path()).unwrap();
        assert_eq!(strs(&found), vec!["bin/nested/deep", "bin/tool"]);
    }

    #[test]
    fn expand_trailing_double_star_walks_tree() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["config/foo/bar/a", "config/foo/bar/b", "config/foo/bar/c"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file).unwrap();
        }
        let found = expand("config/**", &["config/**/b".to_string()], dir.path()).unwrap();
        assert_eq!(strs(&found), vec!["config/foo/bar/a", "config/foo/bar/c"]);
        let target = derive_target(
            "config/**",
            Path::new("config/foo/bar/a"),
            Path::new("/home/u/.config"),
            "",
        );
        assert_eq!(target, PathBuf::from("/home/u/.config/foo/bar/a"));
    }

    #[test]
    fn expand_trailing_separator_keeps_directories_only() {
        let dir = tree();
        let found = expand("bin/*/", &[], dir.path()).unwrap();
        assert_eq!(strs(&found), vec!["bin/nested"]);
    }

    #[test]
    fn expand_zero_matches_is_empty() {
        let dir = tree();
        assert!(expand("nothing/*", &[], dir.path()).unwrap().is_empty());
    }

    #[test]
    fn expand_is_deterministic() {
        let dir = tree();
        let a = expand("config/*", &[], dir.path()).unwrap();
        let b = expand("config/*", &[], dir.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn expand_rejects_malformed_pattern() {
        let dir = tree();
        assert!(expand("config/[", &[], dir.path()).is_err());
    }

    #[test]
    fn derive_target_uses_common_directory() {
        let target = derive_target(
            "config/*",
            Path::new("config/foo"),
            Path::new("/home/u/.config"),
            "",
        );
        assert_eq!(target, PathBuf::from("/home/u/.config/foo"));
    }

    #[test]
    fn derive_target_partial_name_match() {
        let target = derive_target(
            "config/f*",
            Path::new("config/foo"),
            Path::new("/home/u/.config"),
            "",
        );
        assert_eq!(target, PathBuf::from("/home/u/.config/foo"));
    }

    #[test]
    fn derive_target_keeps_recursive_suffix_and_prefix() {
        let target = derive_target(
            "bin/**/*",
            Path::new("bin/nested/deep"),
            Path::new("/home/u"),
            ".",
        );
        assert_eq!(target, PathBuf::from("/home/u/.nested/deep"));
    }

    #[test]
    fn derive_target_without_directory() {
        let target = derive_target("*rc", Path::new("vimrc"), Path::new("/home/u"), ".");
        assert_eq!(target, PathBuf::from("/home/u/.vimrc"));
    }
}
