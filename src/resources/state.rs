//! Classification of what currently sits at a link target.
use std::path::{Path, PathBuf};

use super::paths::strip_verbatim;
use crate::operations::FileSystemOps;

/// What occupies a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing at all, not even a dangling link.
    Absent,
    /// A symbolic link.
    Symlink {
        /// Recorded destination, with any extended-length prefix removed.
        destination: PathBuf,
        /// Whether the destination does not resolve to anything.
        dangling: bool,
    },
    /// A regular file or directory (possibly a hard link).
    Other {
        /// Whether it is a directory.
        is_dir: bool,
    },
}

impl LinkState {
    /// Inspect `target` without following it.
    #[must_use]
    pub fn classify(fs: &dyn FileSystemOps, target: &Path) -> Self {
        if fs.is_symlink(target)
            && let Ok(destination) = fs.read_link(target)
        {
            return Self::Symlink {
                destination: strip_verbatim(&destination),
                dangling: !fs.exists(target),
            };
        }
        if fs.lexists(target) {
            Self::Other {
                is_dir: fs.is_dir(target),
            }
        } else {
            Self::Absent
        }
    }

    /// Whether anything, including a dangling link, is present.
    #[must_use]
    pub const fn lexists(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Whether the target is a symbolic link.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink { .. })
    }
}
