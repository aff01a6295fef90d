//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the link engine can be
//! unit-tested without touching the real filesystem.  Production code uses
//! [`SystemFileSystemOps`]; tests use `RecordingFileSystemOps` to prove that
//! dry runs never mutate anything and to inject failures.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and mutations the engine performs.
///
/// Queries never follow the target itself unless stated: `lexists` and
/// `is_symlink` look at the link, `exists` and `is_dir` look through it.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists, following symlinks (a dangling link is `false`).
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` exists without following symlinks (a dangling link is `true`).
    fn lexists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` itself is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the recorded destination of the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Resolve `path` through every symlink to its real location.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Returns `true` if both paths name the same inode on the same device.
    fn same_file(&self, a: &Path, b: &Path) -> bool;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create a symbolic link at `link` whose recorded destination is `original`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to create the link.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Create a hard link at `link` to the existing file `original`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to create the link.
    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Remove a file or symbolic link.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create `path` and every missing ancestor.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Set the Unix permission bits of `path`. A no-op on other platforms.
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be changed.
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn lexists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }

    #[cfg(unix)]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        use std::os::unix::fs::MetadataExt as _;
        match (std::fs::metadata(a), std::fs::metadata(b)) {
            (Ok(ma), Ok(mb)) => ma.ino() == mb.ino() && ma.dev() == mb.dev(),
            _ => false,
        }
    }

    #[cfg(not(unix))]
    fn same_file(&self, _a: &Path, _b: &Path) -> bool {
        false
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect()
    }

    #[cfg(unix)]
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(original, link)
    }

    #[cfg(windows)]
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        // Relative payloads are resolved from the link's directory, as the OS will.
        let resolved = link
            .parent()
            .map_or_else(|| original.to_path_buf(), |p| p.join(original));
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(original, link)
        } else {
            std::os::windows::fs::symlink_file(original, link)
        }
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::fs::hard_link(original, link)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            // Directory symlinks on Windows are removed as directories.
            Err(e) if cfg!(windows) && path.is_symlink() => {
                std::fs::remove_dir(path).map_err(|_| e)
            }
            other => other,
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt as _;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }
}

/// [`FileSystemOps`] for unit tests that answers queries from the real
/// filesystem and records every mutation.
///
/// Mutations are forwarded to [`SystemFileSystemOps`] unless the recorder was
/// built with [`failing`](Self::failing), in which case they are recorded and
/// then refused with `PermissionDenied`.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingFileSystemOps {
    inner: SystemFileSystemOps,
    fail_mutations: bool,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl RecordingFileSystemOps {
    /// Create a recorder that performs mutations for real.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that refuses every mutation.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_mutations: true,
            ..Self::default()
        }
    }

    /// Return the recorded mutation calls, e.g. `symlink /home/.vimrc`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("recorder poisoned").clone()
    }

    fn record(&self, op: &str, path: &Path) -> io::Result<()> {
        self.calls
            .lock()
            .expect("recorder poisoned")
            .push(format!("{op} {}", path.display()));
        if self.fail_mutations {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl FileSystemOps for RecordingFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn lexists(&self, path: &Path) -> bool {
        self.inner.lexists(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.inner.is_symlink(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.read_link(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.canonicalize(path)
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        self.inner.same_file(a, b)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        self.record("symlink", link)?;
        self.inner.symlink(original, link)
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        self.record("hard_link", link)?;
        self.inner.hard_link(original, link)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.record("remove_file", path)?;
        self.inner.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record("remove_dir_all", path)?;
        self.inner.remove_dir_all(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record("create_dir_all", path)?;
        self.inner.create_dir_all(path)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.record("set_mode", path)?;
        self.inner.set_mode(path, mode)
    }
}
