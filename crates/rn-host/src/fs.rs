//! Filesystem boundary for the engine.
//!
//! The engine only ever asks whether a path exists and renames a file within
//! its directory. [`LocalFs`] does both on the real filesystem and refuses to
//! overwrite an existing target, which `std::fs::rename` would do silently on
//! Unix.

use std::io;
use std::path::Path;

/// Filesystem operations used by the rename engine.
pub trait FileStore {
    /// Whether anything (file, directory, dangling symlink) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Rename `from` to `to` without replacing an existing `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileStore for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        // A case-only rename on a case-insensitive volume sees its own source
        // as the existing target.
        if self.exists(to) && !is_same_file(from, to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        tracing::trace!("rename {} -> {}", from.display(), to.display());
        std::fs::rename(from, to)
    }
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (a.metadata(), b.metadata()) {
        (Ok(x), Ok(y)) => x.dev() == y.dev() && x.ino() == y.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    let (Some(name_a), Some(name_b)) = (a.file_name(), b.file_name()) else {
        return false;
    };
    a.parent() == b.parent()
        && name_a
            .to_string_lossy()
            .eq_ignore_ascii_case(&name_b.to_string_lossy())
}
