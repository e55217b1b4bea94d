//! Helper functions for managing the store directory on disk.

use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};

use crate::stdx::result::ResultEx;

/// Creates a new directory and its parent directories if `all` is specified,
/// but doesn't fail if it already exists.
///
/// # Example
/// ```no_run
/// # use dacu_lib::stdx::fs::create_dir;
/// create_dir(".dacu/0a1b", true)?;
/// create_dir(".dacu/0a1b", true)?; // second time doesn't fail
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn create_dir<P>(path: P, all: bool) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fn inner(path: &Path, all: bool) -> io::Result<()> {
        let res = if all {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };
        res.ignore_default(|e| e.kind() == ErrorKind::AlreadyExists)
    }

    inner(path.as_ref(), all)
}

/// Recursively removes a directory, but doesn't fail if it doesn't exist.
///
/// # Example
/// ```no_run
/// # use dacu_lib::stdx::fs::remove_dir;
/// remove_dir(".dacu")?;
/// remove_dir(".dacu")?; // second time doesn't fail
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn remove_dir<P>(path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fn inner(path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path).ignore_default(|e| {
            if e.kind() != ErrorKind::NotFound {
                return false;
            }

            let parent_exists = path
                .parent()
                .and_then(|p| p.try_exists().ok())
                .is_some_and(|b| b);

            if !parent_exists {
                tracing::error!(?path, "tried removing dir, but parent did not exist");
            }

            parent_exists
        })
    }

    inner(path.as_ref())
}
