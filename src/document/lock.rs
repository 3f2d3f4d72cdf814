use crate::error::{EditorConfigError, Result};
use std::fs::{File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};

/// Exclusive lock on a config file, held by an edit session.
///
/// The lock is non-blocking: a second session on the same file fails
/// immediately with `Locked` instead of waiting.
#[derive(Debug)]
pub(crate) struct FileLock {
	file: File,
	path: PathBuf,
}

impl FileLock {
	pub(crate) fn acquire(path: &Path) -> Result<Self> {
		match try_acquire_exclusive(path) {
			Ok(file) => {
				tracing::debug!(path = %path.display(), "acquired edit lock");
				Ok(FileLock {
					file,
					path: path.to_path_buf(),
				})
			}
			Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(EditorConfigError::Locked {
				path: path.to_path_buf(),
			}),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				Err(EditorConfigError::ConfigNotFound {
					path: path.to_path_buf(),
				})
			}
			Err(source) => Err(EditorConfigError::ConfigWriteError {
				path: path.to_path_buf(),
				source,
			}),
		}
	}
}

/// Open the file for writing (never creating or truncating it) and lock it.
fn try_acquire_exclusive(path: &Path) -> io::Result<File> {
	let file = OpenOptions::new().read(true).write(true).open(path)?;

	match file.try_lock() {
		Ok(()) => Ok(file),
		Err(TryLockError::WouldBlock) => {
			Err(io::Error::new(io::ErrorKind::WouldBlock, "lock held"))
		}
		Err(TryLockError::Error(err)) => Err(err),
	}
}

impl Drop for FileLock {
	fn drop(&mut self) {
		if let Err(err) = self.file.unlock() {
			tracing::warn!(path = %self.path.display(), error = %err, "failed to release edit lock");
			return;
		}
		tracing::debug!(path = %self.path.display(), "released edit lock");
	}
}
