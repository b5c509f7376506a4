//! Watcher trait and error types.

use std::path::PathBuf;

use crate::event::{WatchEventReceiver, WatchHandle};

/// Watch error.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The directory to watch does not exist or is not a directory.
    #[error("Cannot watch {}: not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The underlying notification backend failed.
    #[error("File watcher error: {0}")]
    Backend(#[from] notify::Error),

    /// The dispatch thread could not be started.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-watching collaborator.
///
/// Implementations report changes to files directly inside the watched
/// directories (non-recursive) as [`WatchEvent`](crate::WatchEvent)s carrying
/// absolute paths. Watching a directory rather than a single file keeps the
/// subscription alive across editors that save by writing a temporary file
/// and renaming it over the original.
pub trait Watcher: Send + Sync {
    /// Start watching the given directories.
    ///
    /// Duplicate directories are watched once. Events stop when the returned
    /// [`WatchHandle`] is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if a directory cannot be watched.
    fn watch(&self, dirs: &[PathBuf]) -> Result<(WatchEventReceiver, WatchHandle), WatchError>;
}
