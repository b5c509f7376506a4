//! Development watch session.
//!
//! Wires a [`Watcher`] to a [`ChangeNotifier`] through a [`ChangeRouter`]
//! running on a dedicated thread.

use std::sync::Arc;
use std::thread::JoinHandle;

use docmirror_watch::{WatchError, WatchEventKind, WatchHandle, Watcher};

use crate::notifier::ChangeNotifier;
use crate::router::ChangeRouter;

/// Running watch session.
///
/// Dropping the session stops the underlying watcher; the dispatch thread
/// exits once the watcher's event stream closes.
pub struct WatchSession {
    notifier: Arc<ChangeNotifier>,
    thread: Option<JoinHandle<usize>>,
    _handle: WatchHandle,
}

impl WatchSession {
    /// Start watching the notifier's source and output directories.
    ///
    /// Source changes re-mirror the document; a copy failure is logged and
    /// the session keeps running. Output changes notify clients. Removals are
    /// ignored on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if the watcher cannot observe a directory.
    pub fn start(watcher: &dyn Watcher, notifier: Arc<ChangeNotifier>) -> Result<Self, WatchError> {
        let paths = Arc::clone(notifier.paths());
        let (events, handle) = watcher.watch(&paths.watch_dirs())?;

        let mut router = ChangeRouter::new();

        let source = paths.source().to_path_buf();
        let source_notifier = Arc::clone(&notifier);
        router.on_change(
            move |path| path == source,
            move |event| {
                if event.kind == WatchEventKind::Removed {
                    tracing::warn!(path = %event.path.display(), "Source document removed; keeping last mirrored copy");
                    return;
                }
                match source_notifier.on_source_changed(&event.path) {
                    Ok(Some(bytes)) => {
                        tracing::info!(path = %event.path.display(), bytes, "Source document re-mirrored");
                    }
                    Ok(None) => {}
                    Err(e) => tracing::error!(error = %e, "Failed to mirror source document"),
                }
            },
        );

        let destination = paths.destination().to_path_buf();
        let output_notifier = Arc::clone(&notifier);
        router.on_change(
            move |path| path == destination,
            move |event| {
                if event.kind != WatchEventKind::Removed {
                    output_notifier.on_output_changed(&event.path);
                }
            },
        );

        let thread = std::thread::Builder::new()
            .name("docmirror-watch".to_owned())
            .spawn(move || router.run(&events))?;

        tracing::info!(
            source = %paths.source().display(),
            destination = %paths.destination().display(),
            "Watching source document"
        );

        Ok(Self {
            notifier,
            thread: Some(thread),
            _handle: handle,
        })
    }

    /// Notifier driven by this session.
    #[must_use]
    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Stop watching and wait for the dispatch thread to finish.
    ///
    /// Returns the number of events the session received, or `None` if the
    /// dispatch thread panicked. Waits for the event stream to close, which
    /// the filesystem watcher does once its handle is dropped.
    pub fn stop(mut self) -> Option<usize> {
        let thread = self.thread.take()?;
        drop(self);
        thread.join().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};

    use docmirror_watch::MockWatcher;

    use crate::mirror::mirror;
    use crate::notifier::tests::RecordingSink;
    use crate::paths::MirrorPaths;

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn setup() -> (tempfile::TempDir, Arc<MirrorPaths>) {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("public")).unwrap();
        let paths = Arc::new(MirrorPaths::new(
            temp.path().join("README.md"),
            temp.path().join("public").join("README.md"),
        ));
        (temp, paths)
    }

    #[test]
    fn test_source_change_remirrors_and_output_change_notifies() {
        let (_temp, paths) = setup();
        fs::write(paths.source(), "Hello").unwrap();
        mirror(&paths).unwrap();

        let (sink, rx) = RecordingSink::new(1);
        let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&paths), "readme-update", sink));
        let watcher = MockWatcher::new();
        let session = WatchSession::start(&watcher, notifier).unwrap();

        fs::write(paths.source(), "World").unwrap();
        watcher.emit(paths.source(), WatchEventKind::Modified);
        assert!(wait_until(|| {
            fs::read_to_string(paths.destination()).is_ok_and(|c| c == "World")
        }));

        // The copy is observed in the public directory
        watcher.emit(paths.destination(), WatchEventKind::Modified);
        let notification = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(notification.event(), "readme-update");

        watcher.close();
        assert_eq!(session.stop(), Some(2));
    }

    #[test]
    fn test_unrelated_change_neither_copies_nor_notifies() {
        let (temp, paths) = setup();
        fs::write(paths.source(), "Hello").unwrap();

        let (sink, rx) = RecordingSink::new(1);
        let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&paths), "readme-update", sink));
        let watcher = MockWatcher::new();
        let session = WatchSession::start(&watcher, notifier).unwrap();

        watcher.emit(temp.path().join("notes.txt"), WatchEventKind::Modified);
        watcher.emit(temp.path().join("public").join("logo.svg"), WatchEventKind::Created);
        watcher.close();

        assert_eq!(session.stop(), Some(2));
        assert!(!paths.destination().exists());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_copy_failure_keeps_session_running() {
        let (_temp, paths) = setup();

        let (sink, rx) = RecordingSink::new(1);
        let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&paths), "readme-update", sink));
        let watcher = MockWatcher::new();
        let session = WatchSession::start(&watcher, notifier).unwrap();

        // Source missing: copy fails, session survives
        watcher.emit(paths.source(), WatchEventKind::Modified);

        // Events are handled in order, so this notification marks the failed
        // copy as done
        watcher.emit(paths.destination(), WatchEventKind::Modified);
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(!paths.destination().exists());

        fs::write(paths.source(), "Recovered").unwrap();
        watcher.emit(paths.source(), WatchEventKind::Modified);

        assert!(wait_until(|| {
            fs::read_to_string(paths.destination()).is_ok_and(|c| c == "Recovered")
        }));
        assert!(rx.try_recv().is_err());

        watcher.close();
        assert_eq!(session.stop(), Some(3));
    }

    #[test]
    fn test_removed_source_is_ignored() {
        let (_temp, paths) = setup();
        fs::write(paths.source(), "Hello").unwrap();
        mirror(&paths).unwrap();

        let (sink, rx) = RecordingSink::new(1);
        let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&paths), "readme-update", sink));
        let watcher = MockWatcher::new();
        let session = WatchSession::start(&watcher, notifier).unwrap();

        fs::remove_file(paths.source()).unwrap();
        watcher.emit(paths.source(), WatchEventKind::Removed);
        watcher.emit(paths.destination(), WatchEventKind::Removed);
        watcher.close();

        assert_eq!(session.stop(), Some(2));
        assert_eq!(fs::read_to_string(paths.destination()).unwrap(), "Hello");
        assert!(rx.try_recv().is_err());
    }
}
