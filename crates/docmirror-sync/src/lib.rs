//! Document mirroring and change notification for docmirror.
//!
//! Keeps a copy of one source document inside the served public directory and
//! tells connected clients when that copy changes.
//!
//! # Architecture
//!
//! ```text
//! Watcher ──events──► ChangeRouter ──source changed──► ChangeNotifier::on_source_changed
//!    ▲                     │                                   │
//!    │                     │                                   └─► mirror() ──writes──┐
//!    │                     └──output changed──► ChangeNotifier::on_output_changed     │
//!    │                                                 │                              │
//!    │                                                 └─► NotificationSink           │
//!    └────────────────────────────── observes mirrored file ◄─────────────────────────┘
//! ```
//!
//! The mirrored file's own change event is what triggers the client
//! notification, so a copy that fails never notifies anyone.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docmirror_sync::{ChangeNotifier, MirrorPaths, WatchSession, mirror};
//! use docmirror_watch::FsWatcher;
//!
//! let paths = Arc::new(MirrorPaths::new("/project/README.md", "/project/public/README.md"));
//! mirror(&paths)?;
//!
//! let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&paths), "readme-update", sink));
//! let session = WatchSession::start(&FsWatcher::new(), notifier)?;
//! ```

mod mirror;
mod notifier;
mod paths;
mod router;
mod session;

pub use mirror::{MirrorError, mirror};
pub use notifier::{ChangeNotifier, ClientNotification, NotificationSink, NotifierState};
pub use paths::MirrorPaths;
pub use router::ChangeRouter;
pub use session::WatchSession;
