//! File watching abstraction for docmirror.
//!
//! This crate provides a [`Watcher`] trait for the file-watching collaborator
//! that reports change events by path. Keeping the watcher behind a trait lets
//! the mirroring logic be tested without a real filesystem watcher.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Watcher`] trait with a single `watch()` method
//! - [`FsWatcher`] implementation backed by `notify` with event debouncing
//! - [`MockWatcher`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use docmirror_watch::{FsWatcher, Watcher};
//!
//! let watcher = FsWatcher::new();
//! let (rx, _handle) = watcher.watch(&[PathBuf::from("public")])?;
//! for event in rx.iter() {
//!     println!("{}: {:?}", event.path.display(), event.kind);
//! }
//! ```

mod debouncer;
mod event;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod watcher;

pub use event::{WatchEvent, WatchEventKind, WatchEventReceiver, WatchHandle};
pub use fs::FsWatcher;
#[cfg(feature = "mock")]
pub use mock::MockWatcher;
pub use watcher::{WatchError, Watcher};
