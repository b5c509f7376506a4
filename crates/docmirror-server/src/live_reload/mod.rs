//! Live reload: broadcasting client notifications over WebSocket.

mod manager;
mod websocket;

pub(crate) use manager::{DisabledSink, LiveReloadManager};
pub(crate) use websocket::ws_handler;
