//! Change routing: path-guarded handlers over a watch event stream.

use std::path::Path;

use docmirror_watch::{WatchEvent, WatchEventReceiver};

type Predicate = Box<dyn Fn(&Path) -> bool + Send + Sync>;
type Handler = Box<dyn Fn(&WatchEvent) + Send + Sync>;

struct Route {
    predicate: Predicate,
    handler: Handler,
}

/// Dispatches watch events to handlers whose path predicate matches.
///
/// # Example
///
/// ```ignore
/// let mut router = ChangeRouter::new();
/// router.on_change(
///     move |path| path == source,
///     |event| println!("{} changed", event.path.display()),
/// );
/// router.run(&receiver);
/// ```
#[derive(Default)]
pub struct ChangeRouter {
    routes: Vec<Route>,
}

impl ChangeRouter {
    /// Create a router with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events whose path satisfies `predicate`.
    pub fn on_change<P, H>(&mut self, predicate: P, handler: H) -> &mut Self
    where
        P: Fn(&Path) -> bool + Send + Sync + 'static,
        H: Fn(&WatchEvent) + Send + Sync + 'static,
    {
        self.routes.push(Route {
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        });
        self
    }

    /// Run every matching handler, in registration order.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &WatchEvent) -> usize {
        let mut invoked = 0;
        for route in &self.routes {
            if (route.predicate)(&event.path) {
                (route.handler)(event);
                invoked += 1;
            }
        }
        if invoked == 0 {
            tracing::trace!(path = %event.path.display(), "No handler for watch event");
        }
        invoked
    }

    /// Dispatch events until the receiver closes.
    ///
    /// Events are handled one at a time on the calling thread. Returns the
    /// number of events received.
    pub fn run(&self, events: &WatchEventReceiver) -> usize {
        let mut received = 0;
        for event in events.iter() {
            received += 1;
            self.dispatch(&event);
        }
        received
    }
}
