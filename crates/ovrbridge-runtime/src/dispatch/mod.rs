//! Dispatch module exports.
//!
//! Request correlation, notification routing, and the poll loop that ties
//! them to the native queue.

pub mod dispatcher;
pub mod notifications;
pub mod requests;

pub use dispatcher::{Dispatcher, ShutdownReport};
pub use notifications::{NotificationCallback, NotificationOutcome, NotificationRegistry};
pub use requests::{Request, RequestCallback, RequestHandle, RequestRegistry, Resolution};
