//! ovrbridge runtime library entry.
//!
//! Wires the native transport seam, classifier, request/notification
//! registries, and the poll loop into a dispatcher a host drives once per
//! tick. Also hosts config loading, counters, the tokio tick driver, and the
//! in-memory loopback transport used by tests and the replay binary.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod native;
pub mod obs;
pub mod replay;

pub use dispatch::{Dispatcher, Request, RequestHandle};
