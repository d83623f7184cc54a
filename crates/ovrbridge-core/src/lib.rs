//! ovrbridge core: transport-agnostic message envelopes, payload models, and
//! the error surface.
//!
//! This crate defines what a parsed platform message looks like once it has
//! left the native SDK. It carries no runtime dependencies so it can be shared
//! by the dispatcher, host integrations, and test tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `BridgeError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod message;

/// Shared result type.
pub use error::{BridgeError, ErrorCode, PlatformError, Result};
pub use message::{Message, MessageBody, MessageType, Payload, RequestId};
