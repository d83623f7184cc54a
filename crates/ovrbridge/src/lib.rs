//! Top-level facade crate for ovrbridge.
//!
//! Re-exports the core message types and the runtime dispatcher so hosts can
//! depend on a single crate.

pub mod core {
    pub use ovrbridge_core::*;
}

pub mod runtime {
    pub use ovrbridge_runtime::*;
}

pub use ovrbridge_core::{Message, MessageType, Payload, PlatformError, RequestId};
pub use ovrbridge_runtime::{Dispatcher, Request, RequestHandle};
