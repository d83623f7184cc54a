//! Shared error types across ovrbridge crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes for host-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Request was issued but the native layer never assigned it an id.
    UnassignedRequest,
    /// A live request already holds this id.
    DuplicateRequest,
    /// Notification registration without a callback.
    NullCallback,
    /// The null message type tag was used where a real tag is required.
    InvalidMessageType,
    /// The poll loop is already running.
    PollInProgress,
    /// Invalid configuration or replay script.
    Config,
    /// A file could not be read.
    Io,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnassignedRequest => "UNASSIGNED_REQUEST",
            ErrorCode::DuplicateRequest => "DUPLICATE_REQUEST",
            ErrorCode::NullCallback => "NULL_CALLBACK",
            ErrorCode::InvalidMessageType => "INVALID_MESSAGE_TYPE",
            ErrorCode::PollInProgress => "POLL_IN_PROGRESS",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Io => "IO",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core and runtime.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("request was never assigned an id by the native layer")]
    UnassignedRequest,
    #[error("request id {0} is already pending")]
    DuplicateRequest(u64),
    #[error("notification callback must not be null (type={0:#010x})")]
    NullCallback(u32),
    #[error("invalid message type: {0:#010x}")]
    InvalidMessageType(u32),
    #[error("poll loop already running")]
    PollInProgress,
    #[error("config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::UnassignedRequest => ErrorCode::UnassignedRequest,
            BridgeError::DuplicateRequest(_) => ErrorCode::DuplicateRequest,
            BridgeError::NullCallback(_) => ErrorCode::NullCallback,
            BridgeError::InvalidMessageType(_) => ErrorCode::InvalidMessageType,
            BridgeError::PollInProgress => ErrorCode::PollInProgress,
            BridgeError::Config(_) => ErrorCode::Config,
            BridgeError::Io(_) => ErrorCode::Io,
            BridgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}

/// Message-level error reported by the platform.
///
/// Delivered inside a [`Message`](crate::Message) to whichever request or
/// notification handler receives it, exactly like a success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub http_code: i32,
}

impl PlatformError {
    /// Error used when the native layer flags a message as failed but
    /// provides no error record.
    pub fn unknown() -> Self {
        Self {
            code: -1,
            message: "unknown error".into(),
            http_code: 0,
        }
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code={}, http={})", self.message, self.code, self.http_code)
    }
}
