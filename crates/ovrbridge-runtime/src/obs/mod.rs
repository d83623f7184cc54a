//! Observability: dispatch counters and tracing setup for binaries.

pub mod stats;

use tracing_subscriber::{fmt, EnvFilter};

use ovrbridge_core::error::{BridgeError, Result};

pub use stats::{DispatchStats, StatsSnapshot};

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| BridgeError::Config(format!("invalid log filter: {e}")))?,
    };
    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| BridgeError::Internal(format!("tracing init failed: {e}")))
}
