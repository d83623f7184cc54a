use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use ovrbridge_core::error::{BridgeError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.poll.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            poll: PollSection::default(),
            logging: LoggingSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    /// One poll per tick (host frame).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Messages handled per tick; `0` drains the queue.
    #[serde(default)]
    pub max_messages_per_tick: usize,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_messages_per_tick: 0,
        }
    }
}

impl PollSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.tick_interval_ms) {
            return Err(BridgeError::Config(
                "poll.tick_interval_ms must be between 1 and 1000".into(),
            ));
        }
        if self.max_messages_per_tick > 100_000 {
            return Err(BridgeError::Config(
                "poll.max_messages_per_tick must be at most 100000".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Per-tick limit, `None` when draining.
    pub fn limit(&self) -> Option<usize> {
        (self.max_messages_per_tick > 0).then_some(self.max_messages_per_tick)
    }
}

fn default_tick_interval_ms() -> u64 {
    16
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl LoggingSection {
    pub fn validate(&self) -> Result<()> {
        EnvFilter::try_new(&self.filter)
            .map(|_| ())
            .map_err(|e| BridgeError::Config(format!("logging.filter is invalid: {e}")))
    }
}

fn default_filter() -> String {
    "info".into()
}
