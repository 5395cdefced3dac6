//! Daemon configuration.
//!
//! A JSON file created with defaults on first run, so a fresh install
//! works without hand-editing anything. Recognized timing options feed
//! the session config; the rest wires up collaborators.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{Duration, UtcOffset};

use crate::alarm::session::SessionConfig;
use crate::error::Result;
use crate::tracing::prelude::*;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local timezone as minutes east of UTC; `None` uses the system's
    /// local offset.
    pub utc_offset_minutes: Option<i32>,

    /// How long a snooze lasts before the automatic re-ring.
    pub snooze_duration_secs: u64,

    /// Safety cap on a single ringing period.
    pub max_ring_duration_secs: u64,

    /// Evaluation tick period. Must stay below 60 seconds or alarm
    /// minutes can be skipped.
    pub tick_interval_secs: u64,

    /// Minimum interval between accepted presses of the same button.
    pub button_debounce_ms: u64,

    pub web_port: u16,

    /// Where alarm definitions are persisted.
    pub alarms_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            snooze_duration_secs: 9 * 60,
            max_ring_duration_secs: 30 * 60,
            tick_interval_secs: 1,
            button_debounce_ms: 300,
            web_port: 5000,
            alarms_file: PathBuf::from("data/alarms.json"),
        }
    }
}

impl Config {
    /// Load from `path`, writing a default file when none exists.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let config = serde_json::from_slice(&bytes)?;
                info!(path = %path.display(), "Configuration loaded");
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(path, serde_json::to_vec_pretty(&config)?)?;
                info!(path = %path.display(), "Default configuration written");
                Ok(config)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            snooze_duration: Duration::seconds(self.snooze_duration_secs as i64),
            max_ring_duration: Duration::seconds(self.max_ring_duration_secs as i64),
        }
    }

    pub fn utc_offset(&self) -> Option<UtcOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| UtcOffset::from_whole_seconds(minutes * 60).ok())
    }
}
