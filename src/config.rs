//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! database_url = "postgres://taskpulse@localhost/taskpulse"
//!
//! [reminder]
//! lead_time_minutes = 360
//!
//! [timezone]
//! utc_offset_minutes = 330
//! label = "IST"
//!
//! [logging]
//! filter = "taskpulse=debug,warn"
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use crate::reminder::{DEFAULT_LEAD_TIME_MINUTES, ReminderPolicy};
use crate::task::services::DisplayZone;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default display offset east of UTC, in minutes.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "taskpulse=info,warn";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] Box<toml::de::Error>),
    /// The display offset is a day or more.
    #[error("utc_offset_minutes {0} is out of range")]
    InvalidOffset(i32),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskpulseConfig {
    /// `PostgreSQL` connection URL. Absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Reminder timing.
    pub reminder: ReminderSettings,
    /// Display zone for dates in messages.
    pub timezone: TimezoneSettings,
    /// Log filtering.
    pub logging: LoggingSettings,
}

/// `[reminder]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReminderSettings {
    /// Minutes between the reminder and the due date.
    pub lead_time_minutes: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
        }
    }
}

/// `[timezone]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimezoneSettings {
    /// Offset east of UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// Human-readable zone name, used in logs.
    pub label: String,
}

impl Default for TimezoneSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            label: "IST".to_owned(),
        }
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl TaskpulseConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(Box::new(err)))
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file exists but cannot be read
    /// and [`ConfigError::Parse`] when it is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Replaces the database URL when an override is present.
    #[must_use]
    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        if database_url.is_some() {
            self.database_url = database_url;
        }
        self
    }

    /// Returns the reminder policy.
    #[must_use]
    pub fn reminder_policy(&self) -> ReminderPolicy {
        ReminderPolicy::from_minutes(self.reminder.lead_time_minutes)
    }

    /// Returns the display zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOffset`] when the offset is a day or
    /// more.
    pub fn display_zone(&self) -> Result<DisplayZone, ConfigError> {
        let minutes = self.timezone.utc_offset_minutes;
        DisplayZone::east_minutes(minutes).ok_or(ConfigError::InvalidOffset(minutes))
    }
}
