//! Configuration loading and validation.
//!
//! Handles parsing of `worklog.toml`. Every option has a default (in-memory
//! tables, dry-run mail); only a recipient is required while the scheduler
//! is enabled. Option names accept both `snake_case` and the `camelCase`
//! spellings used by webhook clients.

use crate::worklog::{
    domain::{CycleSchedule, Hours, MergePolicy, ReportCalendar, ThresholdGate},
    services::Recipients,
};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is not acceptable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending option.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project name used in report subjects.
    #[serde(default = "default_project_name", alias = "projectName")]
    pub project_name: String,

    /// UTC offset in which "today" and cycle times are evaluated.
    #[serde(default = "default_timezone_offset", alias = "timezoneOffset")]
    pub timezone_offset: String,

    /// Report threshold and recipients.
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Cycle schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Merge policy for inbound commits.
    #[serde(default)]
    pub merge: MergePolicy,

    /// Row store backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Mail delivery.
    #[serde(default)]
    pub mail: MailConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            timezone_offset: default_timezone_offset(),
            reporting: ReportingConfig::default(),
            schedule: ScheduleConfig::default(),
            merge: MergePolicy::default(),
            storage: StorageConfig::default(),
            mail: MailConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_project_name() -> String {
    "Worklog".to_owned()
}

fn default_timezone_offset() -> String {
    "+00:00".to_owned()
}

/// A recipient list given as a TOML array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientList {
    /// `"a@example.com, b@example.com"`
    Joined(String),
    /// `["a@example.com", "b@example.com"]`
    Listed(Vec<String>),
}

impl Default for RecipientList {
    fn default() -> Self {
        Self::Listed(Vec::new())
    }
}

impl RecipientList {
    /// Returns the trimmed, non-empty addresses.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Joined(joined) => joined.split(',').collect(),
            Self::Listed(listed) => listed.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Report threshold and recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Minimum daily hours before a daily report is sent.
    #[serde(
        default = "default_min_hours",
        alias = "minHoursForDailyReport",
        alias = "minHoursThreshold"
    )]
    pub min_hours_threshold: f64,

    /// Primary recipients.
    #[serde(default, alias = "recipientEmail")]
    pub recipient_email: RecipientList,

    /// Daily CC list.
    #[serde(default, alias = "ccDaily")]
    pub cc_daily: RecipientList,

    /// Weekly CC list.
    #[serde(default, alias = "ccWeekly")]
    pub cc_weekly: RecipientList,

    /// When set, all mail goes only here, without CC.
    #[serde(default, alias = "debugRecipient")]
    pub debug_recipient: Option<String>,

    /// Lines appended below each report.
    #[serde(default)]
    pub signature: Vec<String>,
}

const fn default_min_hours() -> f64 {
    6.0
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            min_hours_threshold: default_min_hours(),
            recipient_email: RecipientList::default(),
            cc_daily: RecipientList::default(),
            cc_weekly: RecipientList::default(),
            debug_recipient: None,
            signature: Vec::new(),
        }
    }
}

/// Cycle schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Whether `serve` runs the scheduler.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Daily cycle time, `HH:MM`.
    #[serde(default = "default_daily_time", alias = "dailyCycleTime")]
    pub daily_cycle_time: String,

    /// Weekly cycle time, `<weekday> HH:MM`.
    #[serde(default = "default_weekly_time", alias = "weeklyCycleTime")]
    pub weekly_cycle_time: String,
}

const fn default_true() -> bool {
    true
}

fn default_daily_time() -> String {
    "23:55".to_owned()
}

fn default_weekly_time() -> String {
    "sun 20:00".to_owned()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_cycle_time: default_daily_time(),
            weekly_cycle_time: default_weekly_time(),
        }
    }
}

/// Row store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local tables; lost on restart.
    #[default]
    Memory,
    /// `PostgreSQL` through Diesel.
    Postgres,
}

/// Row store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to use.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Connection string for the `postgres` backend.
    #[serde(default, alias = "databaseUrl")]
    pub database_url: Option<String>,

    /// Maximum pooled connections.
    #[serde(default = "default_pool_size", alias = "poolSize")]
    pub pool_size: u32,

    /// Wait for a table lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms", alias = "lockTimeoutMs")]
    pub lock_timeout_ms: u64,

    /// Bound for one row store call, in milliseconds.
    #[serde(default = "default_operation_timeout_ms", alias = "operationTimeoutMs")]
    pub operation_timeout_ms: u64,
}

const fn default_pool_size() -> u32 {
    8
}

const fn default_lock_timeout_ms() -> u64 {
    10_000
}

const fn default_operation_timeout_ms() -> u64 {
    15_000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            pool_size: default_pool_size(),
            lock_timeout_ms: default_lock_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

/// Mail transport selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTransport {
    /// Log reports instead of sending them.
    #[default]
    DryRun,
    /// Post reports to an HTTP relay.
    Relay,
}

/// Mail delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Transport to use.
    #[serde(default)]
    pub transport: MailTransport,

    /// Relay endpoint for the `relay` transport.
    #[serde(default, alias = "relayUrl")]
    pub relay_url: Option<String>,

    /// Bearer token sent to the relay.
    #[serde(default, alias = "apiToken")]
    pub api_token: Option<String>,

    /// Relay request timeout, in milliseconds.
    #[serde(default = "default_mail_timeout_ms", alias = "timeoutMs")]
    pub timeout_ms: u64,
}

const fn default_mail_timeout_ms() -> u64 {
    10_000
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::default(),
            relay_url: None,
            api_token: None,
            timeout_ms: default_mail_timeout_ms(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_owned()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Validated, typed view of [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project name used in report subjects.
    pub project_name: String,
    /// Reporting calendar.
    pub calendar: ReportCalendar,
    /// Daily minimum-hours gate.
    pub gate: ThresholdGate,
    /// Report recipients.
    pub recipients: Recipients,
    /// Signature lines.
    pub signature: Vec<String>,
    /// Merge policy.
    pub merge: MergePolicy,
    /// Whether the scheduler runs.
    pub schedule_enabled: bool,
    /// Daily cycle schedule.
    pub daily_schedule: CycleSchedule,
    /// Weekly cycle schedule.
    pub weekly_schedule: CycleSchedule,
    /// Table lock wait.
    pub lock_timeout: Duration,
    /// Row store call bound.
    pub operation_timeout: Duration,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text does not match the schema.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validates every option and returns the typed settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad option.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let offset = parse_offset(&self.timezone_offset)?;
        let min_hours = Hours::from_f64(self.reporting.min_hours_threshold)
            .map_err(|err| invalid("reporting.min_hours_threshold", err.to_string()))?;
        let daily_schedule = parse_schedule(
            "schedule.daily_cycle_time",
            &self.schedule.daily_cycle_time,
        )?;
        if !matches!(daily_schedule, CycleSchedule::DailyAt(_)) {
            return Err(invalid(
                "schedule.daily_cycle_time",
                "expected HH:MM without a weekday",
            ));
        }
        let weekly_schedule = parse_schedule(
            "schedule.weekly_cycle_time",
            &self.schedule.weekly_cycle_time,
        )?;
        if !matches!(weekly_schedule, CycleSchedule::WeeklyAt(..)) {
            return Err(invalid(
                "schedule.weekly_cycle_time",
                "expected '<weekday> HH:MM'",
            ));
        }

        let recipients = Recipients {
            to: self.reporting.recipient_email.addresses(),
            daily_cc: self.reporting.cc_daily.addresses(),
            weekly_cc: self.reporting.cc_weekly.addresses(),
            debug_recipient: self
                .reporting
                .debug_recipient
                .as_deref()
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_owned),
        };
        if self.schedule.enabled && recipients.to.is_empty() && recipients.debug_recipient.is_none()
        {
            return Err(invalid(
                "reporting.recipient_email",
                "at least one recipient is required when the schedule is enabled",
            ));
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(invalid(
                "storage.database_url",
                "required for the postgres backend",
            ));
        }
        if self.mail.transport == MailTransport::Relay && self.mail.relay_url.is_none() {
            return Err(invalid("mail.relay_url", "required for the relay transport"));
        }

        Ok(Settings {
            project_name: self.project_name.trim().to_owned(),
            calendar: ReportCalendar::new(offset),
            gate: ThresholdGate::new(min_hours),
            recipients,
            signature: self.reporting.signature.clone(),
            merge: self.merge,
            schedule_enabled: self.schedule.enabled,
            daily_schedule,
            weekly_schedule,
            lock_timeout: Duration::from_millis(self.storage.lock_timeout_ms),
            operation_timeout: Duration::from_millis(self.storage.operation_timeout_ms),
        })
    }
}

fn parse_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }
    trimmed
        .parse::<FixedOffset>()
        .map_err(|err| invalid("timezone_offset", format!("'{raw}': {err}")))
}

fn parse_schedule(field: &'static str, raw: &str) -> Result<CycleSchedule, ConfigError> {
    raw.parse::<CycleSchedule>()
        .map_err(|err| invalid(field, err.to_string()))
}
