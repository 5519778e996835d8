//! Wire shapes of the webhook endpoint.

use super::error::ApiError;
use crate::worklog::{
    domain::{RegistryEntry, TaskEntry, format_day},
    services::RecordCommitRequest,
};
use serde::{Deserialize, Serialize};

/// Actions accepted by `POST /`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Merge a commit into today's row.
    LogCommit,
    /// Register a task name.
    CreateTask,
    /// Rename a registered task.
    UpdateTask,
    /// Remove a registered task.
    DeleteTask,
}

impl EventAction {
    /// Parses the `action` field; a missing action means `logCommit`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownAction`] for any other value.
    pub fn parse(action: Option<&str>) -> Result<Self, ApiError> {
        match action.map(str::trim) {
            None | Some("" | "logCommit") => Ok(Self::LogCommit),
            Some("createTask") => Ok(Self::CreateTask),
            Some("updateTask") => Ok(Self::UpdateTask),
            Some("deleteTask") => Ok(Self::DeleteTask),
            Some(other) => Err(ApiError::UnknownAction(other.to_owned())),
        }
    }
}

/// Hours as sent by callers: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HoursField {
    /// `"time": 1.5`
    Number(f64),
    /// `"time": "1.5"`
    Text(String),
}

impl HoursField {
    /// Returns the hours, or `None` for a blank string.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTime`] when the text is not a number.
    pub fn value(&self) -> Result<Option<f64>, ApiError> {
        match self {
            Self::Number(hours) => Ok(Some(*hours)),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| ApiError::InvalidTime(text.clone()))
            }
        }
    }
}

/// Body of `POST /`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Requested action.
    #[serde(default)]
    pub action: Option<String>,
    /// Task the event refers to.
    #[serde(default)]
    pub task_name: Option<String>,
    /// Commit message, appended as description lines.
    #[serde(default)]
    pub commit_message: Option<String>,
    /// Hours worked.
    #[serde(default)]
    pub time: Option<HoursField>,
    /// Git branch.
    #[serde(default)]
    pub branch: Option<String>,
    /// Status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Commit SHA.
    #[serde(default)]
    pub sha: Option<String>,
    /// Current name for `updateTask`.
    #[serde(default)]
    pub old_name: Option<String>,
    /// New name for `updateTask`.
    #[serde(default)]
    pub new_name: Option<String>,
}

impl InboundEvent {
    /// Converts a `logCommit` event into an aggregator request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTime`] when `time` is not numeric.
    pub fn into_commit_request(self) -> Result<RecordCommitRequest, ApiError> {
        let hours = self
            .time
            .as_ref()
            .map(HoursField::value)
            .transpose()?
            .flatten();
        let mut request = RecordCommitRequest::new(self.task_name.unwrap_or_default())
            .with_message(self.commit_message.unwrap_or_default())
            .with_branch(self.branch.unwrap_or_default());
        if let Some(value) = hours {
            request = request.with_hours(value);
        }
        if let Some(status) = self.status {
            request = request.with_status(status);
        }
        if let Some(sha) = self.sha {
            request = request.with_sha(sha);
        }
        Ok(request)
    }
}

/// Query string of `GET /`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    /// Requested query.
    #[serde(default)]
    pub action: Option<String>,
}

/// `{ "success": true, "message": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Builds a success response.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `{ "success": true, "tasks": [...] }`
#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Listed items.
    pub tasks: Vec<T>,
}

impl<T> TasksResponse<T> {
    /// Builds a success response.
    #[must_use]
    pub const fn ok(tasks: Vec<T>) -> Self {
        Self {
            success: true,
            tasks,
        }
    }
}

/// One daily-table row as returned by `getTasks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRowView {
    /// Task name.
    pub task_name: String,
    /// Newline-joined description lines.
    pub description: String,
    /// `DD/MM/YYYY`.
    pub date: String,
    /// Accumulated hours.
    pub time: f64,
    /// Git branch.
    pub branch: String,
    /// Status label.
    pub status: String,
    /// Latest commit SHA.
    pub sha: String,
}

impl From<&TaskEntry> for TaskRowView {
    fn from(entry: &TaskEntry) -> Self {
        Self {
            task_name: entry.task_name().as_str().to_owned(),
            description: entry.description_text(),
            date: format_day(entry.date()),
            time: entry.hours().as_f64(),
            branch: entry.branch().to_owned(),
            status: entry.status().to_owned(),
            sha: entry.sha().to_owned(),
        }
    }
}

/// One registry entry as returned by `getRecentTasks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTaskView {
    /// Task name.
    pub name: String,
    /// Last use in epoch milliseconds.
    pub last_used: i64,
}

impl From<&RegistryEntry> for RecentTaskView {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            name: entry.task_name().as_str().to_owned(),
            last_used: entry.last_used().timestamp_millis(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}
