//! Task records as they arrive from (and go back to) the host.
//!
//! Only the fields the engine reads are typed. Everything else the caller
//! sends rides along in `extra` and is written back out untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default importance when a task omits it.
pub const DEFAULT_IMPORTANCE: i64 = 5;

/// Default effort estimate (hours) when a task omits it.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;

/// Caller-defined task identifier. Clients send either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Int(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Int(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId::Text(s)
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Int(n)
    }
}

/// Input task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Raw due date as the caller sent it. Parsed at scoring time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// Nominally 1-10, not clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<i64>,

    /// Hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    /// Ids of other tasks in the batch. Unknown ids are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<TaskId>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            due_date: None,
            importance: None,
            estimated_hours: None,
            dependencies: None,
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_due_date(mut self, due: impl Into<String>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_dependencies<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.dependencies = Some(deps.into_iter().map(Into::into).collect());
        self
    }

    pub fn importance_or_default(&self) -> i64 {
        self.importance.unwrap_or(DEFAULT_IMPORTANCE)
    }

    pub fn hours_or_default(&self) -> f64 {
        self.estimated_hours.unwrap_or(DEFAULT_ESTIMATED_HOURS)
    }

    pub fn deps(&self) -> &[TaskId] {
        self.dependencies.as_deref().unwrap_or(&[])
    }

    /// Due date text, with blank strings treated as absent.
    pub fn due_date_str(&self) -> Option<&str> {
        self.due_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A task plus its computed score and explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    #[serde(flatten)]
    pub task: Task,
    pub score: f64,
    pub explanation: String,
}

impl ScoredTask {
    pub fn id(&self) -> &TaskId {
        &self.task.id
    }
}
