use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of activity entries retained per agent, most recent first.
pub const MAX_ACTIVITIES: usize = 10;

// ---------------------------------------------------------------------------
// AgentRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Writer,
    Coder,
    Analyst,
    Designer,
    Researcher,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgentRole::Writer => "Writer",
            AgentRole::Coder => "Coder",
            AgentRole::Analyst => "Analyst",
            AgentRole::Designer => "Designer",
            AgentRole::Researcher => "Researcher",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// AgentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    Active,
    Idle,
    Error,
    Offline,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgentStatus::Active => "Active",
            AgentStatus::Idle => "Idle",
            AgentStatus::Error => "Error",
            AgentStatus::Offline => "Offline",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Completed,
    InProgress,
    Queued,
    Failed,
}

/// A single entry in an agent's bounded activity history. Immutable once
/// recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Task type tag (e.g. "content_generation").
    pub task: String,
    pub status: ActivityStatus,
    pub timestamp: DateTime<Utc>,
    pub details: String,
    /// Task-specific metric mapping (word/character counts, etc.).
    pub metrics: serde_json::Value,
}

// ---------------------------------------------------------------------------
// AgentRecord / AgentSnapshot
// ---------------------------------------------------------------------------

/// Internal mutable state of one agent. Lives in the registry for the
/// process lifetime; only the task runner mutates it.
#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    pub progress: u8,
    pub tasks_completed: u64,
    /// Most-recent-first, capped at [`MAX_ACTIVITIES`].
    pub activities: Vec<Activity>,
}

impl AgentRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            status: AgentStatus::Active,
            current_task: None,
            progress: 0,
            tasks_completed: 0,
            activities: Vec::new(),
        }
    }

    /// Prepend an activity entry, evicting the oldest past the cap.
    pub fn push_activity(&mut self, activity: Activity) {
        self.activities.insert(0, activity);
        self.activities.truncate(MAX_ACTIVITIES);
    }

    /// Externally-safe view for JSON serialization.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
            status: self.status,
            current_task: self.current_task.clone(),
            progress: self.progress,
            tasks_completed: self.tasks_completed,
            activities: self.activities.clone(),
        }
    }
}

/// Read-only agent view returned by the registry and the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    pub progress: u8,
    pub tasks_completed: u64,
    pub activities: Vec<Activity>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A unit of work submitted to an agent: a type tag plus parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    #[serde(rename = "type")]
    pub task_type: String,
    pub parameters: TaskParameters,
}

impl TaskSpec {
    /// Convenience constructor for the common content-generation task.
    pub fn content_generation(prompt: impl Into<String>) -> Self {
        Self {
            task_type: "content_generation".to_string(),
            parameters: TaskParameters {
                prompt: prompt.into(),
                ..TaskParameters::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameters {
    /// The user prompt forwarded to the completion API. Required; the HTTP
    /// layer rejects empty prompts before a task reaches the runner.
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

/// Result of a completed content-generation task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub content: String,
    pub summary: String,
    pub metrics: TaskMetrics,
}

impl TaskResult {
    /// Build a result from generated text, deriving the summary line and
    /// word/character metrics.
    pub fn from_content(content: String, content_type: Option<&str>) -> Self {
        let metrics = TaskMetrics::for_text(&content);
        let summary = format!(
            "Generated {} based on prompt",
            content_type.unwrap_or("content")
        );
        Self {
            content,
            summary,
            metrics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub words: usize,
    pub characters: usize,
}

impl TaskMetrics {
    /// Word count splits on single spaces (empty segments included), so an
    /// empty string still counts as one word.
    pub fn for_text(text: &str) -> Self {
        Self {
            words: text.split(' ').count(),
            characters: text.chars().count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Process-wide counters surfaced to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Always equals the registry size.
    pub active_agents: usize,
    pub tasks_in_queue: u64,
    pub processing: u64,
    pub completed_today: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
