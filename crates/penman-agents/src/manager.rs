use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use penman_core::types::{
    Activity, ActivityStatus, AgentRecord, AgentSnapshot, AgentStatus, StatsSnapshot, TaskResult,
    TaskSpec,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::events::{AgentEvent, EventBus};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("agent not found: `{0}`")]
    AgentNotFound(String),
    #[error("duplicate agent id: `{0}`")]
    DuplicateAgent(String),
}

// ---------------------------------------------------------------------------
// AgentManager
// ---------------------------------------------------------------------------

struct AgentEntry {
    record: AgentRecord,
    queue: Vec<TaskSpec>,
}

/// In-memory registry of agent records, per-agent task queues, and
/// process-wide stats counters.
///
/// Explicitly constructed and passed to whoever needs it; there is no
/// global singleton. Every mutation publishes an [`AgentEvent`] on the bus
/// handed in at construction. Stats counters are atomics so snapshot reads
/// never contend with the registry lock; `active_agents` is always derived
/// from the registry size.
pub struct AgentManager {
    agents: RwLock<HashMap<String, AgentEntry>>,
    tasks_in_queue: AtomicU64,
    processing: AtomicU64,
    completed_today: AtomicU64,
    bus: EventBus,
}

impl AgentManager {
    pub fn new(bus: EventBus) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            tasks_in_queue: AtomicU64::new(0),
            processing: AtomicU64::new(0),
            completed_today: AtomicU64::new(0),
            bus,
        }
    }

    // -- Registration and views --

    /// Register an agent keyed by its id and initialize an empty task
    /// queue for it. Agent ids are generated at construction and never
    /// reused, so a duplicate is an error.
    pub async fn register(&self, record: AgentRecord) -> Result<(), RegistryError> {
        let id = record.id.clone();
        let mut agents = self.agents.write().await;
        if agents.contains_key(&id) {
            return Err(RegistryError::DuplicateAgent(id));
        }
        debug!(agent_id = %id, name = %record.name, role = %record.role, "registered agent");
        agents.insert(
            id.clone(),
            AgentEntry {
                record,
                queue: Vec::new(),
            },
        );
        drop(agents);
        self.bus.publish(AgentEvent::AgentRegistered { agent_id: id });
        Ok(())
    }

    /// Safe view of one agent, or `None` if the id is unknown.
    pub async fn agent(&self, id: &str) -> Option<AgentSnapshot> {
        let agents = self.agents.read().await;
        agents.get(id).map(|entry| entry.record.snapshot())
    }

    /// Safe views of all registered agents.
    pub async fn list(&self) -> Vec<AgentSnapshot> {
        let agents = self.agents.read().await;
        agents.values().map(|entry| entry.record.snapshot()).collect()
    }

    /// Number of registered agents.
    pub async fn agent_count(&self) -> usize {
        self.agents.read().await.len()
    }

    // -- Status and task bookkeeping --

    /// Mutate an agent's status and progress in place and notify
    /// subscribers. Silent no-op when the id is unknown.
    pub async fn update_status(&self, id: &str, status: AgentStatus, progress: u8) {
        let mut agents = self.agents.write().await;
        let Some(entry) = agents.get_mut(id) else {
            debug!(agent_id = %id, "status update for unknown agent ignored");
            return;
        };
        entry.record.status = status;
        entry.record.progress = progress;
        drop(agents);
        self.bus.publish(AgentEvent::StatusUpdated {
            agent_id: id.to_string(),
            status,
            progress,
        });
    }

    /// Append a task to the agent's queue and bump the queued-task count.
    /// Unknown ids are an error rather than a silent drop, so callers get
    /// a failure signal.
    pub async fn queue_task(&self, id: &str, task: TaskSpec) -> Result<(), RegistryError> {
        let mut agents = self.agents.write().await;
        let Some(entry) = agents.get_mut(id) else {
            return Err(RegistryError::AgentNotFound(id.to_string()));
        };
        let task_type = task.task_type.clone();
        entry.queue.push(task);
        drop(agents);
        self.tasks_in_queue.fetch_add(1, Ordering::SeqCst);
        self.bus.publish(AgentEvent::TaskQueued {
            agent_id: id.to_string(),
            task_type,
        });
        Ok(())
    }

    /// Mark the start of task processing: drain the oldest queue entry (if
    /// the task was queued), move the queued count to the in-flight count,
    /// and set the current-task descriptor.
    pub async fn begin_task(&self, id: &str, task: &TaskSpec) {
        let mut agents = self.agents.write().await;
        let Some(entry) = agents.get_mut(id) else {
            debug!(agent_id = %id, "begin_task for unknown agent ignored");
            return;
        };
        if !entry.queue.is_empty() {
            entry.queue.remove(0);
            saturating_dec(&self.tasks_in_queue);
        }
        entry.record.current_task = Some(task.task_type.clone());
        drop(agents);
        self.processing.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a completed task: bump the agent's completed counter, prepend
    /// a bounded activity entry, and settle the stats counters.
    pub async fn complete_task(&self, id: &str, task: &TaskSpec, result: &TaskResult) {
        let mut agents = self.agents.write().await;
        let Some(entry) = agents.get_mut(id) else {
            debug!(agent_id = %id, "complete_task for unknown agent ignored");
            return;
        };
        entry.record.tasks_completed += 1;
        entry.record.current_task = None;
        entry.record.push_activity(Activity {
            task: task.task_type.clone(),
            status: ActivityStatus::Completed,
            timestamp: chrono::Utc::now(),
            details: result.summary.clone(),
            metrics: serde_json::json!({
                "words": result.metrics.words,
                "characters": result.metrics.characters,
            }),
        });
        drop(agents);
        saturating_dec(&self.processing);
        self.completed_today.fetch_add(1, Ordering::SeqCst);
        self.bus.publish(AgentEvent::TaskCompleted {
            agent_id: id.to_string(),
            task_type: task.task_type.clone(),
            summary: result.summary.clone(),
        });
    }

    /// Record a failed task: prepend a failed activity entry and settle the
    /// in-flight counter. The caller is responsible for the Error status
    /// transition.
    pub async fn fail_task(&self, id: &str, task: &TaskSpec, error: &str) {
        let mut agents = self.agents.write().await;
        let Some(entry) = agents.get_mut(id) else {
            debug!(agent_id = %id, "fail_task for unknown agent ignored");
            return;
        };
        entry.record.current_task = None;
        entry.record.push_activity(Activity {
            task: task.task_type.clone(),
            status: ActivityStatus::Failed,
            timestamp: chrono::Utc::now(),
            details: error.to_string(),
            metrics: serde_json::json!({}),
        });
        drop(agents);
        saturating_dec(&self.processing);
        self.bus.publish(AgentEvent::TaskFailed {
            agent_id: id.to_string(),
            task_type: task.task_type.clone(),
            error: error.to_string(),
        });
    }

    // -- Stats --

    /// Current process-wide stats snapshot.
    pub async fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            active_agents: self.agents.read().await.len(),
            tasks_in_queue: self.tasks_in_queue.load(Ordering::SeqCst),
            processing: self.processing.load(Ordering::SeqCst),
            completed_today: self.completed_today.load(Ordering::SeqCst),
        }
    }

    /// Zero the completed-today counter. Called by the daily rollover loop.
    pub fn reset_daily(&self) {
        self.completed_today.store(0, Ordering::SeqCst);
        info!("completed-today counter reset");
    }
}

fn saturating_dec(counter: &AtomicU64) {
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
        Some(v.saturating_sub(1))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use penman_core::types::{AgentRole, TaskMetrics, MAX_ACTIVITIES};

    fn manager() -> AgentManager {
        AgentManager::new(EventBus::new())
    }

    fn record(id: &str) -> AgentRecord {
        AgentRecord::new(id, "Test Officer", AgentRole::Writer)
    }

    fn result(summary: &str) -> TaskResult {
        TaskResult {
            content: "generated text".into(),
            summary: summary.into(),
            metrics: TaskMetrics {
                words: 2,
                characters: 14,
            },
        }
    }

    #[tokio::test]
    async fn register_and_list() {
        let mgr = manager();
        mgr.register(record("a-1")).await.unwrap();
        mgr.register(record("a-2")).await.unwrap();

        assert_eq!(mgr.agent_count().await, 2);
        let listed = mgr.list().await;
        assert_eq!(listed.len(), 2);
        assert!(mgr.agent("a-1").await.is_some());
        assert!(mgr.agent("missing").await.is_none());
    }

    #[tokio::test]
    async fn register_duplicate_fails() {
        let mgr = manager();
        mgr.register(record("a-1")).await.unwrap();
        let err = mgr.register(record("a-1")).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAgent(_)));
    }

    #[tokio::test]
    async fn active_agents_always_equals_registry_size() {
        let mgr = manager();
        assert_eq!(mgr.stats().await.active_agents, 0);
        mgr.register(record("a-1")).await.unwrap();
        assert_eq!(mgr.stats().await.active_agents, 1);
        mgr.register(record("a-2")).await.unwrap();
        assert_eq!(mgr.stats().await.active_agents, 2);
    }

    #[tokio::test]
    async fn update_status_mutates_in_place_and_notifies() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mgr = AgentManager::new(bus);
        mgr.register(record("a-1")).await.unwrap();

        mgr.update_status("a-1", AgentStatus::Idle, 100).await;

        let snap = mgr.agent("a-1").await.unwrap();
        assert_eq!(snap.status, AgentStatus::Idle);
        assert_eq!(snap.progress, 100);

        // AgentRegistered then StatusUpdated.
        let _ = rx.try_recv().unwrap();
        let event = rx.try_recv().unwrap();
        assert!(matches!(event, AgentEvent::StatusUpdated { progress: 100, .. }));
    }

    #[tokio::test]
    async fn update_status_unknown_agent_is_a_noop() {
        let mgr = manager();
        mgr.update_status("ghost", AgentStatus::Error, 0).await;
        assert_eq!(mgr.stats().await.active_agents, 0);
    }

    #[tokio::test]
    async fn queue_task_unknown_agent_errors_without_touching_stats() {
        let mgr = manager();
        let err = mgr
            .queue_task("ghost", TaskSpec::content_generation("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::AgentNotFound(_)));

        let stats = mgr.stats().await;
        assert_eq!(stats.tasks_in_queue, 0);
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.completed_today, 0);
    }

    #[tokio::test]
    async fn queue_begin_complete_settles_counters() {
        let mgr = manager();
        mgr.register(record("a-1")).await.unwrap();
        let task = TaskSpec::content_generation("hi");

        mgr.queue_task("a-1", task.clone()).await.unwrap();
        assert_eq!(mgr.stats().await.tasks_in_queue, 1);

        mgr.begin_task("a-1", &task).await;
        let stats = mgr.stats().await;
        assert_eq!(stats.tasks_in_queue, 0);
        assert_eq!(stats.processing, 1);
        assert_eq!(
            mgr.agent("a-1").await.unwrap().current_task.as_deref(),
            Some("content_generation")
        );

        mgr.complete_task("a-1", &task, &result("done")).await;
        let stats = mgr.stats().await;
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.completed_today, 1);

        let snap = mgr.agent("a-1").await.unwrap();
        assert_eq!(snap.tasks_completed, 1);
        assert!(snap.current_task.is_none());
        assert_eq!(snap.activities.len(), 1);
        assert_eq!(snap.activities[0].details, "done");
        assert_eq!(snap.activities[0].status, ActivityStatus::Completed);
        assert_eq!(snap.activities[0].metrics["words"], 2);
    }

    #[tokio::test]
    async fn completed_entries_prepend_and_cap() {
        let mgr = manager();
        mgr.register(record("a-1")).await.unwrap();
        let task = TaskSpec::content_generation("hi");

        for n in 0..MAX_ACTIVITIES + 5 {
            mgr.begin_task("a-1", &task).await;
            mgr.complete_task("a-1", &task, &result(&format!("run {}", n)))
                .await;
        }

        let snap = mgr.agent("a-1").await.unwrap();
        assert_eq!(snap.activities.len(), MAX_ACTIVITIES);
        assert_eq!(snap.activities[0].details, "run 14");
        assert_eq!(snap.tasks_completed, (MAX_ACTIVITIES + 5) as u64);
    }

    #[tokio::test]
    async fn fail_task_records_failed_activity() {
        let mgr = manager();
        mgr.register(record("a-1")).await.unwrap();
        let task = TaskSpec::content_generation("hi");

        mgr.begin_task("a-1", &task).await;
        mgr.fail_task("a-1", &task, "API error (status 500): boom")
            .await;

        let snap = mgr.agent("a-1").await.unwrap();
        assert_eq!(snap.tasks_completed, 0);
        assert!(snap.current_task.is_none());
        assert_eq!(snap.activities[0].status, ActivityStatus::Failed);
        assert!(snap.activities[0].details.contains("boom"));

        let stats = mgr.stats().await;
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.completed_today, 0);
    }

    #[tokio::test]
    async fn reset_daily_zeroes_completed_today_only() {
        let mgr = manager();
        mgr.register(record("a-1")).await.unwrap();
        let task = TaskSpec::content_generation("hi");
        mgr.begin_task("a-1", &task).await;
        mgr.complete_task("a-1", &task, &result("done")).await;
        assert_eq!(mgr.stats().await.completed_today, 1);

        mgr.reset_daily();
        let stats = mgr.stats().await;
        assert_eq!(stats.completed_today, 0);
        assert_eq!(stats.active_agents, 1);
        assert_eq!(mgr.agent("a-1").await.unwrap().tasks_completed, 1);
    }

    #[tokio::test]
    async fn lifecycle_events_published_in_order() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mgr = AgentManager::new(bus);
        mgr.register(record("a-1")).await.unwrap();
        let task = TaskSpec::content_generation("hi");
        mgr.queue_task("a-1", task.clone()).await.unwrap();
        mgr.begin_task("a-1", &task).await;
        mgr.complete_task("a-1", &task, &result("done")).await;

        let events: Vec<AgentEvent> = rx.try_iter().collect();
        assert!(matches!(events[0], AgentEvent::AgentRegistered { .. }));
        assert!(matches!(events[1], AgentEvent::TaskQueued { .. }));
        assert!(matches!(events[2], AgentEvent::TaskCompleted { .. }));
    }
}
