use std::sync::Arc;

use penman_core::types::{AgentRecord, AgentRole, AgentStatus, TaskResult, TaskSpec};
use penman_harness::provider::{
    CompletionConfig, CompletionProvider, Message, ProviderError,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::manager::{AgentManager, RegistryError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OfficerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// ContentOfficer
// ---------------------------------------------------------------------------

/// Per-agent task runner for content-generation work.
///
/// Spawning an officer generates its agent id and registers the record with
/// the manager; the officer then owns all mutations of that agent's state.
/// A work mutex serializes task processing per agent, so two tasks
/// submitted back-to-back cannot interleave their status writes.
pub struct ContentOfficer {
    id: String,
    manager: Arc<AgentManager>,
    provider: Arc<dyn CompletionProvider>,
    completion: CompletionConfig,
    work_lock: tokio::sync::Mutex<()>,
}

impl ContentOfficer {
    /// Register a new content officer with the manager.
    pub async fn spawn(
        name: impl Into<String>,
        manager: Arc<AgentManager>,
        provider: Arc<dyn CompletionProvider>,
        completion: CompletionConfig,
    ) -> Result<Arc<Self>, RegistryError> {
        let id = format!("content-officer-{}", Uuid::new_v4());
        manager
            .register(AgentRecord::new(id.as_str(), name, AgentRole::Writer))
            .await?;
        Ok(Arc::new(Self {
            id,
            manager,
            provider,
            completion,
            work_lock: tokio::sync::Mutex::new(()),
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Synthesize the system instruction from task parameters: base
    /// instruction, then the optional content-type, tone, and keyword
    /// clauses in that order, then the closing sentence.
    pub fn build_system_prompt(task: &TaskSpec) -> String {
        let params = &task.parameters;
        let mut prompt = String::from(
            "You are a professional Content Officer AI specializing in creating engaging content. ",
        );

        if let Some(content_type) = &params.content_type {
            prompt.push_str(&format!(
                "You are currently focused on creating {}. ",
                content_type
            ));
        }

        if let Some(tone) = &params.tone {
            prompt.push_str(&format!("The tone should be {}. ", tone));
        }

        if !params.keywords.is_empty() {
            prompt.push_str(&format!(
                "Please incorporate these keywords naturally: {}. ",
                params.keywords.join(", ")
            ));
        }

        prompt.push_str(
            "Ensure the content is original, engaging, and matches the specified parameters.",
        );
        prompt
    }

    /// Queue a task and process it immediately.
    pub async fn submit(&self, task: TaskSpec) -> Result<TaskResult, OfficerError> {
        self.manager.queue_task(&self.id, task.clone()).await?;
        self.process_task(task).await
    }

    /// Process a content-generation task.
    ///
    /// Drives the owning agent through Active/0 -> Active/25 (prompt
    /// built) -> Active/75 (completion received) -> Idle/100, recording
    /// the result on the way. A provider failure leaves the agent in
    /// Error/0 and propagates to the caller; there is no retry.
    pub async fn process_task(&self, task: TaskSpec) -> Result<TaskResult, OfficerError> {
        let _work = self.work_lock.lock().await;

        self.manager.begin_task(&self.id, &task).await;
        self.manager
            .update_status(&self.id, AgentStatus::Active, 0)
            .await;

        let messages = vec![
            Message::system(Self::build_system_prompt(&task)),
            Message::user(task.parameters.prompt.as_str()),
        ];
        self.manager
            .update_status(&self.id, AgentStatus::Active, 25)
            .await;

        let completion = match self.provider.complete(&messages, &self.completion).await {
            Ok(completion) => completion,
            Err(e) => {
                error!(agent_id = %self.id, error = %e, "completion call failed");
                self.manager.fail_task(&self.id, &task, &e.to_string()).await;
                self.manager
                    .update_status(&self.id, AgentStatus::Error, 0)
                    .await;
                return Err(e.into());
            }
        };

        self.manager
            .update_status(&self.id, AgentStatus::Active, 75)
            .await;

        let result = TaskResult::from_content(
            completion.content,
            task.parameters.content_type.as_deref(),
        );

        self.manager.complete_task(&self.id, &task, &result).await;
        self.manager
            .update_status(&self.id, AgentStatus::Idle, 100)
            .await;

        info!(
            agent_id = %self.id,
            task_type = %task.task_type,
            words = result.metrics.words,
            "task completed"
        );
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use penman_core::types::{TaskParameters, MAX_ACTIVITIES};
    use penman_harness::provider::MockProvider;

    fn task_with(
        content_type: Option<&str>,
        tone: Option<&str>,
        keywords: &[&str],
    ) -> TaskSpec {
        TaskSpec {
            task_type: "content_generation".into(),
            parameters: TaskParameters {
                prompt: "Write a short tweet about AI and productivity".into(),
                content_type: content_type.map(String::from),
                tone: tone.map(String::from),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                max_length: None,
            },
        }
    }

    async fn officer_with(provider: MockProvider) -> (Arc<ContentOfficer>, Arc<AgentManager>) {
        let manager = Arc::new(AgentManager::new(EventBus::new()));
        let officer = ContentOfficer::spawn(
            "Content Officer",
            manager.clone(),
            Arc::new(provider),
            CompletionConfig::default(),
        )
        .await
        .unwrap();
        (officer, manager)
    }

    #[test]
    fn system_prompt_base_only() {
        let prompt = ContentOfficer::build_system_prompt(&task_with(None, None, &[]));
        assert_eq!(
            prompt,
            "You are a professional Content Officer AI specializing in creating engaging \
             content. Ensure the content is original, engaging, and matches the specified \
             parameters."
        );
    }

    #[test]
    fn system_prompt_clauses_in_fixed_order() {
        let prompt = ContentOfficer::build_system_prompt(&task_with(
            Some("tweet"),
            Some("upbeat"),
            &["AI", "productivity"],
        ));

        let type_at = prompt.find("focused on creating tweet").unwrap();
        let tone_at = prompt.find("The tone should be upbeat").unwrap();
        let keywords_at = prompt
            .find("incorporate these keywords naturally: AI, productivity")
            .unwrap();
        let closing_at = prompt.find("Ensure the content is original").unwrap();

        assert!(type_at < tone_at);
        assert!(tone_at < keywords_at);
        assert!(keywords_at < closing_at);
    }

    #[test]
    fn system_prompt_skips_absent_clauses() {
        let prompt =
            ContentOfficer::build_system_prompt(&task_with(None, Some("formal"), &[]));
        assert!(!prompt.contains("focused on creating"));
        assert!(prompt.contains("The tone should be formal. "));
        assert!(!prompt.contains("keywords"));
    }

    #[tokio::test]
    async fn spawn_registers_the_agent() {
        let (officer, manager) = officer_with(MockProvider::new()).await;
        assert!(officer.id().starts_with("content-officer-"));

        let snap = manager.agent(officer.id()).await.unwrap();
        assert_eq!(snap.role, AgentRole::Writer);
        assert_eq!(snap.status, AgentStatus::Active);
        assert_eq!(manager.stats().await.active_agents, 1);
    }

    #[tokio::test]
    async fn successful_task_updates_agent_and_stats() {
        let provider = MockProvider::new().with_content("AI makes teams faster every day");
        let (officer, manager) = officer_with(provider).await;

        let result = officer
            .submit(task_with(Some("tweet"), None, &[]))
            .await
            .unwrap();

        assert_eq!(result.content, "AI makes teams faster every day");
        assert_eq!(result.summary, "Generated tweet based on prompt");
        assert_eq!(result.metrics.words, 6);
        assert_eq!(result.metrics.characters, 31);

        let snap = manager.agent(officer.id()).await.unwrap();
        assert_eq!(snap.status, AgentStatus::Idle);
        assert_eq!(snap.progress, 100);
        assert_eq!(snap.tasks_completed, 1);
        assert_eq!(snap.activities.len(), 1);
        assert_eq!(snap.activities[0].details, "Generated tweet based on prompt");

        let stats = manager.stats().await;
        assert_eq!(stats.tasks_in_queue, 0);
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.completed_today, 1);
    }

    #[tokio::test]
    async fn provider_receives_system_then_user_message() {
        let manager = Arc::new(AgentManager::new(EventBus::new()));
        let provider = Arc::new(MockProvider::new());
        let officer = ContentOfficer::spawn(
            "Content Officer",
            manager,
            provider.clone(),
            CompletionConfig::default(),
        )
        .await
        .unwrap();

        officer
            .submit(task_with(Some("tweet"), Some("upbeat"), &["AI"]))
            .await
            .unwrap();

        let captured = provider.captured_requests();
        assert_eq!(captured.len(), 1);
        let messages = &captured[0].0;
        assert_eq!(messages.len(), 2);
        assert!(messages[0]
            .content
            .starts_with("You are a professional Content Officer AI"));
        assert_eq!(
            messages[1].content,
            "Write a short tweet about AI and productivity"
        );
    }

    #[tokio::test]
    async fn provider_failure_leaves_agent_in_error() {
        let provider = MockProvider::new().with_error(ProviderError::Api {
            status: 500,
            message: "upstream exploded".into(),
        });
        let (officer, manager) = officer_with(provider).await;

        let err = officer.submit(task_with(None, None, &[])).await.unwrap_err();
        assert!(matches!(err, OfficerError::Provider(_)));

        let snap = manager.agent(officer.id()).await.unwrap();
        assert_eq!(snap.status, AgentStatus::Error);
        assert_eq!(snap.progress, 0);
        assert_eq!(snap.tasks_completed, 0);

        let stats = manager.stats().await;
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.completed_today, 0);
    }

    #[tokio::test]
    async fn next_success_recovers_from_error_status() {
        let provider = MockProvider::new()
            .with_error(ProviderError::Timeout)
            .with_content("recovered");
        let (officer, manager) = officer_with(provider).await;

        assert!(officer.submit(task_with(None, None, &[])).await.is_err());
        assert_eq!(
            manager.agent(officer.id()).await.unwrap().status,
            AgentStatus::Error
        );

        officer.submit(task_with(None, None, &[])).await.unwrap();
        let snap = manager.agent(officer.id()).await.unwrap();
        assert_eq!(snap.status, AgentStatus::Idle);
        assert_eq!(snap.progress, 100);
        assert_eq!(snap.tasks_completed, 1);
    }

    #[tokio::test]
    async fn activity_log_stays_bounded_over_many_tasks() {
        let (officer, manager) = officer_with(MockProvider::new()).await;

        for _ in 0..MAX_ACTIVITIES * 2 {
            officer.submit(task_with(None, None, &[])).await.unwrap();
        }

        let snap = manager.agent(officer.id()).await.unwrap();
        assert_eq!(snap.activities.len(), MAX_ACTIVITIES);
        assert_eq!(snap.tasks_completed, (MAX_ACTIVITIES * 2) as u64);
    }
}
