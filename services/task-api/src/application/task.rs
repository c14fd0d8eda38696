//! 任务增删改查

use std::sync::Arc;

use tasker_common::{CancellationToken, TaskId, TimeoutPolicy};
use tasker_domain_core::{TASK_NOT_FOUND, Task, TaskDraft};
use tasker_errors::{AppError, AppResult};
use tasker_ports::TaskRepository;
use tracing::info;

fn parse_task_id(id: &str) -> AppResult<TaskId> {
    TaskId::from_string(id).map_err(|_| AppError::validation("invalid task id"))
}

/// 任务用例
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    timeouts: TimeoutPolicy,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>, timeouts: TimeoutPolicy) -> Self {
        Self {
            repository,
            timeouts,
        }
    }

    pub async fn list(&self, parent: &CancellationToken) -> AppResult<Vec<Task>> {
        let scope = self.timeouts.scope(parent);
        self.repository.find_all(&scope).await
    }

    pub async fn get(&self, parent: &CancellationToken, id: &str) -> AppResult<Task> {
        let id = parse_task_id(id)?;
        let scope = self.timeouts.scope(parent);

        self.repository
            .find_by_id(&scope, &id)
            .await?
            .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))
    }

    pub async fn create(&self, parent: &CancellationToken, draft: TaskDraft) -> AppResult<Task> {
        let scope = self.timeouts.scope(parent);
        let task = Task::create(draft);

        self.repository.insert(&scope, &task).await?;
        info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    pub async fn update(
        &self,
        parent: &CancellationToken,
        id: &str,
        draft: TaskDraft,
    ) -> AppResult<Task> {
        let id = parse_task_id(id)?;
        let scope = self.timeouts.scope(parent);

        let task = self.repository.update_by_id(&scope, &id, &draft).await?;
        info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    pub async fn delete(&self, parent: &CancellationToken, id: &str) -> AppResult<()> {
        let id = parse_task_id(id)?;
        let scope = self.timeouts.scope(parent);

        self.repository.delete_by_id(&scope, &id).await?;
        info!(task_id = %id, "Task deleted");
        Ok(())
    }
}
