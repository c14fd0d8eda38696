//! 内存任务仓储

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tasker_common::{OperationScope, TaskId};
use tasker_domain_core::{TASK_NOT_FOUND, Task, TaskDraft};
use tasker_errors::{AppError, AppResult};
use tasker_ports::TaskRepository;
use tokio::sync::RwLock;

/// 以 UUIDv7 为键，遍历顺序即创建顺序
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<BTreeMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_all(&self, scope: &OperationScope) -> AppResult<Vec<Task>> {
        scope
            .run(async { Ok(self.tasks.read().await.values().cloned().collect()) })
            .await
    }

    async fn find_by_id(&self, scope: &OperationScope, id: &TaskId) -> AppResult<Option<Task>> {
        scope
            .run(async { Ok(self.tasks.read().await.get(id).cloned()) })
            .await
    }

    async fn insert(&self, scope: &OperationScope, task: &Task) -> AppResult<()> {
        scope
            .run(async {
                self.tasks.write().await.insert(task.id, task.clone());
                Ok(())
            })
            .await
    }

    async fn update_by_id(
        &self,
        scope: &OperationScope,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> AppResult<Task> {
        scope
            .run(async {
                let mut tasks = self.tasks.write().await;
                let Some(task) = tasks.get_mut(id) else {
                    return Err(AppError::not_found(TASK_NOT_FOUND));
                };
                task.apply(draft);
                Ok(task.clone())
            })
            .await
    }

    async fn delete_by_id(&self, scope: &OperationScope, id: &TaskId) -> AppResult<()> {
        scope
            .run(async {
                self.tasks
                    .write()
                    .await
                    .remove(id)
                    .map(|_| ())
                    .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))
            })
            .await
    }
}
