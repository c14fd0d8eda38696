//! PostgreSQL 任务仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tasker_common::{OperationScope, TaskId};
use tasker_domain_core::{TASK_NOT_FOUND, Task, TaskDraft};
use tasker_errors::{AppError, AppResult};
use tasker_ports::TaskRepository;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    status: String,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: TaskId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn find_all(&self, scope: &OperationScope) -> AppResult<Vec<Task>> {
        let rows = scope
            .run(async {
                sqlx::query_as::<_, TaskRow>(
                    "SELECT id, title, description, due_date, status FROM tasks ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to list tasks: {}", e)))
            })
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn find_by_id(&self, scope: &OperationScope, id: &TaskId) -> AppResult<Option<Task>> {
        let row = scope
            .run(async {
                sqlx::query_as::<_, TaskRow>(
                    "SELECT id, title, description, due_date, status FROM tasks WHERE id = $1",
                )
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to find task: {}", e)))
            })
            .await?;

        Ok(row.map(Task::from))
    }

    async fn insert(&self, scope: &OperationScope, task: &Task) -> AppResult<()> {
        scope
            .run(async {
                sqlx::query(
                    r#"
                    INSERT INTO tasks (id, title, description, due_date, status)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(task.id.0)
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.due_date)
                .bind(&task.status)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to insert task: {}", e)))
            })
            .await?;
        Ok(())
    }

    async fn update_by_id(
        &self,
        scope: &OperationScope,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> AppResult<Task> {
        let row = scope
            .run(async {
                sqlx::query_as::<_, TaskRow>(
                    r#"
                    UPDATE tasks
                    SET title = $1, description = $2, due_date = $3, status = $4
                    WHERE id = $5
                    RETURNING id, title, description, due_date, status
                    "#,
                )
                .bind(&draft.title)
                .bind(&draft.description)
                .bind(draft.due_date)
                .bind(&draft.status)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to update task: {}", e)))
            })
            .await?;

        row.map(Task::from)
            .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))
    }

    async fn delete_by_id(&self, scope: &OperationScope, id: &TaskId) -> AppResult<()> {
        let result = scope
            .run(async {
                sqlx::query("DELETE FROM tasks WHERE id = $1")
                    .bind(id.0)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to delete task: {}", e)))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(TASK_NOT_FOUND));
        }
        Ok(())
    }
}
