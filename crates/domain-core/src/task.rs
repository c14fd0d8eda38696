//! 任务实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasker_common::TaskId;
use tasker_errors::AppError;
use thiserror::Error;

use crate::Entity;

pub const TASK_NOT_FOUND: &str = "task not found";

/// 任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
}

impl Task {
    pub fn create(draft: TaskDraft) -> Self {
        Self {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            status: draft.status,
        }
    }

    /// 用草稿整体替换可写字段
    pub fn apply(&mut self, draft: &TaskDraft) {
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.due_date = draft.due_date;
        self.status = draft.status.clone();
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 创建或更新任务时的输入，四个字段均为必填
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
        status: impl Into<String>,
    ) -> Result<Self, TaskError> {
        let title = required("title", title.into())?;
        let description = required("description", description.into())?;
        let due_date = due_date.ok_or(TaskError::MissingField("due_date"))?;
        let status = required("status", status.into())?;

        Ok(Self {
            title,
            description,
            due_date,
            status,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, TaskError> {
    if value.trim().is_empty() {
        return Err(TaskError::MissingField(field));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        AppError::validation(err.to_string())
    }
}
