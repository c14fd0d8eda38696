//! 请求/响应 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasker_common::Role;
use tasker_domain_core::{Account, Task, TaskDraft, TaskError};

use crate::application::RegisterAccount;

/// 注册请求，未知字段（包括 `role`）被忽略
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

impl From<RegisterRequest> for RegisterAccount {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 账户响应，不含密码哈希
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.as_str().to_string(),
            role: account.role,
            created_at: account.audit_info.created_at,
            updated_at: account.audit_info.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountResponse,
}

/// 创建/更新任务请求
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: String,
}

impl TaskRequest {
    pub fn into_draft(self) -> Result<TaskDraft, TaskError> {
        TaskDraft::new(self.title, self.description, self.due_date, self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
