//! Repository trait 定义
//!
//! 所有方法都接收用例派生的 `OperationScope`，实现必须通过 `scope.run(..)`
//! 执行存储调用，保证调用不会超过用例的截止时间

use async_trait::async_trait;
use tasker_common::{AccountId, OperationScope, TaskId};
use tasker_domain_core::{Account, Task, TaskDraft};
use tasker_errors::AppResult;

/// 账户仓储
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 按用户名查找
    async fn find_by_username(
        &self,
        scope: &OperationScope,
        username: &str,
    ) -> AppResult<Option<Account>>;

    /// 统计账户总数
    async fn count_all(&self, scope: &OperationScope) -> AppResult<u64>;

    /// 插入新账户
    ///
    /// 用户名重复返回 `Conflict(DUPLICATE_USERNAME)`；
    /// 已存在初始管理员时再插入 bootstrap 账户返回 `Conflict(BOOTSTRAP_CONFLICT)`
    async fn insert(&self, scope: &OperationScope, account: &Account) -> AppResult<()>;

    /// 提升为管理员，账户不存在时返回 `NotFound`
    ///
    /// 返回是否发生了变更；已是管理员时不写入（`updated_at` 不变）
    async fn promote_by_id(&self, scope: &OperationScope, id: &AccountId) -> AppResult<bool>;
}

/// 任务仓储
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_all(&self, scope: &OperationScope) -> AppResult<Vec<Task>>;

    async fn find_by_id(&self, scope: &OperationScope, id: &TaskId) -> AppResult<Option<Task>>;

    async fn insert(&self, scope: &OperationScope, task: &Task) -> AppResult<()>;

    /// 整体替换可写字段，任务不存在时返回 `NotFound`
    async fn update_by_id(
        &self,
        scope: &OperationScope,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> AppResult<Task>;

    /// 删除任务，任务不存在时返回 `NotFound`
    async fn delete_by_id(&self, scope: &OperationScope, id: &TaskId) -> AppResult<()>;
}
