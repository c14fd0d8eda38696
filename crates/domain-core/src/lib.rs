//! domain-core - 领域核心类型
//!
//! 账户、任务以及注册凭据的值对象

mod account;
mod credentials;
mod entity;
mod task;

pub use account::*;
pub use credentials::*;
pub use entity::*;
pub use task::*;

// Re-export common types
pub use tasker_common::{AccountId, AuditInfo, Role, TaskId};
