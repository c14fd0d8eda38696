//! 应用层用例
//!
//! 每个用例都从调用方的取消令牌派生一个带超时的 `OperationScope`，
//! 仓储调用全部在这个作用域内完成

mod account;
mod blocking;
mod task;

pub use account::*;
pub use task::*;
