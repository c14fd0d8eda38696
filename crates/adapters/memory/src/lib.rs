//! tasker-adapter-memory - 内存存储适配器
//!
//! 开发和测试默认使用；写操作串行化在 `RwLock` 之后

mod account;
mod task;

pub use account::*;
pub use task::*;
