//! common - 通用类型和工具库

pub mod scope;
pub mod types;

pub use scope::*;
pub use types::*;

pub use tokio_util::sync::CancellationToken;
