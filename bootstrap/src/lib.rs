//! tasker-bootstrap - 服务启动骨架
//!
//! 运行时初始化、基础设施装配、优雅关闭

mod infrastructure;
mod retry;
mod runtime;
mod shutdown;

pub use infrastructure::*;
pub use retry::*;
pub use runtime::*;
pub use shutdown::*;
