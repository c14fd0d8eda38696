//! ports - 抽象 trait 层
//!
//! 用例层只依赖这里的仓储接口，具体存储由 adapters 实现

mod repository;

pub use repository::*;
