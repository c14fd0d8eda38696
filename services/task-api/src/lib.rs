//! task-api - 任务管理 HTTP 服务
//!
//! - `application`: 用例（账户开通、登录、任务增删改查）
//! - `api::http`: 路由、认证/授权中间件、DTO

pub mod api;
pub mod application;
pub mod error;
