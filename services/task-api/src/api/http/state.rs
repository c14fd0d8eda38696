//! 路由共享状态

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tasker_auth_core::TokenService;

use crate::application::{AccountService, TaskService};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub tasks: TaskService,
    pub tokens: Arc<TokenService>,
    /// 未安装 Prometheus recorder 时为 None（测试）
    pub metrics: Option<PrometheusHandle>,
    /// 登录失败时统一返回 "invalid credentials"
    pub unify_login_errors: bool,
}
