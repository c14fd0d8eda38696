//! telemetry - 可观测性库

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 认证/授权拒绝次数，标签 `reason`
pub const AUTH_REJECTIONS_TOTAL: &str = "auth_rejections_total";
/// 新建账户数，标签 `role`
pub const ACCOUNTS_CREATED_TOTAL: &str = "accounts_created_total";
/// 登录尝试次数，标签 `outcome`
pub const LOGINS_TOTAL: &str = "logins_total";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to install Prometheus recorder: {0}")]
    Metrics(#[from] BuildError),
}

/// 初始化 tracing
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// 初始化 Prometheus metrics，返回的句柄用于渲染 `/metrics`
pub fn init_metrics() -> Result<PrometheusHandle, TelemetryError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    metrics::describe_counter!(
        AUTH_REJECTIONS_TOTAL,
        "Requests rejected by the authentication or role gate"
    );
    metrics::describe_counter!(ACCOUNTS_CREATED_TOTAL, "Accounts created, by role");
    metrics::describe_counter!(LOGINS_TOTAL, "Login attempts, by outcome");
}

/// 健康检查状态
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    #[serde(serialize_with = "serialize_status", rename = "status")]
    pub healthy: bool,
    pub checks: Vec<HealthCheck>,
}

fn serialize_status<S: serde::Serializer>(healthy: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *healthy { "ok" } else { "unavailable" })
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            healthy: true,
            checks: Vec::new(),
        }
    }

    pub fn add_check(&mut self, name: impl Into<String>, healthy: bool, message: Option<String>) {
        if !healthy {
            self.healthy = false;
        }
        self.checks.push(HealthCheck {
            name: name.into(),
            healthy,
            message,
        });
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}
