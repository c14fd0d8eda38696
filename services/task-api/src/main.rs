//! Task API Service

use tasker_bootstrap::{Infrastructure, ShutdownController, init_runtime, shutdown_signal};
use tasker_config::AppConfig;
use tasker_telemetry::init_metrics;
use task_api::api::http::{AppState, router};
use task_api::application::{AccountService, TaskService};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 可选
    dotenvy::dotenv().ok();

    // 加载配置
    let config = AppConfig::load("config")?;
    config.validate()?;

    // 初始化运行时
    init_runtime(&config);
    let metrics = init_metrics()?;

    info!("Starting Task API Service");

    let infra = Infrastructure::from_config(config).await?;

    let accounts = AccountService::new(
        infra.account_repository(),
        infra.credential_hasher(),
        infra.token_service(),
        infra.timeout_policy(),
    );
    let tasks = TaskService::new(infra.task_repository(), infra.timeout_policy());

    let state = AppState {
        accounts,
        tasks,
        tokens: infra.token_service(),
        metrics: Some(metrics),
        unify_login_errors: infra.config().auth.unify_login_errors,
    };

    let controller = ShutdownController::new();
    let app = router(state, controller.token());

    let server = infra.server_config();
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            controller.shutdown();
        })
        .await?;

    info!("Task API Service stopped");
    Ok(())
}
