//! 路由装配

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tasker_common::CancellationToken;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::{request_scope, require_admin, require_auth};
use super::state::AppState;

/// 构建完整路由
///
/// `root` 是服务级取消令牌，每个请求从它派生子令牌
pub fn router(state: AppState, root: CancellationToken) -> Router {
    let tokens = state.tokens.clone();

    // route_layer 后加的先执行：先认证，再检查角色
    let admin = Router::new()
        .route("/promote/{id}", put(handlers::promote))
        .route("/tasks", post(handlers::create_task))
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(tokens.clone(), require_auth));

    let authenticated = Router::new()
        .route("/tasks", get(handlers::list_tasks))
        .route("/tasks/{id}", get(handlers::get_task))
        .route_layer(middleware::from_fn_with_state(tokens, require_auth));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(authenticated)
        .nest("/admin", admin)
        .with_state(state)
        .layer(middleware::from_fn_with_state(root, request_scope))
        .layer(TraceLayer::new_for_http())
}
