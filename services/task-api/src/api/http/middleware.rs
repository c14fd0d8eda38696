//! 中间件
//!
//! `require_auth` 校验 Bearer 令牌并发布 `Identity`；
//! `require_admin` 只读取已发布的 `Identity`，不重新解析令牌

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tasker_auth_core::{Identity, TokenError, TokenService};
use tasker_common::CancellationToken;
use tasker_errors::AppError;
use tasker_telemetry::AUTH_REJECTIONS_TOTAL;
use tracing::{debug, warn};

use super::extract::RequestCancellation;

pub const AUTH_HEADER_REQUIRED: &str = "Authorization header is required";
pub const INVALID_AUTH_HEADER: &str = "Invalid authorization header";
pub const ADMIN_REQUIRED: &str = "Admin access required";

fn reject(reason: &'static str, error: AppError) -> AppError {
    counter!(AUTH_REJECTIONS_TOTAL, "reason" => reason).increment(1);
    warn!(reason, "Request rejected");
    error
}

/// 解析 `Bearer <token>`
///
/// 必须恰好两段（单个空格分隔），scheme 不区分大小写
fn bearer_token(header: &HeaderValue) -> Option<&str> {
    let value = header.to_str().ok()?;
    let mut parts = value.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;

    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

/// JWT 认证中间件
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(reject(
                "missing_header",
                AppError::unauthorized(AUTH_HEADER_REQUIRED),
            ));
        }
    };

    let token = bearer_token(header).ok_or_else(|| {
        reject(
            "malformed_header",
            AppError::unauthorized(INVALID_AUTH_HEADER),
        )
    })?;

    let claims = tokens.validate(token).map_err(|e| {
        let reason = match e {
            TokenError::Expired => "expired_token",
            TokenError::SignatureInvalid => "bad_signature",
            TokenError::Malformed | TokenError::Signing(_) => "invalid_token",
        };
        reject(reason, AppError::from(e))
    })?;

    let identity = claims
        .identity()
        .map_err(|e| reject("invalid_token", AppError::from(e)))?;

    debug!(account_id = %identity.account_id, role = %identity.role, "Token validated");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// 管理员角色门
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let caller = request
        .extensions()
        .get::<Identity>()
        .map(|identity| (identity.account_id, identity.is_administrator()));

    match caller {
        Some((_, true)) => Ok(next.run(request).await),
        Some((account_id, false)) => {
            debug!(%account_id, "Administrator role required");
            Err(reject("not_admin", AppError::forbidden(ADMIN_REQUIRED)))
        }
        None => Err(reject("no_identity", AppError::forbidden(ADMIN_REQUIRED))),
    }
}

/// 为每个请求派生取消令牌
///
/// 请求完成或连接断开（future 被丢弃）时令牌被取消
pub async fn request_scope(
    State(root): State<CancellationToken>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = root.child_token();
    let _guard = token.clone().drop_guard();
    request
        .extensions_mut()
        .insert(RequestCancellation(token));

    next.run(request).await
}
