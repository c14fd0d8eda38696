//! 请求提取器

use std::convert::Infallible;

use axum::{extract::FromRequest, extract::FromRequestParts, http::request::Parts};
use tasker_auth_core::Identity;
use tasker_common::CancellationToken;
use tasker_errors::AppError;

/// JSON 请求体，解析失败渲染为 `{"error": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// 当前请求的取消令牌
///
/// 由 `request_scope` 中间件写入；请求结束或服务关闭时被取消
#[derive(Debug, Clone)]
pub struct RequestCancellation(pub CancellationToken);

impl<S> FromRequestParts<S> for RequestCancellation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestCancellation>()
            .cloned()
            .unwrap_or_else(|| RequestCancellation(CancellationToken::new())))
    }
}

/// 已认证的调用方
///
/// 应该在 `require_auth` 之后使用
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}
