//! 登录/登出
//!
//! token 是带 `ver` 的 JWT；登出把用户的 token_version 加一，已签发的 token 全部失效。

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use governor::middleware::NoOpMiddleware;
use tracing::{debug, error, info};

use crate::api::auth::AuthUser;
use crate::api::jwt::get_jwt_service;
use crate::config::get_config;
use crate::errors::FoodgramError;
use crate::services::AppServices;

use super::helpers::json_response;
use super::types::{LoginCredentials, TokenResponse};

/// 按连接 IP 限流；取不到对端地址时归入同一个桶
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        Ok(req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string()))
    }
}

/// 登录限流器，超限返回 429
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let api = &get_config().api;
    let burst = api.login_burst.max(1);
    let refill = api.login_refill_seconds.max(1);

    let config = GovernorConfigBuilder::default()
        .seconds_per_request(refill)
        .burst_size(burst)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("burst and refill are clamped to at least 1");

    debug!("Login rate limiter created: 1 req/{}s, burst {}", refill, burst);
    Governor::new(&config)
}

pub async fn login(
    body: web::Json<LoginCredentials>,
    services: web::Data<AppServices>,
) -> Result<HttpResponse, FoodgramError> {
    let user = services
        .users
        .authenticate(&body.email, &body.password)
        .await?;

    let auth_token = get_jwt_service()
        .generate_token(user.id, user.token_version)
        .map_err(|e| {
            error!("Failed to generate auth token: {}", e);
            FoodgramError::config("Failed to generate auth token")
        })?;

    info!("User {} logged in", user.id);
    Ok(json_response(StatusCode::OK, &TokenResponse { auth_token }))
}

pub async fn logout(
    user: AuthUser,
    services: web::Data<AppServices>,
) -> Result<HttpResponse, FoodgramError> {
    services.users.revoke_tokens(user.0.id).await?;
    info!("User {} logged out", user.0.id);
    Ok(HttpResponse::NoContent().finish())
}
