//! 认证提取器
//!
//! `Authorization: Token <jwt>` 或 `Authorization: Bearer <jwt>`。
//! 携带了无效 token 的请求一律 401，即使该接口允许匿名访问。

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use migration::entities::user;

use crate::api::jwt::get_jwt_service;
use crate::errors::FoodgramError;
use crate::services::{AppServices, Permissions};

/// 已登录用户；未登录 → 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    pub fn permissions(&self) -> Permissions {
        Permissions::of(&self.0)
    }
}

/// 可选登录用户
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<user::Model>);

impl OptionalUser {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// 解析 Authorization 头；没有则返回 None
pub fn bearer_token(req: &HttpRequest) -> Result<Option<String>, FoodgramError> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| FoodgramError::unauthorized("Invalid token header."))?;
    let token = value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FoodgramError::unauthorized("Invalid token header."))?;
    Ok(Some(token.to_string()))
}

async fn resolve_user(
    services: Option<web::Data<AppServices>>,
    token: Option<String>,
) -> Result<Option<user::Model>, FoodgramError> {
    let Some(token) = token else {
        return Ok(None);
    };
    let services = services
        .ok_or_else(|| FoodgramError::config("Application services are not registered"))?;

    let claims = get_jwt_service().validate_token(&token).map_err(|e| {
        debug!("Token validation failed: {}", e);
        FoodgramError::unauthorized("Invalid token.")
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| FoodgramError::unauthorized("Invalid token."))?;

    let user = services
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| FoodgramError::unauthorized("User inactive or deleted."))?;

    // 登出或改密后旧 token 的版本号落后
    if claims.ver != user.token_version {
        debug!("Stale token for user {}", user.id);
        return Err(FoodgramError::unauthorized("Invalid token."));
    }
    Ok(Some(user))
}

impl FromRequest for OptionalUser {
    type Error = FoodgramError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let services = req.app_data::<web::Data<AppServices>>().cloned();
        Box::pin(async move { Ok(OptionalUser(resolve_user(services, token?).await?)) })
    }
}

impl FromRequest for AuthUser {
    type Error = FoodgramError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let services = req.app_data::<web::Data<AppServices>>().cloned();
        Box::pin(async move {
            resolve_user(services, token?)
                .await?
                .map(AuthUser)
                .ok_or_else(|| {
                    FoodgramError::unauthorized("Authentication credentials were not provided.")
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_prefixes() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Token abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap().as_deref(), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer xyz"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap().as_deref(), Some("xyz"));

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), None);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic Zm9vOmJhcg=="))
            .to_http_request();
        assert!(matches!(
            bearer_token(&req),
            Err(FoodgramError::Unauthorized(_))
        ));
    }
}
