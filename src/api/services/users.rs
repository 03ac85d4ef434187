//! 用户接口：注册、资料、头像、改密、订阅

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::api::auth::{AuthUser, OptionalUser};
use crate::errors::FoodgramError;
use crate::services::{AppServices, RegistrationInput};

use super::helpers::{json_response, page_params, page_response, query_number};
use super::types::{AvatarRequest, AvatarResponse, SetPasswordRequest};

type HandlerResult = Result<HttpResponse, FoodgramError>;

pub async fn register(
    body: web::Json<RegistrationInput>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let created = services.users.register(body.into_inner()).await?;
    Ok(json_response(StatusCode::CREATED, &created))
}

pub async fn list_users(
    req: HttpRequest,
    viewer: OptionalUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let params = page_params(&req, services.page_size)?;
    let paged = services.users.list(viewer.id(), params).await?;
    Ok(json_response(StatusCode::OK, &page_response(&req, paged)))
}

pub async fn get_user(
    path: web::Path<i32>,
    viewer: OptionalUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let view = services.users.get(viewer.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &view))
}

pub async fn me(user: AuthUser, services: web::Data<AppServices>) -> HandlerResult {
    let view = services.users.view_of(Some(user.0.id), &user.0).await?;
    Ok(json_response(StatusCode::OK, &view))
}

pub async fn set_avatar(
    user: AuthUser,
    body: web::Json<AvatarRequest>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let avatar = services
        .users
        .set_avatar(&user.0, body.avatar.as_deref())
        .await?;
    Ok(json_response(StatusCode::OK, &AvatarResponse { avatar }))
}

pub async fn delete_avatar(user: AuthUser, services: web::Data<AppServices>) -> HandlerResult {
    services.users.delete_avatar(&user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn set_password(
    user: AuthUser,
    body: web::Json<SetPasswordRequest>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    services
        .users
        .set_password(&user.0, &body.current_password, &body.new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn subscriptions(
    req: HttpRequest,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let params = page_params(&req, services.page_size)?;
    let recipes_limit = query_number(&req, "recipes_limit")?;
    let paged = services
        .users
        .subscriptions(&user.0, params, recipes_limit)
        .await?;
    Ok(json_response(StatusCode::OK, &page_response(&req, paged)))
}

pub async fn subscribe(
    req: HttpRequest,
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let recipes_limit = query_number(&req, "recipes_limit")?;
    let view = services
        .users
        .subscribe(&user.0, path.into_inner(), recipes_limit)
        .await?;
    Ok(json_response(StatusCode::CREATED, &view))
}

pub async fn unsubscribe(
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    services.users.unsubscribe(&user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
