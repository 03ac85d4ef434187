//! 标签与食材（只读、不分页）

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use crate::errors::FoodgramError;
use crate::services::AppServices;

use super::helpers::json_response;
use super::types::IngredientQuery;

type HandlerResult = Result<HttpResponse, FoodgramError>;

pub async fn list_tags(services: web::Data<AppServices>) -> HandlerResult {
    Ok(json_response(StatusCode::OK, &services.catalog.tags().await?))
}

pub async fn get_tag(path: web::Path<i32>, services: web::Data<AppServices>) -> HandlerResult {
    let tag = services.catalog.tag(path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &tag))
}

pub async fn list_ingredients(
    query: web::Query<IngredientQuery>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let items = services.catalog.ingredients(query.name.as_deref()).await?;
    Ok(json_response(StatusCode::OK, &items))
}

pub async fn get_ingredient(
    path: web::Path<i32>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let item = services.catalog.ingredient(path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &item))
}
