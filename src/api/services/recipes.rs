//! 菜谱接口：CRUD、收藏、购物车、购物清单下载、短链

use actix_web::http::StatusCode;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::trace;

use crate::api::auth::{AuthUser, OptionalUser};
use crate::errors::FoodgramError;
use crate::services::recipe_validation::RecipeInput;
use crate::services::{AppServices, RecipeCollection, RecipeFilter};

use super::helpers::{json_response, page_params, page_response, query_flag, query_number, query_values};
use super::types::ShortLinkResponse;

type HandlerResult = Result<HttpResponse, FoodgramError>;

/// 从查询串读取过滤条件
fn recipe_filter(req: &HttpRequest) -> Result<RecipeFilter, FoodgramError> {
    let author = query_number(req, "author")?
        .map(|id| {
            i32::try_from(id)
                .map_err(|_| FoodgramError::validation("author: A valid integer is required."))
        })
        .transpose()?;
    Ok(RecipeFilter {
        author,
        tags: query_values(req, "tags")
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect(),
        is_favorited: query_flag(req, "is_favorited"),
        is_in_shopping_cart: query_flag(req, "is_in_shopping_cart"),
    })
}

pub async fn list_recipes(
    req: HttpRequest,
    viewer: OptionalUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let filter = recipe_filter(&req)?;
    let params = page_params(&req, services.page_size)?;
    trace!("Listing recipes with {:?} ({:?})", filter, params);

    let paged = services.recipes.list(viewer.id(), &filter, params).await?;
    Ok(json_response(StatusCode::OK, &page_response(&req, paged)))
}

pub async fn create_recipe(
    user: AuthUser,
    body: web::Json<RecipeInput>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let view = services.recipes.create(&user.0, body.into_inner()).await?;
    Ok(json_response(StatusCode::CREATED, &view))
}

pub async fn get_recipe(
    path: web::Path<i32>,
    viewer: OptionalUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let view = services.recipes.get(viewer.id(), path.into_inner()).await?;
    Ok(json_response(StatusCode::OK, &view))
}

pub async fn update_recipe(
    path: web::Path<i32>,
    user: AuthUser,
    body: web::Json<RecipeInput>,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let view = services
        .recipes
        .update(&user.permissions(), path.into_inner(), body.into_inner())
        .await?;
    Ok(json_response(StatusCode::OK, &view))
}

pub async fn delete_recipe(
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    services
        .recipes
        .delete(&user.permissions(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_to(
    kind: RecipeCollection,
    recipe_id: i32,
    user: &AuthUser,
    services: &AppServices,
) -> HandlerResult {
    let short = services.collections.add(kind, user.0.id, recipe_id).await?;
    Ok(json_response(StatusCode::CREATED, &short))
}

async fn remove_from(
    kind: RecipeCollection,
    recipe_id: i32,
    user: &AuthUser,
    services: &AppServices,
) -> HandlerResult {
    services.collections.remove(kind, user.0.id, recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn add_favorite(
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    add_to(RecipeCollection::Favorites, path.into_inner(), &user, &services).await
}

pub async fn remove_favorite(
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    remove_from(RecipeCollection::Favorites, path.into_inner(), &user, &services).await
}

pub async fn add_to_cart(
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    add_to(RecipeCollection::ShoppingCart, path.into_inner(), &user, &services).await
}

pub async fn remove_from_cart(
    path: web::Path<i32>,
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    remove_from(RecipeCollection::ShoppingCart, path.into_inner(), &user, &services).await
}

/// 下载购物清单（纯文本附件）
pub async fn download_shopping_cart(
    user: AuthUser,
    services: web::Data<AppServices>,
) -> HandlerResult {
    let list = services.shopping_list.build(&user.0).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(list.filename)],
        })
        .body(list.content))
}

/// `{"short-link": "<base>/s/<token>"}`
pub async fn get_link(path: web::Path<i32>, services: web::Data<AppServices>) -> HandlerResult {
    let token = services.short_links.get_or_create(path.into_inner()).await?;
    Ok(json_response(
        StatusCode::OK,
        &ShortLinkResponse {
            short_link: services.short_link_url(&token),
        },
    ))
}
