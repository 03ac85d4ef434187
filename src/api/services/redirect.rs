//! 短链跳转 `/s/{token}` → `/recipes/{id}/`

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use tracing::{debug, trace};

use crate::errors::FoodgramError;
use crate::services::AppServices;

pub async fn handle_redirect(
    path: web::Path<String>,
    services: web::Data<AppServices>,
) -> Result<HttpResponse, FoodgramError> {
    let token = path.into_inner();
    trace!("Resolving short link {}", token);

    let recipe_id = services.short_links.resolve(&token).await.inspect_err(|e| {
        debug!("Short link {} not resolved: {}", token, e);
    })?;

    Ok(HttpResponse::Found()
        .insert_header((LOCATION, format!("/recipes/{}/", recipe_id)))
        .finish())
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/s")
        .route("/{token}", web::get().to(handle_redirect))
        .route("/{token}/", web::get().to(handle_redirect))
}
