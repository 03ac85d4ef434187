//! HTTP 层：路由、handler、认证提取器与中间件

pub mod auth;
pub mod jwt;
pub mod middleware;
pub mod services;

use actix_web::web;

use crate::services::AppServices;

/// 注册全部路由与共享状态（服务器与集成测试共用）
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    services: web::Data<AppServices>,
    app_start_time: services::AppStartTime,
    api_prefix: &str,
) {
    cfg.app_data(services)
        .app_data(web::Data::new(app_start_time))
        .app_data(services::helpers::json_config())
        .app_data(services::helpers::query_config())
        .app_data(services::helpers::path_config())
        .service(services::health_routes())
        .service(services::redirect_routes())
        .service(services::api_routes(api_prefix));
}
