use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::services::AppServices;

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::{ApiResponse, HealthChecks, HealthResponse, HealthStorageCheck};

/// 数据库探测超时
const PING_TIMEOUT_SECS: u64 = 5;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// Health Service
///
/// 直接访问 storage，只做 `SELECT 1`。
pub struct HealthService;

impl HealthService {
    async fn storage_check(services: &AppServices) -> HealthStorageCheck {
        let backend = services.storage.backend_name().to_string();
        match tokio::time::timeout(
            Duration::from_secs(PING_TIMEOUT_SECS),
            services.storage.ping(),
        )
        .await
        {
            Ok(Ok(())) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some(format!("database error: {}", e)),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        }
    }

    pub async fn health_check(
        services: web::Data<AppServices>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let storage = Self::storage_check(&services).await;
        let is_healthy = storage.status == "healthy";
        let now = chrono::Utc::now();

        let body = ApiResponse {
            code: if is_healthy {
                ErrorCode::Success as i32
            } else {
                ErrorCode::ServiceUnavailable as i32
            },
            data: HealthResponse {
                status: storage.status.clone(),
                timestamp: now.to_rfc3339(),
                uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u32,
                checks: HealthChecks { storage },
                response_time_ms: start_time.elapsed().as_millis() as u32,
            },
        };

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(status, &body)
    }

    /// 就绪：数据库可用
    pub async fn readiness_check(services: web::Data<AppServices>) -> impl Responder {
        let storage = Self::storage_check(&services).await;
        if storage.status == "healthy" {
            HttpResponse::Ok().finish()
        } else {
            HttpResponse::ServiceUnavailable().finish()
        }
    }

    /// 存活：进程在跑即可
    pub async fn liveness_check() -> impl Responder {
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
