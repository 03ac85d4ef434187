//! API 请求/响应类型定义

use serde::{Deserialize, Serialize};

use super::error_code::ErrorCode;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub errors: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct AvatarResponse {
    pub avatar: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// 健康检查响应
#[derive(Serialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u32,
    pub checks: HealthChecks,
    pub response_time_ms: u32,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
}

#[derive(Serialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
