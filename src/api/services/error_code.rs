//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::FoodgramError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 菜谱/短链错误
/// - 4000-4099: 用户错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 菜谱/短链错误 3000-3099
    EmptyShoppingCart = 3002,
    ShortLinkExhausted = 3003,

    // 用户错误 4000-4099
    AlreadyExists = 4001,
}

impl From<&FoodgramError> for ErrorCode {
    fn from(err: &FoodgramError) -> Self {
        match err {
            FoodgramError::Validation(_) => ErrorCode::BadRequest,
            FoodgramError::NotFound(_) => ErrorCode::NotFound,
            FoodgramError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            FoodgramError::EmptyShoppingCart(_) => ErrorCode::EmptyShoppingCart,
            FoodgramError::Unauthorized(_) => ErrorCode::Unauthorized,
            FoodgramError::Forbidden(_) => ErrorCode::Forbidden,
            FoodgramError::TokenSpaceExhausted(_) => ErrorCode::ShortLinkExhausted,
            FoodgramError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            FoodgramError::DatabaseConfig(_)
            | FoodgramError::DatabaseOperation(_)
            | FoodgramError::FileOperation(_)
            | FoodgramError::Serialization(_)
            | FoodgramError::PasswordHash(_)
            | FoodgramError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "1004");
        let code: ErrorCode = serde_json::from_str("3002").unwrap();
        assert_eq!(code, ErrorCode::EmptyShoppingCart);
    }

    #[test]
    fn test_from_error() {
        let err = FoodgramError::already_exists("Recipe already added!");
        assert_eq!(ErrorCode::from(&err), ErrorCode::AlreadyExists);
        let err = FoodgramError::database_operation("boom");
        assert_eq!(ErrorCode::from(&err), ErrorCode::InternalServerError);
    }
}
