use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoodgramError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    /// 重复状态：已收藏、已订阅、自我订阅、邮箱占用等
    AlreadyExists(String),
    EmptyShoppingCart(String),
    Unauthorized(String),
    Forbidden(String),
    Serialization(String),
    PasswordHash(String),
    TokenSpaceExhausted(String),
    Config(String),
}

impl FoodgramError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            FoodgramError::DatabaseConfig(_) => "E001",
            FoodgramError::DatabaseConnection(_) => "E002",
            FoodgramError::DatabaseOperation(_) => "E003",
            FoodgramError::FileOperation(_) => "E004",
            FoodgramError::Validation(_) => "E005",
            FoodgramError::NotFound(_) => "E006",
            FoodgramError::AlreadyExists(_) => "E007",
            FoodgramError::EmptyShoppingCart(_) => "E008",
            FoodgramError::Unauthorized(_) => "E009",
            FoodgramError::Forbidden(_) => "E010",
            FoodgramError::Serialization(_) => "E011",
            FoodgramError::PasswordHash(_) => "E012",
            FoodgramError::TokenSpaceExhausted(_) => "E013",
            FoodgramError::Config(_) => "E014",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            FoodgramError::DatabaseConfig(_) => "Database Configuration Error",
            FoodgramError::DatabaseConnection(_) => "Database Connection Error",
            FoodgramError::DatabaseOperation(_) => "Database Operation Error",
            FoodgramError::FileOperation(_) => "File Operation Error",
            FoodgramError::Validation(_) => "Validation Error",
            FoodgramError::NotFound(_) => "Resource Not Found",
            FoodgramError::AlreadyExists(_) => "Already Exists",
            FoodgramError::EmptyShoppingCart(_) => "Empty Shopping Cart",
            FoodgramError::Unauthorized(_) => "Unauthorized",
            FoodgramError::Forbidden(_) => "Forbidden",
            FoodgramError::Serialization(_) => "Serialization Error",
            FoodgramError::PasswordHash(_) => "Password Hash Error",
            FoodgramError::TokenSpaceExhausted(_) => "Short Link Token Space Exhausted",
            FoodgramError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            FoodgramError::DatabaseConfig(msg)
            | FoodgramError::DatabaseConnection(msg)
            | FoodgramError::DatabaseOperation(msg)
            | FoodgramError::FileOperation(msg)
            | FoodgramError::Validation(msg)
            | FoodgramError::NotFound(msg)
            | FoodgramError::AlreadyExists(msg)
            | FoodgramError::EmptyShoppingCart(msg)
            | FoodgramError::Unauthorized(msg)
            | FoodgramError::Forbidden(msg)
            | FoodgramError::Serialization(msg)
            | FoodgramError::PasswordHash(msg)
            | FoodgramError::TokenSpaceExhausted(msg)
            | FoodgramError::Config(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            FoodgramError::Validation(_)
            | FoodgramError::AlreadyExists(_)
            | FoodgramError::EmptyShoppingCart(_) => StatusCode::BAD_REQUEST,
            FoodgramError::NotFound(_) => StatusCode::NOT_FOUND,
            FoodgramError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            FoodgramError::Forbidden(_) => StatusCode::FORBIDDEN,
            FoodgramError::DatabaseConfig(_)
            | FoodgramError::DatabaseConnection(_)
            | FoodgramError::DatabaseOperation(_)
            | FoodgramError::FileOperation(_)
            | FoodgramError::Serialization(_)
            | FoodgramError::PasswordHash(_)
            | FoodgramError::TokenSpaceExhausted(_)
            | FoodgramError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 客户端错误（4xx）不需要以 error 级别记录
    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    #[cfg(feature = "cli")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for FoodgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for FoodgramError {}

// 便捷的构造函数
impl FoodgramError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        FoodgramError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        FoodgramError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        FoodgramError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        FoodgramError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        FoodgramError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        FoodgramError::NotFound(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        FoodgramError::AlreadyExists(msg.into())
    }

    pub fn empty_shopping_cart<T: Into<String>>(msg: T) -> Self {
        FoodgramError::EmptyShoppingCart(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        FoodgramError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        FoodgramError::Forbidden(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        FoodgramError::Serialization(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        FoodgramError::PasswordHash(msg.into())
    }

    pub fn token_space_exhausted<T: Into<String>>(msg: T) -> Self {
        FoodgramError::TokenSpaceExhausted(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        FoodgramError::Config(msg.into())
    }
}

/// 唯一约束冲突（最后一道防线）统一映射为重复状态错误
pub fn map_unique_violation(err: sea_orm::DbErr, msg: &str) -> FoodgramError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => FoodgramError::already_exists(msg),
        _ => FoodgramError::from(err),
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for FoodgramError {
    fn from(err: sea_orm::DbErr) -> Self {
        FoodgramError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for FoodgramError {
    fn from(err: std::io::Error) -> Self {
        FoodgramError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for FoodgramError {
    fn from(err: serde_json::Error) -> Self {
        FoodgramError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for FoodgramError {
    fn from(err: base64::DecodeError) -> Self {
        FoodgramError::Validation(format!("Invalid base64 image: {}", err))
    }
}

impl From<csv::Error> for FoodgramError {
    fn from(err: csv::Error) -> Self {
        FoodgramError::FileOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FoodgramError>;
