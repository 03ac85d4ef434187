//! SeaORM storage backend
//!
//! SQLite, MySQL/MariaDB and PostgreSQL through one `DatabaseConnection`.

mod connection;
pub mod retry;

use std::future::Future;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::info;

use crate::errors::{FoodgramError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use retry::RetryConfig;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(FoodgramError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite:, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage handle shared by all services
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库并执行迁移
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(FoodgramError::database_config("database_url is not set"));
        }

        let config = crate::config::get_config();
        let retry_config = RetryConfig::from_config(&config.database);

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config.database.pool_size).await?
        } else {
            connect_generic(
                database_url,
                backend_name,
                config.database.pool_size,
                config.database.timeout,
            )
            .await?
        };

        run_migrations(&db).await?;

        info!("{} storage initialized", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        })
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 读操作统一入口：瞬时错误自动重试
    pub async fn read<T, F, Fut>(&self, label: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, DbErr>>,
    {
        retry::with_retry(label, self.retry_config, op)
            .await
            .map_err(FoodgramError::from)
    }

    /// 就绪检查用的轻量 ping
    pub async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(FoodgramError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(
            infer_backend_from_url("sqlite://foodgram.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(infer_backend_from_url("data/foodgram.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("postgres://u:p@localhost/foodgram").unwrap(),
            "postgres"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://localhost/foodgram").unwrap(),
            "mysql"
        );
        assert!(matches!(
            infer_backend_from_url("redis://localhost"),
            Err(FoodgramError::DatabaseConfig(_))
        ));
    }
}
