//! User entity. `email` is the login key.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    /// "user" | "admin"
    pub role: String,
    pub is_superuser: bool,
    /// 相对 media 根目录的路径
    pub avatar: Option<String>,
    pub date_joined: DateTimeUtc,
    /// 登出或改密时自增，旧 token 随之失效
    pub token_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
