//! 用户、头像、密码与订阅

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set, sea_query::{Expr, ExprTrait},
};
use serde::Deserialize;
use tracing::{info, warn};

use migration::entities::{
    RecipeEntity, SubscriptionEntity, UserEntity, recipe, subscription, user,
};

use super::media::{MediaKind, MediaStore};
use super::pagination::{PageParams, Paged};
use super::permissions::{ROLE_ADMIN, ROLE_USER};
use super::views::{RecipeShort, RegisteredUser, SubscriptionView, UserView};
use crate::errors::{FoodgramError, Result, map_unique_violation};
use crate::storage::SeaOrmStorage;
use crate::utils::password::{hash_password, validate_new_password, verify_password};

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 150;

/// 与 `/users/me/` 路由冲突的保留用户名
const RESERVED_USERNAMES: &[&str] = &["me"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

fn required<'a>(field: &str, value: Option<&'a str>, max: usize) -> Result<&'a str> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(FoodgramError::validation(format!(
            "{}: This field is required.",
            field
        )));
    }
    if value.chars().count() > max {
        return Err(FoodgramError::validation(format!(
            "{}: Ensure this field has no more than {} characters.",
            field, max
        )));
    }
    Ok(value)
}

/// 只做结构检查：`local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}

/// 字母数字（含 Unicode）与 `.@+-_`
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
}

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
    media: Arc<MediaStore>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>, media: Arc<MediaStore>) -> Self {
        Self { storage, media }
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>> {
        let db = self.storage.get_db();
        self.storage
            .read("users.by_id", || UserEntity::find_by_id(id).one(db))
            .await
    }

    async fn require(&self, id: i32) -> Result<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| FoodgramError::not_found(format!("User {} not found", id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let db = self.storage.get_db();
        self.storage
            .read("users.by_email", || {
                UserEntity::find()
                    .filter(user::Column::Email.eq(email))
                    .one(db)
            })
            .await
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let db = self.storage.get_db();
        let found = self
            .storage
            .read("users.by_username", || {
                UserEntity::find()
                    .filter(user::Column::Username.eq(username))
                    .one(db)
            })
            .await?;
        Ok(found.is_some())
    }

    pub async fn register(&self, input: RegistrationInput) -> Result<RegisteredUser> {
        self.create_user(input, ROLE_USER, false)
            .await
            .map(|u| RegisteredUser::from(&u))
    }

    /// 管理员账号（CLI 使用）
    pub async fn create_admin(&self, input: RegistrationInput) -> Result<user::Model> {
        self.create_user(input, ROLE_ADMIN, true).await
    }

    async fn create_user(
        &self,
        input: RegistrationInput,
        role: &str,
        is_superuser: bool,
    ) -> Result<user::Model> {
        let email = required("email", input.email.as_deref(), MAX_EMAIL_LENGTH)?;
        if !is_valid_email(email) {
            return Err(FoodgramError::validation("email: Enter a valid email address."));
        }
        let username = required("username", input.username.as_deref(), MAX_NAME_LENGTH)?;
        if !is_valid_username(username) {
            return Err(FoodgramError::validation(
                "username: Enter a valid username. Letters, digits and @/./+/-/_ only.",
            ));
        }
        if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
            return Err(FoodgramError::validation(format!(
                "username: '{}' is reserved.",
                username
            )));
        }
        let first_name = required("first_name", input.first_name.as_deref(), MAX_NAME_LENGTH)?;
        let last_name = required("last_name", input.last_name.as_deref(), MAX_NAME_LENGTH)?;
        let password = input.password.as_deref().unwrap_or_default();
        validate_new_password(password)?;

        if self.find_by_email(email).await?.is_some() {
            return Err(FoodgramError::already_exists(
                "email: A user with that email already exists.",
            ));
        }
        if self.username_taken(username).await? {
            return Err(FoodgramError::already_exists(
                "username: A user with that username already exists.",
            ));
        }

        let saved = user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            password_hash: Set(hash_password(password)?),
            role: Set(role.to_string()),
            is_superuser: Set(is_superuser),
            avatar: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await
        .map_err(|e| map_unique_violation(e, "A user with that email or username already exists."))?;

        info!("Registered user {} ({}) with role {}", saved.id, saved.email, role);
        Ok(saved)
    }

    /// email + 密码 → 用户；失败统一返回同一条消息
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<user::Model> {
        let invalid = || FoodgramError::validation("Unable to log in with provided credentials.");
        let user = self.find_by_email(email.trim()).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login attempt for user {}", user.id);
            return Err(invalid());
        }
        Ok(user)
    }

    async fn subscribed_authors(&self, viewer: i32, authors: Vec<i32>) -> Result<HashSet<i32>> {
        let db = self.storage.get_db();
        let ids = self
            .storage
            .read("subscriptions.for_viewer", || {
                SubscriptionEntity::find()
                    .select_only()
                    .column(subscription::Column::AuthorId)
                    .filter(subscription::Column::UserId.eq(viewer))
                    .filter(subscription::Column::AuthorId.is_in(authors.clone()))
                    .into_tuple::<i32>()
                    .all(db)
            })
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn user_views(&self, viewer: Option<i32>, users: &[user::Model]) -> Result<Vec<UserView>> {
        let subscribed = match viewer {
            Some(viewer) => {
                self.subscribed_authors(viewer, users.iter().map(|u| u.id).collect())
                    .await?
            }
            None => HashSet::new(),
        };
        Ok(users
            .iter()
            .map(|u| UserView::build(u, subscribed.contains(&u.id), &self.media))
            .collect())
    }

    pub async fn list(&self, viewer: Option<i32>, params: PageParams) -> Result<Paged<UserView>> {
        let db = self.storage.get_db();
        let query = UserEntity::find().order_by_asc(user::Column::Id);
        let total = self
            .storage
            .read("users.count", || query.clone().count(db))
            .await?;
        let rows = self
            .storage
            .read("users.page", || {
                query
                    .clone()
                    .offset(params.offset())
                    .limit(params.limit)
                    .all(db)
            })
            .await?;
        let items = self.user_views(viewer, &rows).await?;
        Paged {
            items,
            total,
            params,
        }
        .check_in_range()
    }

    pub async fn get(&self, viewer: Option<i32>, id: i32) -> Result<UserView> {
        let user = self.require(id).await?;
        self.view_of(viewer, &user).await
    }

    pub async fn view_of(&self, viewer: Option<i32>, user: &user::Model) -> Result<UserView> {
        let mut views = self.user_views(viewer, std::slice::from_ref(user)).await?;
        views
            .pop()
            .ok_or_else(|| FoodgramError::not_found(format!("User {} not found", user.id)))
    }

    /// 设置头像，返回新头像 URL
    pub async fn set_avatar(&self, user: &user::Model, data_url: Option<&str>) -> Result<String> {
        let data_url = data_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FoodgramError::validation("avatar: This field is required."))?;
        let relative = self.media.save_base64(MediaKind::Avatar, data_url).await?;

        let mut active: user::ActiveModel = user.clone().into();
        active.avatar = Set(Some(relative.clone()));
        if let Err(e) = active.update(self.storage.get_db()).await {
            self.media.remove(&relative).await;
            return Err(e.into());
        }

        if let Some(old) = user.avatar.as_deref() {
            self.media.remove(old).await;
        }
        info!("User {} updated avatar", user.id);
        Ok(self.media.url(&relative))
    }

    pub async fn delete_avatar(&self, user: &user::Model) -> Result<()> {
        let Some(old) = user.avatar.as_deref() else {
            return Ok(());
        };
        let mut active: user::ActiveModel = user.clone().into();
        active.avatar = Set(None);
        active.update(self.storage.get_db()).await?;
        self.media.remove(old).await;
        info!("User {} removed avatar", user.id);
        Ok(())
    }

    pub async fn set_password(
        &self,
        user: &user::Model,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if !verify_password(current_password, &user.password_hash)? {
            return Err(FoodgramError::validation(
                "current_password: Invalid password.",
            ));
        }
        validate_new_password(new_password)?;

        UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(hash_password(new_password)?))
            .col_expr(
                user::Column::TokenVersion,
                Expr::col(user::Column::TokenVersion).add(1),
            )
            .filter(user::Column::Id.eq(user.id))
            .exec(self.storage.get_db())
            .await?;
        info!("User {} changed password, existing tokens revoked", user.id);
        Ok(())
    }

    /// 作废该用户已签发的全部 token
    pub async fn revoke_tokens(&self, user_id: i32) -> Result<()> {
        let result = UserEntity::update_many()
            .col_expr(
                user::Column::TokenVersion,
                Expr::col(user::Column::TokenVersion).add(1),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.storage.get_db())
            .await?;
        if result.rows_affected == 0 {
            return Err(FoodgramError::not_found(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    pub async fn subscribe(
        &self,
        user: &user::Model,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<SubscriptionView> {
        let author = self.require(author_id).await?;
        if author.id == user.id {
            return Err(FoodgramError::validation("You cannot subscribe to yourself!"));
        }
        if self
            .subscribed_authors(user.id, vec![author.id])
            .await?
            .contains(&author.id)
        {
            return Err(FoodgramError::already_exists(
                "You are already subscribed to this user!",
            ));
        }

        subscription::ActiveModel {
            user_id: Set(user.id),
            author_id: Set(author.id),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await
        .map_err(|e| map_unique_violation(e, "You are already subscribed to this user!"))?;

        info!("User {} subscribed to {}", user.id, author.id);
        let mut views = self.subscription_views(&[author], recipes_limit).await?;
        views
            .pop()
            .ok_or_else(|| FoodgramError::not_found(format!("User {} not found", author_id)))
    }

    pub async fn unsubscribe(&self, user: &user::Model, author_id: i32) -> Result<()> {
        self.require(author_id).await?;
        let result = SubscriptionEntity::delete_many()
            .filter(subscription::Column::UserId.eq(user.id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .exec(self.storage.get_db())
            .await?;
        if result.rows_affected == 0 {
            return Err(FoodgramError::not_found("Subscription not found"));
        }
        info!("User {} unsubscribed from {}", user.id, author_id);
        Ok(())
    }

    /// 当前用户订阅的作者，按作者 id 升序
    pub async fn subscriptions(
        &self,
        user: &user::Model,
        params: PageParams,
        recipes_limit: Option<u64>,
    ) -> Result<Paged<SubscriptionView>> {
        let db = self.storage.get_db();
        let author_ids = SubscriptionEntity::find()
            .select_only()
            .column(subscription::Column::AuthorId)
            .filter(subscription::Column::UserId.eq(user.id))
            .into_query();
        let query = UserEntity::find()
            .filter(user::Column::Id.in_subquery(author_ids))
            .order_by_asc(user::Column::Id);

        let total = self
            .storage
            .read("subscriptions.count", || query.clone().count(db))
            .await?;
        let authors = self
            .storage
            .read("subscriptions.page", || {
                query
                    .clone()
                    .offset(params.offset())
                    .limit(params.limit)
                    .all(db)
            })
            .await?;

        let items = self.subscription_views(&authors, recipes_limit).await?;
        Paged {
            items,
            total,
            params,
        }
        .check_in_range()
    }

    /// 作者列表 → 订阅表示；这些作者都已被当前用户订阅
    async fn subscription_views(
        &self,
        authors: &[user::Model],
        recipes_limit: Option<u64>,
    ) -> Result<Vec<SubscriptionView>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let db = self.storage.get_db();
        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();

        let recipes = self
            .storage
            .read("subscriptions.recipes", || {
                RecipeEntity::find()
                    .filter(recipe::Column::AuthorId.is_in(ids.clone()))
                    .order_by_desc(recipe::Column::CreatedAt)
                    .order_by_desc(recipe::Column::Id)
                    .all(db)
            })
            .await?;

        let mut by_author: HashMap<i32, Vec<recipe::Model>> = HashMap::new();
        for r in recipes {
            by_author.entry(r.author_id).or_default().push(r);
        }

        Ok(authors
            .iter()
            .map(|author| {
                let own = by_author.remove(&author.id).unwrap_or_default();
                let recipes_count = own.len() as u64;
                let shown = match recipes_limit {
                    Some(limit) => own.iter().take(limit as usize).collect::<Vec<_>>(),
                    None => own.iter().collect(),
                };
                SubscriptionView {
                    author: UserView::build(author, true, &self.media),
                    recipes: shown
                        .into_iter()
                        .map(|r| RecipeShort::build(r, &self.media))
                        .collect(),
                    recipes_count,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("chef@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("chef.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("chef@example"));
        assert!(!is_valid_email("chef@exa mple.com"));
        assert!(!is_valid_email("chef@@example.com"));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("chef_42"));
        assert!(is_valid_username("Иван.Петров"));
        assert!(!is_valid_username("chef 42"));
        assert!(!is_valid_username("chef/42"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn test_required_trims_and_limits() {
        assert_eq!(required("first_name", Some("  Ivan "), 150).unwrap(), "Ivan");
        assert!(required("first_name", Some("   "), 150).is_err());
        assert!(required("first_name", None, 150).is_err());
        assert!(required("first_name", Some(&"x".repeat(151)), 150).is_err());
    }
}
