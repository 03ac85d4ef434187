//! JSON 读表示
//!
//! GET 与写操作返回同一套结构，由各 service 的 `build_*` 统一构造。

use serde::Serialize;

use migration::entities::{ingredient, tag, user};

use super::media::MediaStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<tag::Model> for TagView {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientView {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            measurement_unit: m.measurement_unit,
        }
    }
}

/// 菜谱中的一行配料
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserView {
    pub fn build(user: &user::Model, is_subscribed: bool, media: &MediaStore) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user.avatar.as_deref().map(|a| media.url(a)),
        }
    }
}

/// 注册接口的返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&user::Model> for RegisteredUser {
    fn from(u: &user::Model) -> Self {
        Self {
            email: u.email.clone(),
            id: u.id,
            username: u.username.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// 收藏、购物车、订阅列表里的简短表示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeShort {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShort {
    pub fn build(recipe: &migration::entities::recipe::Model, media: &MediaStore) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media.url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// 订阅的作者及其菜谱
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: u64,
}

/// 购物清单抬头用的显示名："名 姓"，为空时退回 username
pub fn display_name(user: &user::Model) -> String {
    let full = format!("{} {}", user.first_name.trim(), user.last_name.trim());
    let full = full.trim();
    if full.is_empty() {
        user.username.clone()
    } else {
        full.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(first: &str, last: &str) -> user::Model {
        user::Model {
            id: 3,
            email: "chef@example.com".into(),
            username: "chef".into(),
            first_name: first.into(),
            last_name: last.into(),
            password_hash: String::new(),
            role: "user".into(),
            is_superuser: false,
            avatar: Some("users/avatars/a.png".into()),
            date_joined: Utc::now(),
            token_version: 0,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&user("Ivan", "Petrov")), "Ivan Petrov");
        assert_eq!(display_name(&user("Ivan", "")), "Ivan");
        assert_eq!(display_name(&user(" ", "")), "chef");
    }

    #[test]
    fn test_user_view_avatar_url_and_flatten() {
        let media = MediaStore::new("/tmp", "http://h/media/");
        let view = SubscriptionView {
            author: UserView::build(&user("A", "B"), true, &media),
            recipes: vec![],
            recipes_count: 0,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["avatar"], "http://h/media/users/avatars/a.png");
        assert_eq!(json["is_subscribed"], true);
        assert_eq!(json["recipes_count"], 0);
        assert!(json.get("author").is_none());
    }
}
