//! 收藏与购物车
//!
//! 两者都是 (user, recipe) 标记行，行为一致，只是落在不同的表。

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use migration::entities::{FavoriteEntity, RecipeEntity, ShoppingCartEntity, favorite, shopping_cart};

use super::media::MediaStore;
use super::views::RecipeShort;
use crate::errors::{FoodgramError, Result, map_unique_violation};
use crate::storage::SeaOrmStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    pub fn label(&self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "favorites",
            RecipeCollection::ShoppingCart => "shopping cart",
        }
    }
}

pub struct CollectionService {
    storage: Arc<SeaOrmStorage>,
    media: Arc<MediaStore>,
}

impl CollectionService {
    pub fn new(storage: Arc<SeaOrmStorage>, media: Arc<MediaStore>) -> Self {
        Self { storage, media }
    }

    async fn contains(&self, kind: RecipeCollection, user_id: i32, recipe_id: i32) -> Result<bool> {
        let db = self.storage.get_db();
        let found = match kind {
            RecipeCollection::Favorites => self
                .storage
                .read("favorites.exists", || {
                    FavoriteEntity::find()
                        .filter(favorite::Column::UserId.eq(user_id))
                        .filter(favorite::Column::RecipeId.eq(recipe_id))
                        .one(db)
                })
                .await?
                .is_some(),
            RecipeCollection::ShoppingCart => self
                .storage
                .read("shopping_cart.exists", || {
                    ShoppingCartEntity::find()
                        .filter(shopping_cart::Column::UserId.eq(user_id))
                        .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
                        .one(db)
                })
                .await?
                .is_some(),
        };
        Ok(found)
    }

    /// 加入集合，返回菜谱简短表示；重复加入 → 400
    pub async fn add(
        &self,
        kind: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<RecipeShort> {
        let db = self.storage.get_db();
        let recipe = self
            .storage
            .read("recipes.by_id", || RecipeEntity::find_by_id(recipe_id).one(db))
            .await?
            .ok_or_else(|| FoodgramError::not_found(format!("Recipe {} not found", recipe_id)))?;

        if self.contains(kind, user_id, recipe_id).await? {
            return Err(FoodgramError::already_exists("Recipe already added!"));
        }

        // 并发的重复插入由唯一索引兜底
        let inserted = match kind {
            RecipeCollection::Favorites => favorite::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .map(|_| ()),
            RecipeCollection::ShoppingCart => shopping_cart::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .map(|_| ()),
        };
        inserted.map_err(|e| map_unique_violation(e, "Recipe already added!"))?;

        info!("User {} added recipe {} to {}", user_id, recipe_id, kind.label());
        Ok(RecipeShort::build(&recipe, &self.media))
    }

    /// 移出集合；不在集合中 → 400
    pub async fn remove(&self, kind: RecipeCollection, user_id: i32, recipe_id: i32) -> Result<()> {
        let db = self.storage.get_db();
        let exists = self
            .storage
            .read("recipes.by_id", || RecipeEntity::find_by_id(recipe_id).one(db))
            .await?
            .is_some();
        if !exists {
            return Err(FoodgramError::not_found(format!("Recipe {} not found", recipe_id)));
        }

        let affected = match kind {
            RecipeCollection::Favorites => {
                FavoriteEntity::delete_many()
                    .filter(favorite::Column::UserId.eq(user_id))
                    .filter(favorite::Column::RecipeId.eq(recipe_id))
                    .exec(db)
                    .await?
                    .rows_affected
            }
            RecipeCollection::ShoppingCart => {
                ShoppingCartEntity::delete_many()
                    .filter(shopping_cart::Column::UserId.eq(user_id))
                    .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
                    .exec(db)
                    .await?
                    .rows_affected
            }
        };

        if affected == 0 {
            return Err(FoodgramError::validation(format!(
                "Recipe is not in your {}.",
                kind.label()
            )));
        }
        info!("User {} removed recipe {} from {}", user_id, recipe_id, kind.label());
        Ok(())
    }
}
