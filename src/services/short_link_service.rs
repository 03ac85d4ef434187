//! 菜谱短链
//!
//! 每个菜谱最多一个 token；token 全局唯一。并发首次创建由存储层的
//! 唯一约束裁决：插入冲突后按菜谱回读，有则返回胜者，无则换 token 重试。

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, error, info};

use migration::entities::{RecipeEntity, ShortLinkEntity, short_link};

use crate::errors::{FoodgramError, Result};
use crate::storage::SeaOrmStorage;
use crate::utils::{generate_random_code, is_valid_token};

/// 单次 get_or_create 最多尝试的 token 数
pub const MAX_TOKEN_ATTEMPTS: usize = 10;

pub const TOKEN_LENGTH_RANGE: RangeInclusive<usize> = 3..=10;

pub type TokenGenerator = fn(usize) -> String;

pub struct ShortLinkService {
    storage: Arc<SeaOrmStorage>,
    token_length: usize,
    generate: TokenGenerator,
}

impl ShortLinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, token_length: usize) -> Result<Self> {
        Self::with_generator(storage, token_length, generate_random_code)
    }

    pub fn with_generator(
        storage: Arc<SeaOrmStorage>,
        token_length: usize,
        generate: TokenGenerator,
    ) -> Result<Self> {
        if !TOKEN_LENGTH_RANGE.contains(&token_length) {
            return Err(FoodgramError::config(format!(
                "short_link_length must be between {} and {}, got {}",
                TOKEN_LENGTH_RANGE.start(),
                TOKEN_LENGTH_RANGE.end(),
                token_length
            )));
        }
        Ok(Self {
            storage,
            token_length,
            generate,
        })
    }

    async fn find_by_recipe(&self, recipe_id: i32) -> Result<Option<short_link::Model>> {
        let db = self.storage.get_db();
        self.storage
            .read("short_links.by_recipe", || {
                ShortLinkEntity::find()
                    .filter(short_link::Column::RecipeId.eq(recipe_id))
                    .one(db)
            })
            .await
    }

    async fn token_taken(&self, token: &str) -> Result<bool> {
        let db = self.storage.get_db();
        let found = self
            .storage
            .read("short_links.by_token", || {
                ShortLinkEntity::find()
                    .filter(short_link::Column::Token.eq(token))
                    .one(db)
            })
            .await?;
        Ok(found.is_some())
    }

    /// 返回菜谱的短链 token，不存在则创建（幂等）
    pub async fn get_or_create(&self, recipe_id: i32) -> Result<String> {
        let db = self.storage.get_db();

        let recipe = self
            .storage
            .read("recipes.by_id", || RecipeEntity::find_by_id(recipe_id).one(db))
            .await?;
        if recipe.is_none() {
            return Err(FoodgramError::not_found(format!(
                "Recipe {} not found",
                recipe_id
            )));
        }

        if let Some(existing) = self.find_by_recipe(recipe_id).await? {
            return Ok(existing.token);
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = (self.generate)(self.token_length);
            if self.token_taken(&token).await? {
                debug!("Short link token collision (attempt {})", attempt);
                continue;
            }

            let row = short_link::ActiveModel {
                token: Set(token.clone()),
                recipe_id: Set(recipe_id),
                created_at: Set(Utc::now()),
                ..Default::default()
            };

            match row.insert(db).await {
                Ok(saved) => {
                    info!("Created short link '{}' for recipe {}", saved.token, recipe_id);
                    return Ok(saved.token);
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) =>
                {
                    // 并发创建：对方已为该菜谱写入
                    if let Some(winner) = self.find_by_recipe(recipe_id).await? {
                        debug!("Lost short link race for recipe {}", recipe_id);
                        return Ok(winner.token);
                    }
                    debug!("Short link token collision on insert (attempt {})", attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(
            "Short link token space exhausted after {} attempts (length {})",
            MAX_TOKEN_ATTEMPTS, self.token_length
        );
        Err(FoodgramError::token_space_exhausted(format!(
            "Could not allocate a unique short link token after {} attempts; increase site.short_link_length",
            MAX_TOKEN_ATTEMPTS
        )))
    }

    /// token → 菜谱 id
    pub async fn resolve(&self, token: &str) -> Result<i32> {
        if !is_valid_token(token) {
            return Err(FoodgramError::not_found("Short link not found"));
        }
        let db = self.storage.get_db();
        self.storage
            .read("short_links.resolve", || {
                ShortLinkEntity::find()
                    .filter(short_link::Column::Token.eq(token))
                    .one(db)
            })
            .await?
            .map(|link| link.recipe_id)
            .ok_or_else(|| FoodgramError::not_found("Short link not found"))
    }
}
