//! 标签与食材目录（只读）

use std::sync::Arc;

use sea_orm::{EntityTrait, QueryOrder};

use migration::entities::{IngredientEntity, TagEntity, ingredient, tag};

use super::views::{IngredientView, TagView};
use crate::errors::{FoodgramError, Result};
use crate::storage::SeaOrmStorage;

pub struct CatalogService {
    storage: Arc<SeaOrmStorage>,
}

impl CatalogService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn tags(&self) -> Result<Vec<TagView>> {
        let db = self.storage.get_db();
        let rows = self
            .storage
            .read("tags.all", || {
                TagEntity::find().order_by_asc(tag::Column::Id).all(db)
            })
            .await?;
        Ok(rows.into_iter().map(TagView::from).collect())
    }

    pub async fn tag(&self, id: i32) -> Result<TagView> {
        let db = self.storage.get_db();
        self.storage
            .read("tags.by_id", || TagEntity::find_by_id(id).one(db))
            .await?
            .map(TagView::from)
            .ok_or_else(|| FoodgramError::not_found(format!("Tag {} not found", id)))
    }

    /// 按名称前缀过滤（不区分大小写）
    ///
    /// SQLite 的 `lower()` 只处理 ASCII，西里尔字母等名称在内存里过滤。
    pub async fn ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<IngredientView>> {
        let db = self.storage.get_db();
        let rows = self
            .storage
            .read("ingredients.all", || {
                IngredientEntity::find()
                    .order_by_asc(ingredient::Column::Name)
                    .order_by_asc(ingredient::Column::Id)
                    .all(db)
            })
            .await?;

        let prefix = name_prefix
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());
        Ok(rows
            .into_iter()
            .filter(|i| match &prefix {
                Some(p) => i.name.to_lowercase().starts_with(p.as_str()),
                None => true,
            })
            .map(IngredientView::from)
            .collect())
    }

    pub async fn ingredient(&self, id: i32) -> Result<IngredientView> {
        let db = self.storage.get_db();
        self.storage
            .read("ingredients.by_id", || IngredientEntity::find_by_id(id).one(db))
            .await?
            .map(IngredientView::from)
            .ok_or_else(|| FoodgramError::not_found(format!("Ingredient {} not found", id)))
    }
}
