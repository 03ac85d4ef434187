//! Recipe service
//!
//! 列表/详情与写路径。创建、更新、删除各在一个事务内完成；
//! 更新时标签和配料整体删除后重建。所有返回都经过 `build_views`。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::info;

use migration::entities::{
    FavoriteEntity, IngredientEntity, RecipeEntity, RecipeIngredientEntity, RecipeTagEntity,
    ShoppingCartEntity, ShortLinkEntity, SubscriptionEntity, TagEntity, UserEntity, favorite,
    ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, short_link, subscription,
    tag, user,
};

use super::media::{MediaKind, MediaStore};
use super::pagination::{PageParams, Paged};
use super::permissions::Permissions;
use super::recipe_validation::{RecipeInput, ValidatedRecipe, WriteMode, validate_recipe};
use super::views::{RecipeIngredientView, RecipeView, TagView, UserView};
use crate::errors::{FoodgramError, Result};
use crate::storage::SeaOrmStorage;

/// 列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    /// 标签 slug，任一匹配即可
    pub tags: Vec<String>,
    /// 仅对已登录用户生效
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

pub struct RecipeService {
    storage: Arc<SeaOrmStorage>,
    media: Arc<MediaStore>,
}

impl RecipeService {
    pub fn new(storage: Arc<SeaOrmStorage>, media: Arc<MediaStore>) -> Self {
        Self { storage, media }
    }

    async fn find(&self, id: i32) -> Result<recipe::Model> {
        let db = self.storage.get_db();
        self.storage
            .read("recipes.by_id", || RecipeEntity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| FoodgramError::not_found(format!("Recipe {} not found", id)))
    }

    pub async fn list(
        &self,
        viewer: Option<i32>,
        filter: &RecipeFilter,
        params: PageParams,
    ) -> Result<Paged<RecipeView>> {
        let db = self.storage.get_db();
        let mut query = RecipeEntity::find();

        if let Some(author) = filter.author {
            query = query.filter(recipe::Column::AuthorId.eq(author));
        }
        if !filter.tags.is_empty() {
            let tag_ids = TagEntity::find()
                .select_only()
                .column(tag::Column::Id)
                .filter(tag::Column::Slug.is_in(filter.tags.clone()))
                .into_query();
            let recipe_ids = RecipeTagEntity::find()
                .select_only()
                .column(recipe_tag::Column::RecipeId)
                .filter(recipe_tag::Column::TagId.in_subquery(tag_ids))
                .into_query();
            query = query.filter(recipe::Column::Id.in_subquery(recipe_ids));
        }
        if let Some(viewer) = viewer {
            if filter.is_favorited {
                let ids = FavoriteEntity::find()
                    .select_only()
                    .column(favorite::Column::RecipeId)
                    .filter(favorite::Column::UserId.eq(viewer))
                    .into_query();
                query = query.filter(recipe::Column::Id.in_subquery(ids));
            }
            if filter.is_in_shopping_cart {
                let ids = ShoppingCartEntity::find()
                    .select_only()
                    .column(shopping_cart::Column::RecipeId)
                    .filter(shopping_cart::Column::UserId.eq(viewer))
                    .into_query();
                query = query.filter(recipe::Column::Id.in_subquery(ids));
            }
        }

        let query = query
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id);

        let total = self
            .storage
            .read("recipes.count", || query.clone().count(db))
            .await?;
        let rows = self
            .storage
            .read("recipes.page", || {
                query
                    .clone()
                    .offset(params.offset())
                    .limit(params.limit)
                    .all(db)
            })
            .await?;

        let items = self.build_views(viewer, rows).await?;
        Paged {
            items,
            total,
            params,
        }
        .check_in_range()
    }

    pub async fn get(&self, viewer: Option<i32>, id: i32) -> Result<RecipeView> {
        let recipe = self.find(id).await?;
        self.build_view(viewer, recipe).await
    }

    async fn build_view(&self, viewer: Option<i32>, recipe: recipe::Model) -> Result<RecipeView> {
        let id = recipe.id;
        self.build_views(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| FoodgramError::not_found(format!("Recipe {} not found", id)))
    }

    /// 批量构造完整读表示（GET 与写操作共用）
    pub async fn build_views(
        &self,
        viewer: Option<i32>,
        recipes: Vec<recipe::Model>,
    ) -> Result<Vec<RecipeView>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let db = self.storage.get_db();
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let author_ids: Vec<i32> = recipes
            .iter()
            .map(|r| r.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors: HashMap<i32, user::Model> = self
            .storage
            .read("recipes.authors", || {
                UserEntity::find()
                    .filter(user::Column::Id.is_in(author_ids.clone()))
                    .all(db)
            })
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let tag_links = self
            .storage
            .read("recipes.tag_links", || {
                RecipeTagEntity::find()
                    .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.clone()))
                    .order_by_asc(recipe_tag::Column::TagId)
                    .all(db)
            })
            .await?;
        let tag_ids: Vec<i32> = tag_links.iter().map(|l| l.tag_id).collect();
        let tags: HashMap<i32, tag::Model> = self
            .storage
            .read("recipes.tags", || {
                TagEntity::find()
                    .filter(tag::Column::Id.is_in(tag_ids.clone()))
                    .all(db)
            })
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let amounts = self
            .storage
            .read("recipes.ingredient_rows", || {
                RecipeIngredientEntity::find()
                    .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.clone()))
                    .order_by_asc(recipe_ingredient::Column::Id)
                    .all(db)
            })
            .await?;
        let ingredient_ids: Vec<i32> = amounts.iter().map(|a| a.ingredient_id).collect();
        let ingredients: HashMap<i32, ingredient::Model> = self
            .storage
            .read("recipes.ingredients", || {
                IngredientEntity::find()
                    .filter(ingredient::Column::Id.is_in(ingredient_ids.clone()))
                    .all(db)
            })
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let (favorited, in_cart, subscribed) = match viewer {
            Some(viewer) => {
                let favorited: HashSet<i32> = self
                    .storage
                    .read("recipes.viewer_favorites", || {
                        FavoriteEntity::find()
                            .select_only()
                            .column(favorite::Column::RecipeId)
                            .filter(favorite::Column::UserId.eq(viewer))
                            .filter(favorite::Column::RecipeId.is_in(recipe_ids.clone()))
                            .into_tuple::<i32>()
                            .all(db)
                    })
                    .await?
                    .into_iter()
                    .collect();
                let in_cart: HashSet<i32> = self
                    .storage
                    .read("recipes.viewer_cart", || {
                        ShoppingCartEntity::find()
                            .select_only()
                            .column(shopping_cart::Column::RecipeId)
                            .filter(shopping_cart::Column::UserId.eq(viewer))
                            .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.clone()))
                            .into_tuple::<i32>()
                            .all(db)
                    })
                    .await?
                    .into_iter()
                    .collect();
                let subscribed: HashSet<i32> = self
                    .storage
                    .read("recipes.viewer_subscriptions", || {
                        SubscriptionEntity::find()
                            .select_only()
                            .column(subscription::Column::AuthorId)
                            .filter(subscription::Column::UserId.eq(viewer))
                            .filter(subscription::Column::AuthorId.is_in(author_ids.clone()))
                            .into_tuple::<i32>()
                            .all(db)
                    })
                    .await?
                    .into_iter()
                    .collect();
                (favorited, in_cart, subscribed)
            }
            None => Default::default(),
        };

        let mut tags_by_recipe: HashMap<i32, Vec<TagView>> = HashMap::new();
        for link in tag_links {
            if let Some(t) = tags.get(&link.tag_id) {
                tags_by_recipe
                    .entry(link.recipe_id)
                    .or_default()
                    .push(TagView::from(t.clone()));
            }
        }

        let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientView>> = HashMap::new();
        for row in amounts {
            if let Some(i) = ingredients.get(&row.ingredient_id) {
                ingredients_by_recipe
                    .entry(row.recipe_id)
                    .or_default()
                    .push(RecipeIngredientView {
                        id: i.id,
                        name: i.name.clone(),
                        measurement_unit: i.measurement_unit.clone(),
                        amount: row.amount,
                    });
            }
        }

        recipes
            .into_iter()
            .map(|r| {
                let author = authors.get(&r.author_id).ok_or_else(|| {
                    FoodgramError::database_operation(format!(
                        "Author {} of recipe {} is missing",
                        r.author_id, r.id
                    ))
                })?;
                Ok(RecipeView {
                    id: r.id,
                    tags: tags_by_recipe.remove(&r.id).unwrap_or_default(),
                    author: UserView::build(
                        author,
                        subscribed.contains(&r.author_id),
                        &self.media,
                    ),
                    ingredients: ingredients_by_recipe.remove(&r.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&r.id),
                    is_in_shopping_cart: in_cart.contains(&r.id),
                    name: r.name,
                    image: self.media.url(&r.image),
                    text: r.text,
                    cooking_time: r.cooking_time,
                })
            })
            .collect()
    }

    /// 查询请求中引用到的、实际存在的标签和配料 id
    async fn known_ids(&self, input: &RecipeInput) -> Result<(HashSet<i32>, HashSet<i32>)> {
        let db = self.storage.get_db();
        let wanted_tags = input.tags.clone().unwrap_or_default();
        let wanted_ingredients: Vec<i32> = input
            .ingredients
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|i| i.id)
            .collect();

        let tags = self
            .storage
            .read("recipes.known_tags", || {
                TagEntity::find()
                    .select_only()
                    .column(tag::Column::Id)
                    .filter(tag::Column::Id.is_in(wanted_tags.clone()))
                    .into_tuple::<i32>()
                    .all(db)
            })
            .await?;
        let ingredients = self
            .storage
            .read("recipes.known_ingredients", || {
                IngredientEntity::find()
                    .select_only()
                    .column(ingredient::Column::Id)
                    .filter(ingredient::Column::Id.is_in(wanted_ingredients.clone()))
                    .into_tuple::<i32>()
                    .all(db)
            })
            .await?;

        Ok((tags.into_iter().collect(), ingredients.into_iter().collect()))
    }

    async fn validate(&self, input: &RecipeInput, mode: WriteMode) -> Result<ValidatedRecipe> {
        let (known_tags, known_ingredients) = self.known_ids(input).await?;
        validate_recipe(input, mode, &known_tags, &known_ingredients)
    }

    pub async fn create(&self, author: &user::Model, input: RecipeInput) -> Result<RecipeView> {
        let valid = self.validate(&input, WriteMode::Create).await?;
        let image_data = valid
            .image
            .as_deref()
            .ok_or_else(|| FoodgramError::validation("image: This field is required."))?;
        let image = self
            .media
            .save_base64(MediaKind::RecipeImage, image_data)
            .await?;

        let saved = match self.insert_recipe(author.id, &valid, &image).await {
            Ok(saved) => saved,
            Err(e) => {
                self.media.remove(&image).await;
                return Err(e);
            }
        };

        info!("User {} created recipe {}", author.id, saved.id);
        self.build_view(Some(author.id), saved).await
    }

    async fn insert_recipe(
        &self,
        author_id: i32,
        valid: &ValidatedRecipe,
        image: &str,
    ) -> Result<recipe::Model> {
        let txn = self.storage.get_db().begin().await?;
        let now = Utc::now();

        let saved = recipe::ActiveModel {
            author_id: Set(author_id),
            name: Set(valid.name.clone()),
            image: Set(image.to_string()),
            text: Set(valid.text.clone()),
            cooking_time: Set(valid.cooking_time),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        write_links(&txn, saved.id, valid).await?;
        txn.commit().await?;
        Ok(saved)
    }

    pub async fn update(
        &self,
        actor: &Permissions,
        id: i32,
        input: RecipeInput,
    ) -> Result<RecipeView> {
        let existing = self.find(id).await?;
        if !actor.can_modify(existing.author_id) {
            return Err(FoodgramError::forbidden(
                "You do not have permission to edit this recipe.",
            ));
        }

        let valid = self.validate(&input, WriteMode::Update).await?;
        let new_image = match valid.image.as_deref() {
            Some(data) => Some(self.media.save_base64(MediaKind::RecipeImage, data).await?),
            None => None,
        };

        let updated = match self
            .replace_recipe(&existing, &valid, new_image.as_deref())
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(image) = new_image.as_deref() {
                    self.media.remove(image).await;
                }
                return Err(e);
            }
        };

        if new_image.is_some() {
            self.media.remove(&existing.image).await;
        }

        info!("User {} updated recipe {}", actor.user_id, id);
        self.build_view(Some(actor.user_id), updated).await
    }

    async fn replace_recipe(
        &self,
        existing: &recipe::Model,
        valid: &ValidatedRecipe,
        new_image: Option<&str>,
    ) -> Result<recipe::Model> {
        let txn = self.storage.get_db().begin().await?;

        let mut active: recipe::ActiveModel = existing.clone().into();
        active.name = Set(valid.name.clone());
        active.text = Set(valid.text.clone());
        active.cooking_time = Set(valid.cooking_time);
        active.updated_at = Set(Utc::now());
        if let Some(image) = new_image {
            active.image = Set(image.to_string());
        }
        let updated = active.update(&txn).await?;

        RecipeTagEntity::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(existing.id))
            .exec(&txn)
            .await?;
        RecipeIngredientEntity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(existing.id))
            .exec(&txn)
            .await?;
        write_links(&txn, existing.id, valid).await?;

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Permissions, id: i32) -> Result<()> {
        let existing = self.find(id).await?;
        if !actor.can_modify(existing.author_id) {
            return Err(FoodgramError::forbidden(
                "You do not have permission to delete this recipe.",
            ));
        }

        let txn = self.storage.get_db().begin().await?;
        delete_recipe_rows(&txn, id).await?;
        txn.commit().await?;

        self.media.remove(&existing.image).await;
        info!("User {} deleted recipe {}", actor.user_id, id);
        Ok(())
    }
}

/// 写入标签关联与配料行
async fn write_links(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    valid: &ValidatedRecipe,
) -> Result<()> {
    RecipeTagEntity::insert_many(valid.tag_ids.iter().map(|tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(*tag_id),
        ..Default::default()
    }))
    .exec(txn)
    .await?;

    RecipeIngredientEntity::insert_many(valid.ingredients.iter().map(|(ingredient_id, amount)| {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(*ingredient_id),
            amount: Set(*amount),
            ..Default::default()
        }
    }))
    .exec(txn)
    .await?;

    Ok(())
}

/// 删除菜谱及其所有从属行
async fn delete_recipe_rows<C: ConnectionTrait>(conn: &C, recipe_id: i32) -> Result<()> {
    ShortLinkEntity::delete_many()
        .filter(short_link::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    FavoriteEntity::delete_many()
        .filter(favorite::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    ShoppingCartEntity::delete_many()
        .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    RecipeIngredientEntity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    RecipeTagEntity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;
    RecipeEntity::delete_by_id(recipe_id).exec(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_default_is_unfiltered() {
        let f = RecipeFilter::default();
        assert!(f.author.is_none());
        assert!(f.tags.is_empty());
        assert!(!f.is_favorited && !f.is_in_shopping_cart);
    }
}
