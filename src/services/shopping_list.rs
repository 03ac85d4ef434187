//! 购物清单：汇总购物车中所有菜谱的配料
//!
//! 按 (配料名, 单位) 分组求和，按名称、单位升序输出纯文本。

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::info;

use migration::entities::{
    IngredientEntity, RecipeIngredientEntity, ShoppingCartEntity, ingredient, recipe_ingredient,
    shopping_cart, user,
};

use super::views::display_name;
use crate::errors::{FoodgramError, Result};
use crate::storage::SeaOrmStorage;

/// 汇总后的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub unit: String,
    pub total: i64,
}

/// 可下载的清单文件
#[derive(Debug, Clone)]
pub struct ShoppingList {
    pub filename: String,
    pub content: String,
}

/// (name, unit, amount) 行 → 按 (name, unit) 求和，有序输出
pub fn aggregate<I>(rows: I) -> Vec<ShoppingListItem>
where
    I: IntoIterator<Item = (String, String, i64)>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for (name, unit, amount) in rows {
        let entry = totals.entry((name, unit)).or_insert(0);
        *entry = entry.saturating_add(amount);
    }
    totals
        .into_iter()
        .map(|((name, unit), total)| ShoppingListItem { name, unit, total })
        .collect()
}

pub fn render(display_name: &str, items: &[ShoppingListItem], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Shopping list for: {}\n\nDate: {}\n\n",
        display_name,
        today.format("%Y-%m-%d")
    );
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("- {} ({}) - {}", item.name, item.unit, item.total))
        .collect();
    out.push_str(&lines.join("\n"));
    let _ = write!(out, "\n\nFoodgram ({})", today.year());
    out
}

pub fn filename_for(user: &user::Model) -> String {
    format!("{}_shopping_list.txt", user.username)
}

pub struct ShoppingListService {
    storage: Arc<SeaOrmStorage>,
}

impl ShoppingListService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 汇总用户购物车；购物车为空时报错
    pub async fn collect(&self, user_id: i32) -> Result<Vec<ShoppingListItem>> {
        let db = self.storage.get_db();

        let recipe_ids: Vec<i32> = self
            .storage
            .read("shopping_cart.recipe_ids", || {
                ShoppingCartEntity::find()
                    .select_only()
                    .column(shopping_cart::Column::RecipeId)
                    .filter(shopping_cart::Column::UserId.eq(user_id))
                    .into_tuple::<i32>()
                    .all(db)
            })
            .await?;

        if recipe_ids.is_empty() {
            return Err(FoodgramError::empty_shopping_cart(
                "Shopping cart is empty, nothing to export.",
            ));
        }

        let rows = self
            .storage
            .read("shopping_cart.recipe_ingredients", || {
                RecipeIngredientEntity::find()
                    .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.clone()))
                    .all(db)
            })
            .await?;

        let mut ingredient_ids: Vec<i32> = rows.iter().map(|r| r.ingredient_id).collect();
        ingredient_ids.sort_unstable();
        ingredient_ids.dedup();

        let ingredients: HashMap<i32, ingredient::Model> = self
            .storage
            .read("shopping_cart.ingredients", || {
                IngredientEntity::find()
                    .filter(ingredient::Column::Id.is_in(ingredient_ids.clone()))
                    .all(db)
            })
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        Ok(aggregate(rows.into_iter().filter_map(|row| {
            ingredients.get(&row.ingredient_id).map(|i| {
                (
                    i.name.clone(),
                    i.measurement_unit.clone(),
                    i64::from(row.amount),
                )
            })
        })))
    }

    pub async fn build(&self, user: &user::Model) -> Result<ShoppingList> {
        self.build_for_date(user, Utc::now().date_naive()).await
    }

    pub async fn build_for_date(&self, user: &user::Model, today: NaiveDate) -> Result<ShoppingList> {
        let items = self.collect(user.id).await?;
        info!(
            "Exporting shopping list for user {} ({} items)",
            user.id,
            items.len()
        );
        Ok(ShoppingList {
            filename: filename_for(user),
            content: render(&display_name(user), &items, today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i64) -> (String, String, i64) {
        (name.to_string(), unit.to_string(), amount)
    }

    #[test]
    fn test_aggregate_sums_same_pair_across_recipes() {
        // Recipe1: flour 200 g; Recipe2: flour 100 g, salt 5 g
        let items = aggregate(vec![
            row("flour", "g", 200),
            row("flour", "g", 100),
            row("salt", "g", 5),
        ]);
        assert_eq!(
            items,
            vec![
                ShoppingListItem {
                    name: "flour".into(),
                    unit: "g".into(),
                    total: 300
                },
                ShoppingListItem {
                    name: "salt".into(),
                    unit: "g".into(),
                    total: 5
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_keeps_units_apart_and_orders() {
        let items = aggregate(vec![
            row("milk", "ml", 200),
            row("eggs", "pcs", 2),
            row("milk", "cup", 1),
            row("milk", "ml", 50),
        ]);
        let lines: Vec<_> = items
            .iter()
            .map(|i| format!("{} {} {}", i.name, i.unit, i.total))
            .collect();
        assert_eq!(lines, vec!["eggs pcs 2", "milk cup 1", "milk ml 250"]);
    }

    #[test]
    fn test_render_layout() {
        let items = aggregate(vec![row("flour", "g", 300), row("salt", "g", 5)]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let text = render("Ivan Petrov", &items, date);
        assert_eq!(
            text,
            "Shopping list for: Ivan Petrov\n\nDate: 2025-03-09\n\n\
             - flour (g) - 300\n- salt (g) - 5\n\nFoodgram (2025)"
        );
    }
}
