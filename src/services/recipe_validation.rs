//! 菜谱写入校验
//!
//! 纯函数：标签/配料是否存在由调用方查好后传入。
//! 任何一条不满足都整体拒绝，不做部分写入。

use std::collections::HashSet;

use serde::Deserialize;

use crate::errors::{FoodgramError, Result};

pub const MAX_RECIPE_NAME_LENGTH: usize = 256;

/// 请求体中的一行配料
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i32,
    pub amount: i64,
}

/// 菜谱写入请求；缺失字段在校验阶段报错
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// 通过校验的菜谱
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    /// base64 data URL；更新时可省略
    pub image: Option<String>,
    pub tag_ids: Vec<i32>,
    /// (ingredient_id, amount)，保持请求顺序
    pub ingredients: Vec<(i32, i32)>,
}

fn invalid(field: &str, msg: impl std::fmt::Display) -> FoodgramError {
    FoodgramError::validation(format!("{}: {}", field, msg))
}

/// 返回第一个重复的 id
fn first_duplicate(ids: impl IntoIterator<Item = i32>) -> Option<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

pub fn validate_recipe(
    input: &RecipeInput,
    mode: WriteMode,
    known_tags: &HashSet<i32>,
    known_ingredients: &HashSet<i32>,
) -> Result<ValidatedRecipe> {
    let ingredients = match input.ingredients.as_deref() {
        Some(list) if !list.is_empty() => list,
        _ => return Err(invalid("ingredients", "At least one ingredient is required.")),
    };
    if let Some(missing) = ingredients.iter().find(|i| !known_ingredients.contains(&i.id)) {
        return Err(invalid(
            "ingredients",
            format!("Ingredient with id {} does not exist.", missing.id),
        ));
    }
    if let Some(dup) = first_duplicate(ingredients.iter().map(|i| i.id)) {
        return Err(invalid("ingredients", format!("Duplicate ingredient id {}.", dup)));
    }

    let tags = match input.tags.as_deref() {
        Some(list) if !list.is_empty() => list,
        _ => return Err(invalid("tags", "At least one tag is required.")),
    };
    if let Some(missing) = tags.iter().find(|id| !known_tags.contains(id)) {
        return Err(invalid("tags", format!("Tag with id {} does not exist.", missing)));
    }
    if let Some(dup) = first_duplicate(tags.iter().copied()) {
        return Err(invalid("tags", format!("Duplicate tag id {}.", dup)));
    }

    let cooking_time = match input.cooking_time {
        Some(t) if t >= 1 => i32::try_from(t)
            .map_err(|_| invalid("cooking_time", "Cooking time is too large."))?,
        Some(_) => return Err(invalid("cooking_time", "Cooking time must be at least 1.")),
        None => return Err(invalid("cooking_time", "This field is required.")),
    };

    let mut amounts = Vec::with_capacity(ingredients.len());
    for item in ingredients {
        if item.amount < 1 {
            return Err(invalid(
                "ingredients",
                format!("Amount for ingredient {} must be at least 1.", item.id),
            ));
        }
        let amount = i32::try_from(item.amount).map_err(|_| {
            invalid(
                "ingredients",
                format!("Amount for ingredient {} is too large.", item.id),
            )
        })?;
        amounts.push((item.id, amount));
    }

    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(invalid("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_RECIPE_NAME_LENGTH {
        return Err(invalid(
            "name",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_RECIPE_NAME_LENGTH
            ),
        ));
    }

    let text = input.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(invalid("text", "This field may not be blank."));
    }

    let image = input
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if mode == WriteMode::Create && image.is_none() {
        return Err(invalid("image", "This field is required."));
    }

    Ok(ValidatedRecipe {
        name: name.to_string(),
        text: text.to_string(),
        cooking_time,
        image,
        tag_ids: tags.to_vec(),
        ingredients: amounts,
    })
}
