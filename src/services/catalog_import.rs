//! 从 CSV 导入食材与标签
//!
//! 食材文件每行 `name,measurement_unit`，标签文件每行 `name,slug`。
//! 第一行视为表头跳过；空行和已存在的记录跳过。

use std::collections::HashSet;
use std::io::Read;

use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::{info, warn};

use migration::entities::{IngredientEntity, TagEntity, ingredient, tag};

use crate::errors::{FoodgramError, Result};
use crate::storage::SeaOrmStorage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
}

/// 读出两列记录；空行丢弃，列数不足报错
pub fn parse_pairs<R: Read>(reader: R) -> Result<Vec<(String, String)>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for (index, record) in csv.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        match (record.get(0), record.get(1)) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
                pairs.push((a.to_string(), b.to_string()));
            }
            _ => {
                // 表头占第 1 行
                return Err(FoodgramError::validation(format!(
                    "Line {}: expected two non-empty columns",
                    index + 2
                )));
            }
        }
    }
    Ok(pairs)
}

pub async fn import_ingredients<R: Read>(storage: &SeaOrmStorage, reader: R) -> Result<ImportReport> {
    let rows = parse_pairs(reader)?;
    let db = storage.get_db();

    let mut known: HashSet<(String, String)> = storage
        .read("ingredients.all", || IngredientEntity::find().all(db))
        .await?
        .into_iter()
        .map(|i| (i.name, i.measurement_unit))
        .collect();

    let mut report = ImportReport::default();
    for (name, unit) in rows {
        if !known.insert((name.clone(), unit.clone())) {
            report.skipped += 1;
            continue;
        }
        ingredient::ActiveModel {
            name: Set(name),
            measurement_unit: Set(unit),
            ..Default::default()
        }
        .insert(db)
        .await?;
        report.created += 1;
    }

    info!(
        "Ingredient import finished: {} created, {} skipped",
        report.created, report.skipped
    );
    Ok(report)
}

pub async fn import_tags<R: Read>(storage: &SeaOrmStorage, reader: R) -> Result<ImportReport> {
    let rows = parse_pairs(reader)?;
    let db = storage.get_db();

    let existing = storage
        .read("tags.all", || TagEntity::find().all(db))
        .await?;
    let mut names: HashSet<String> = existing.iter().map(|t| t.name.clone()).collect();
    let mut slugs: HashSet<String> = existing.into_iter().map(|t| t.slug).collect();

    let mut report = ImportReport::default();
    for (name, slug) in rows {
        if names.contains(&name) || slugs.contains(&slug) {
            if !names.contains(&name) || !slugs.contains(&slug) {
                warn!("Tag '{}' ({}) conflicts with an existing tag, skipped", name, slug);
            }
            report.skipped += 1;
            continue;
        }
        names.insert(name.clone());
        slugs.insert(slug.clone());
        tag::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(db)
        .await?;
        report.created += 1;
    }

    info!(
        "Tag import finished: {} created, {} skipped",
        report.created, report.skipped
    );
    Ok(report)
}
