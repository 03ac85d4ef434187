//! Catalog import commands

use std::fs::File;
use std::sync::Arc;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::catalog_import::{ImportReport, import_ingredients, import_tags};
use crate::storage::SeaOrmStorage;

fn open(file_path: &str) -> Result<File, CliError> {
    File::open(file_path)
        .map_err(|e| CliError::CommandError(format!("Cannot open {}: {}", file_path, e)))
}

fn print_report(what: &str, file_path: &str, report: ImportReport) {
    println!(
        "{} {} {}",
        format!("Imported {}", what).green(),
        "from".dimmed(),
        file_path.blue()
    );
    println!(
        "  {} {}  {} {}",
        "created:".bold(),
        report.created.to_string().green(),
        "skipped:".bold(),
        report.skipped.to_string().yellow()
    );
}

pub async fn load_ingredients(storage: Arc<SeaOrmStorage>, file_path: String) -> Result<(), CliError> {
    let report = import_ingredients(&storage, open(&file_path)?).await?;
    print_report("ingredients", &file_path, report);
    Ok(())
}

pub async fn load_tags(storage: Arc<SeaOrmStorage>, file_path: String) -> Result<(), CliError> {
    let report = import_tags(&storage, open(&file_path)?).await?;
    print_report("tags", &file_path, report);
    Ok(())
}
