//! Create administrator account

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use colored::Colorize;

use crate::config::get_config;
use crate::interfaces::cli::CliError;
use crate::services::{RegistrationInput, UserService};
use crate::services::media::MediaStore;
use crate::storage::SeaOrmStorage;

/// 未通过 `--password` 传入时读取的环境变量
pub const ADMIN_PASSWORD_ENV: &str = "FG_ADMIN_PASSWORD";

pub async fn create_admin(
    storage: Arc<SeaOrmStorage>,
    email: String,
    username: String,
    password: Option<String>,
    first_name: String,
    last_name: String,
) -> Result<(), CliError> {
    let password = match password {
        Some(p) => p,
        None => match std::env::var(ADMIN_PASSWORD_ENV) {
            Ok(p) => p,
            Err(_) => prompt_password_with_confirm()?,
        },
    };

    let media = Arc::new(MediaStore::from_config(&get_config().site));
    let users = UserService::new(storage, media);
    let admin = users
        .create_admin(RegistrationInput {
            email: Some(email),
            username: Some(username),
            first_name: Some(first_name),
            last_name: Some(last_name),
            password: Some(password),
        })
        .await?;

    println!(
        "{} {} (id {})",
        "Administrator created:".green(),
        admin.email.blue(),
        admin.id
    );
    Ok(())
}

/// 交互式输入密码（带确认）
fn prompt_password_with_confirm() -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::ParseError(format!(
            "Password required: pass --password, set {} or run interactively",
            ADMIN_PASSWORD_ENV
        )));
    }

    let read = |prompt: &str| -> Result<String, CliError> {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        rpassword::read_password()
            .map_err(|e| CliError::CommandError(format!("Failed to read password: {}", e)))
    };

    let password = read("Password: ")?;
    let confirm = read("Confirm password: ")?;
    if password != confirm {
        return Err(CliError::ParseError("Passwords do not match".to_string()));
    }
    Ok(password)
}
