//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Foodgram - recipe sharing service
#[derive(Parser)]
#[command(name = "foodgram")]
#[command(version)]
#[command(about = "Recipe sharing service with shopping lists and short links", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Import ingredients from a CSV file (`name,measurement_unit`, header row skipped)
    LoadIngredients {
        /// CSV file path
        file_path: String,
    },

    /// Import tags from a CSV file (`name,slug`, header row skipped)
    LoadTags {
        /// CSV file path
        file_path: String,
    },

    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        /// Password (falls back to FG_ADMIN_PASSWORD, then an interactive prompt)
        #[arg(long)]
        password: Option<String>,

        #[arg(long, default_value = "Admin")]
        first_name: String,

        #[arg(long, default_value = "Admin")]
        last_name: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_server() {
        let cli = Cli::try_parse_from(["foodgram"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_load_ingredients_with_config() {
        let cli =
            Cli::try_parse_from(["foodgram", "load-ingredients", "data.csv", "-c", "prod.toml"])
                .unwrap();
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
        match cli.command {
            Some(Commands::LoadIngredients { file_path }) => assert_eq!(file_path, "data.csv"),
            _ => panic!("expected load-ingredients"),
        }
    }

    #[test]
    fn test_parse_create_admin() {
        let cli = Cli::try_parse_from([
            "foodgram",
            "create-admin",
            "--email",
            "root@example.com",
            "--username",
            "root",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateAdmin {
                email,
                password,
                first_name,
                ..
            }) => {
                assert_eq!(email, "root@example.com");
                assert!(password.is_none());
                assert_eq!(first_name, "Admin");
            }
            _ => panic!("expected create-admin"),
        }
    }
}
