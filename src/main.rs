use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use foodgram::cli::{Cli, Commands};
use foodgram::config::{get_config, init_config, init_config_from};
use foodgram::runtime::modes;
use foodgram::system::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match cli.config.as_deref() {
        Some(path) => init_config_from(path),
        None => init_config(),
    }
    let config = get_config();

    // guard 必须活到进程结束，否则非阻塞日志会丢失
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        None | Some(Commands::Serve) => modes::run_server().await,
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                error!("CLI command failed: {}", e);
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
