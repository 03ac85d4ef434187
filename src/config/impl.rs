use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults (without caching them)
/// when `init_config()` has not run yet.
pub fn get_config() -> Arc<StaticConfig> {
    try_get_config().unwrap_or_else(|| Arc::new(StaticConfig::default()))
}

/// 已初始化时返回全局配置
pub fn try_get_config() -> Option<Arc<StaticConfig>> {
    CONFIG.get().map(|c| c.load_full())
}

/// Initialize the global configuration
///
/// Loads configuration from "config.toml" in the current directory,
/// overridden by `FG__*` environment variables.
///
/// # Examples
/// ```no_run
/// use foodgram::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load()));
}

/// 使用指定配置文件初始化（`-c/--config`）
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load_from(path)));
}
