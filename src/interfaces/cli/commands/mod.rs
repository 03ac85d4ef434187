mod catalog;
mod config_gen;
mod create_admin;

pub use catalog::{load_ingredients, load_tags};
pub use config_gen::config_generate;
pub use create_admin::create_admin;
