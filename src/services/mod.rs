//! Service layer for business logic
//!
//! HTTP handlers and CLI commands share these services; none of them
//! know about actix types.

pub mod catalog_import;
mod catalog_service;
mod collection_service;
pub mod media;
pub mod pagination;
pub mod permissions;
mod recipe_service;
pub mod recipe_validation;
pub mod shopping_list;
mod short_link_service;
mod user_service;
pub mod views;

use std::sync::Arc;

pub use catalog_service::CatalogService;
pub use collection_service::{CollectionService, RecipeCollection};
pub use media::{MediaKind, MediaStore};
pub use pagination::{Page, PageParams, Paged};
pub use permissions::Permissions;
pub use recipe_service::{RecipeFilter, RecipeService};
pub use shopping_list::{ShoppingList, ShoppingListService};
pub use short_link_service::{MAX_TOKEN_ATTEMPTS, ShortLinkService, TokenGenerator};
pub use user_service::{RegistrationInput, UserService};

use crate::config::SiteConfig;
use crate::errors::Result;
use crate::storage::SeaOrmStorage;

/// 所有 service 的集合，作为 actix `web::Data` 共享
pub struct AppServices {
    pub storage: Arc<SeaOrmStorage>,
    pub media: Arc<MediaStore>,
    pub recipes: RecipeService,
    pub collections: CollectionService,
    pub shopping_list: ShoppingListService,
    pub short_links: ShortLinkService,
    pub users: UserService,
    pub catalog: CatalogService,
    /// 公开站点地址（无尾部斜杠），用于拼接短链
    pub base_url: String,
    pub page_size: u64,
}

impl AppServices {
    pub fn new(storage: Arc<SeaOrmStorage>, site: &SiteConfig) -> Result<Self> {
        let media = Arc::new(MediaStore::from_config(site));
        Ok(Self {
            recipes: RecipeService::new(storage.clone(), media.clone()),
            collections: CollectionService::new(storage.clone(), media.clone()),
            shopping_list: ShoppingListService::new(storage.clone()),
            short_links: ShortLinkService::new(storage.clone(), site.short_link_length)?,
            users: UserService::new(storage.clone(), media.clone()),
            catalog: CatalogService::new(storage.clone()),
            base_url: site.base_url.trim_end_matches('/').to_string(),
            page_size: site.page_size,
            storage,
            media,
        })
    }

    pub fn short_link_url(&self, token: &str) -> String {
        format!("{}/s/{}", self.base_url, token)
    }
}
