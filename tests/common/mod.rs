//! 集成测试公共环境：每个测试独立的临时 SQLite 库与 media 目录

#![allow(dead_code)]

use std::sync::{Arc, Once};

use actix_web::web;
use sea_orm::{ActiveModelTrait, Set};
use tempfile::TempDir;

use foodgram::config::{SiteConfig, init_config};
use foodgram::services::recipe_validation::{IngredientAmountInput, RecipeInput};
use foodgram::services::views::RecipeView;
use foodgram::services::{AppServices, RegistrationInput};
use foodgram::storage::SeaOrmStorage;
use migration::entities::{ingredient, tag, user};

static INIT: Once = Once::new();

/// 1x1 PNG
pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub const PASSWORD: &str = "s3cret-pass";

pub struct TestEnv {
    pub dir: TempDir,
    pub storage: Arc<SeaOrmStorage>,
    pub services: web::Data<AppServices>,
}

pub fn site_config(dir: &TempDir) -> SiteConfig {
    SiteConfig {
        base_url: "http://testserver".to_string(),
        media_root: dir.path().join("media").display().to_string(),
        ..Default::default()
    }
}

pub async fn setup() -> TestEnv {
    INIT.call_once(init_config);

    let dir = TempDir::new().expect("创建临时目录失败");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("创建存储失败"),
    );
    let services = AppServices::new(storage.clone(), &site_config(&dir)).expect("初始化 services 失败");

    TestEnv {
        dir,
        storage,
        services: web::Data::new(services),
    }
}

impl TestEnv {
    pub async fn user(&self, name: &str) -> user::Model {
        let created = self
            .services
            .users
            .register(RegistrationInput {
                email: Some(format!("{}@example.com", name)),
                username: Some(name.to_string()),
                first_name: Some(name.to_string()),
                last_name: Some("Tester".to_string()),
                password: Some(PASSWORD.to_string()),
            })
            .await
            .expect("注册失败");
        self.services
            .users
            .find_by_id(created.id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn tag(&self, name: &str) -> tag::Model {
        tag::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(name.to_lowercase()),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await
        .unwrap()
    }

    pub async fn ingredient(&self, name: &str, unit: &str) -> ingredient::Model {
        ingredient::ActiveModel {
            name: Set(name.to_string()),
            measurement_unit: Set(unit.to_string()),
            ..Default::default()
        }
        .insert(self.storage.get_db())
        .await
        .unwrap()
    }

    pub async fn recipe(
        &self,
        author: &user::Model,
        name: &str,
        tags: &[i32],
        ingredients: &[(i32, i64)],
    ) -> RecipeView {
        self.services
            .recipes
            .create(author, recipe_input(name, tags, ingredients))
            .await
            .expect("创建菜谱失败")
    }
}

pub fn recipe_input(name: &str, tags: &[i32], ingredients: &[(i32, i64)]) -> RecipeInput {
    RecipeInput {
        name: Some(name.to_string()),
        text: Some(format!("How to cook {}", name)),
        cooking_time: Some(15),
        image: Some(PIXEL.to_string()),
        tags: Some(tags.to_vec()),
        ingredients: Some(
            ingredients
                .iter()
                .map(|(id, amount)| IngredientAmountInput {
                    id: *id,
                    amount: *amount,
                })
                .collect(),
        ),
    }
}
