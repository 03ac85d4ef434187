//! 菜谱 HTTP 接口集成测试

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, dev::ServiceResponse};
use serde_json::{Value, json};

use foodgram::api::configure_app;
use foodgram::api::services::AppStartTime;

macro_rules! app {
    ($env:expr) => {{
        let services = $env.services.clone();
        test::init_service(App::new().configure(move |cfg| {
            configure_app(
                cfg,
                services,
                AppStartTime {
                    start_datetime: chrono::Utc::now(),
                },
                "/api",
            )
        }))
        .await
    }};
}

async fn body_json(resp: ServiceResponse) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

macro_rules! login {
    ($app:expr, $email:expr) => {{
        let req = TestRequest::post()
            .uri("/api/auth/token/login/")
            .set_json(json!({"email": $email, "password": common::PASSWORD}))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["auth_token"]
            .as_str()
            .unwrap()
            .to_string()
    }};
}

fn auth(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Token {}", token))
}

#[actix_rt::test]
async fn test_create_get_and_list_recipe() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let tag = env.tag("Breakfast").await;
    let eggs = env.ingredient("eggs", "pcs").await;
    let app = app!(env);
    let token = login!(&app, &author.email);

    let req = TestRequest::post()
        .uri("/api/recipes/")
        .insert_header(auth(&token))
        .set_json(json!({
            "name": "Omelette",
            "text": "Beat and fry.",
            "cooking_time": 10,
            "image": common::PIXEL,
            "tags": [tag.id],
            "ingredients": [{"id": eggs.id, "amount": 3}],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["name"], "Omelette");
    assert_eq!(created["author"]["username"], "chef");
    assert_eq!(created["ingredients"][0]["measurement_unit"], "pcs");
    assert_eq!(created["ingredients"][0]["amount"], 3);
    assert_eq!(created["tags"][0]["slug"], "breakfast");
    assert_eq!(created["is_favorited"], false);
    assert!(
        created["image"]
            .as_str()
            .unwrap()
            .starts_with("http://testserver/media/recipes/images/")
    );

    let id = created["id"].as_i64().unwrap();
    let resp = test::call_service(
        &app,
        TestRequest::get().uri(&format!("/api/recipes/{}/", id)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, created);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/recipes/?tags=breakfast").to_request(),
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["count"], 1);
    assert!(page["next"].is_null());

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/recipes/?tags=dinner").to_request(),
    )
    .await;
    assert_eq!(body_json(resp).await["count"], 0);
}

#[actix_rt::test]
async fn test_invalid_recipes_are_rejected_without_writes() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let tag = env.tag("Lunch").await;
    let rice = env.ingredient("rice", "g").await;
    let app = app!(env);
    let token = login!(&app, &author.email);

    let bodies = [
        json!({"name": "X", "text": "t", "cooking_time": 5, "image": common::PIXEL,
               "tags": [tag.id], "ingredients": []}),
        json!({"name": "X", "text": "t", "cooking_time": 5, "image": common::PIXEL,
               "tags": [tag.id], "ingredients": [{"id": rice.id, "amount": 1}, {"id": rice.id, "amount": 2}]}),
        json!({"name": "X", "text": "t", "cooking_time": 0, "image": common::PIXEL,
               "tags": [tag.id], "ingredients": [{"id": rice.id, "amount": 1}]}),
        json!({"name": "X", "text": "t", "cooking_time": 5, "image": common::PIXEL,
               "tags": [9999], "ingredients": [{"id": rice.id, "amount": 1}]}),
    ];
    for body in bodies {
        let req = TestRequest::post()
            .uri("/api/recipes/")
            .insert_header(auth(&token))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["code"], 1000);
    }

    let resp = test::call_service(&app, TestRequest::get().uri("/api/recipes/").to_request()).await;
    assert_eq!(body_json(resp).await["count"], 0);
}

#[actix_rt::test]
async fn test_update_replaces_ingredients_and_checks_author() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let other = env.user("other").await;
    let tag = env.tag("Dinner").await;
    let rice = env.ingredient("rice", "g").await;
    let peas = env.ingredient("peas", "g").await;
    let recipe = env
        .recipe(&author, "Pilaf", &[tag.id], &[(rice.id, 300)])
        .await;
    let app = app!(env);

    let other_token = login!(&app, &other.email);
    let patch = json!({"name": "Pilaf 2", "text": "Better.", "cooking_time": 40,
                       "tags": [tag.id], "ingredients": [{"id": peas.id, "amount": 50}]});
    let req = TestRequest::patch()
        .uri(&format!("/api/recipes/{}/", recipe.id))
        .insert_header(auth(&other_token))
        .set_json(&patch)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let token = login!(&app, &author.email);
    let req = TestRequest::patch()
        .uri(&format!("/api/recipes/{}/", recipe.id))
        .insert_header(auth(&token))
        .set_json(&patch)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["name"], "Pilaf 2");
    assert_eq!(updated["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(updated["ingredients"][0]["name"], "peas");
    // 更新时未提供图片则保留原图
    assert_eq!(updated["image"], recipe.image);

    // 失败的更新不改变已有数据
    let req = TestRequest::patch()
        .uri(&format!("/api/recipes/{}/", recipe.id))
        .insert_header(auth(&token))
        .set_json(json!({"name": "Broken", "text": "t", "cooking_time": 1,
                         "tags": [tag.id], "ingredients": []}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    let view = env.services.recipes.get(None, recipe.id).await.unwrap();
    assert_eq!(view.name, "Pilaf 2");
    assert_eq!(view.ingredients[0].name, "peas");
}

#[actix_rt::test]
async fn test_favorite_twice_and_remove_absent() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let fan = env.user("fan").await;
    let tag = env.tag("Dessert").await;
    let sugar = env.ingredient("sugar", "g").await;
    let recipe = env.recipe(&author, "Cake", &[tag.id], &[(sugar.id, 100)]).await;
    let app = app!(env);
    let token = login!(&app, &fan.email);
    let uri = format!("/api/recipes/{}/favorite/", recipe.id);

    let resp = test::call_service(
        &app,
        TestRequest::post().uri(&uri).insert_header(auth(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let short = body_json(resp).await;
    assert_eq!(short["name"], "Cake");
    assert!(short.get("ingredients").is_none());

    let resp = test::call_service(
        &app,
        TestRequest::post().uri(&uri).insert_header(auth(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["errors"], "Recipe already added!");

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/recipes/?is_favorited=1")
            .insert_header(auth(&token))
            .to_request(),
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["is_favorited"], true);

    let resp = test::call_service(
        &app,
        TestRequest::delete().uri(&uri).insert_header(auth(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = test::call_service(
        &app,
        TestRequest::delete().uri(&uri).insert_header(auth(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/recipes/9999/favorite/")
            .insert_header(auth(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_download_shopping_cart() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let tag = env.tag("Soup").await;
    let water = env.ingredient("water", "ml").await;
    let recipe = env.recipe(&author, "Broth", &[tag.id], &[(water.id, 500)]).await;
    let app = app!(env);
    let token = login!(&app, &author.email);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/recipes/download_shopping_cart/")
            .insert_header(auth(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], 3002);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/api/recipes/{}/shopping_cart/", recipe.id))
            .insert_header(auth(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/recipes/download_shopping_cart/")
            .insert_header(auth(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("chef_shopping_list.txt"));
    let text = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(text.contains("- water (ml) - 500"));

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/recipes/download_shopping_cart/")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_get_link_and_redirect() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let tag = env.tag("Salad").await;
    let leaf = env.ingredient("lettuce", "g").await;
    let recipe = env.recipe(&author, "Green", &[tag.id], &[(leaf.id, 80)]).await;
    let app = app!(env);

    let uri = format!("/api/recipes/{}/get-link/", recipe.id);
    let first = body_json(test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await).await;
    let second = body_json(test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await).await;
    assert_eq!(first, second);

    let link = first["short-link"].as_str().unwrap();
    let path = link.strip_prefix("http://testserver").unwrap();
    assert!(path.starts_with("/s/"));

    let resp = test::call_service(&app, TestRequest::get().uri(path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        &format!("/recipes/{}/", recipe.id)
    );

    let resp = test::call_service(&app, TestRequest::get().uri("/s/nope00").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/recipes/9999/get-link/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_delete_recipe_cascades() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let tag = env.tag("Fish").await;
    let cod = env.ingredient("cod", "g").await;
    let recipe = env.recipe(&author, "Cod", &[tag.id], &[(cod.id, 250)]).await;
    env.services.short_links.get_or_create(recipe.id).await.unwrap();
    let app = app!(env);
    let token = login!(&app, &author.email);

    let req = TestRequest::post()
        .uri(&format!("/api/recipes/{}/shopping_cart/", recipe.id))
        .insert_header(auth(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = TestRequest::delete()
        .uri(&format!("/api/recipes/{}/", recipe.id))
        .insert_header(auth(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/api/recipes/{}/", recipe.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(env.services.shopping_list.collect(author.id).await.is_err());
}

#[actix_rt::test]
async fn test_pagination_links() {
    let env = common::setup().await;
    let author = env.user("chef").await;
    let tag = env.tag("Bake").await;
    let flour = env.ingredient("flour", "g").await;
    for i in 0..3 {
        env.recipe(&author, &format!("Bun {}", i), &[tag.id], &[(flour.id, 100)])
            .await;
    }
    let app = app!(env);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/recipes/?limit=2")
            .insert_header(("Host", "testserver"))
            .to_request(),
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["results"][0]["name"], "Bun 2");
    assert_eq!(page["next"], "http://testserver/api/recipes/?limit=2&page=2");
    assert!(page["previous"].is_null());

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/api/recipes/?page=5").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
