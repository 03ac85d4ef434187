//! API 路由配置
//!
//! 固定路径（如 `/recipes/download_shopping_cart/`）必须注册在 `/{id}/` 之前。
//! 每个路由同时接受带与不带尾部斜杠的形式。

use actix_web::web;

use super::auth::{login, login_rate_limiter, logout};
use super::catalog::{get_ingredient, get_tag, list_ingredients, list_tags};
use super::recipes::{
    add_favorite, add_to_cart, create_recipe, delete_recipe, download_shopping_cart, get_link,
    get_recipe, list_recipes, remove_favorite, remove_from_cart, update_recipe,
};
use super::users::{
    delete_avatar, get_user, list_users, me, register, set_avatar, set_password, subscribe,
    subscriptions, unsubscribe,
};

/// 同一 handler 注册到 `path` 与 `path/`
macro_rules! both {
    ($scope:expr, $path:literal, $route:expr) => {
        $scope
            .route($path, $route)
            .route(concat!($path, "/"), $route)
    };
}

/// 菜谱路由 `/recipes`
pub fn recipes_routes() -> actix_web::Scope {
    let scope = web::scope("/recipes");
    let scope = both!(scope, "", web::get().to(list_recipes));
    let scope = both!(scope, "", web::post().to(create_recipe));
    let scope = both!(
        scope,
        "/download_shopping_cart",
        web::get().to(download_shopping_cart)
    );
    let scope = both!(scope, "/{id}/get-link", web::get().to(get_link));
    let scope = both!(scope, "/{id}/favorite", web::post().to(add_favorite));
    let scope = both!(scope, "/{id}/favorite", web::delete().to(remove_favorite));
    let scope = both!(scope, "/{id}/shopping_cart", web::post().to(add_to_cart));
    let scope = both!(scope, "/{id}/shopping_cart", web::delete().to(remove_from_cart));
    let scope = both!(scope, "/{id}", web::get().to(get_recipe));
    let scope = both!(scope, "/{id}", web::patch().to(update_recipe));
    both!(scope, "/{id}", web::delete().to(delete_recipe))
}

/// 用户路由 `/users`
pub fn users_routes() -> actix_web::Scope {
    let scope = web::scope("/users");
    let scope = both!(scope, "", web::get().to(list_users));
    let scope = both!(scope, "", web::post().to(register));
    let scope = both!(scope, "/me", web::get().to(me));
    let scope = both!(scope, "/me/avatar", web::put().to(set_avatar));
    let scope = both!(scope, "/me/avatar", web::delete().to(delete_avatar));
    let scope = both!(scope, "/set_password", web::post().to(set_password));
    let scope = both!(scope, "/subscriptions", web::get().to(subscriptions));
    let scope = both!(scope, "/{id}/subscribe", web::post().to(subscribe));
    let scope = both!(scope, "/{id}/subscribe", web::delete().to(unsubscribe));
    both!(scope, "/{id}", web::get().to(get_user))
}

/// 标签与食材 `/tags`、`/ingredients`
pub fn tags_routes() -> actix_web::Scope {
    let scope = web::scope("/tags");
    let scope = both!(scope, "", web::get().to(list_tags));
    both!(scope, "/{id}", web::get().to(get_tag))
}

pub fn ingredients_routes() -> actix_web::Scope {
    let scope = web::scope("/ingredients");
    let scope = both!(scope, "", web::get().to(list_ingredients));
    both!(scope, "/{id}", web::get().to(get_ingredient))
}

/// 登录/登出 `/auth/token`
pub fn auth_routes() -> actix_web::Scope {
    let scope = web::scope("/auth/token");
    let scope = scope
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route("/login/", web::post().to(login).wrap(login_rate_limiter()));
    both!(scope, "/logout", web::post().to(logout))
}

/// `{prefix}` 下的全部 API 路由
pub fn api_routes(prefix: &str) -> actix_web::Scope {
    web::scope(prefix)
        .service(recipes_routes())
        .service(users_routes())
        .service(tags_routes())
        .service(ingredients_routes())
        .service(auth_routes())
}
