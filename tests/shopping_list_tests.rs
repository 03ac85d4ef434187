//! 购物清单汇总集成测试

mod common;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use foodgram::errors::FoodgramError;
use foodgram::services::RecipeCollection;
use foodgram::services::shopping_list::{ShoppingListItem, aggregate};

fn totals(items: &[ShoppingListItem]) -> BTreeMap<(String, String), i64> {
    items
        .iter()
        .map(|i| ((i.name.clone(), i.unit.clone()), i.total))
        .collect()
}

#[actix_rt::test]
async fn test_cart_aggregates_same_ingredient_across_recipes() {
    let env = common::setup().await;
    let author = env.user("author").await;
    let shopper = env.user("shopper").await;
    let breakfast = env.tag("Breakfast").await;
    let flour = env.ingredient("flour", "g").await;
    let salt = env.ingredient("salt", "g").await;

    let r1 = env
        .recipe(&author, "Bread", &[breakfast.id], &[(flour.id, 200)])
        .await;
    let r2 = env
        .recipe(
            &author,
            "Pretzel",
            &[breakfast.id],
            &[(flour.id, 100), (salt.id, 5)],
        )
        .await;

    for id in [r1.id, r2.id] {
        env.services
            .collections
            .add(RecipeCollection::ShoppingCart, shopper.id, id)
            .await
            .unwrap();
    }

    let list = env
        .services
        .shopping_list
        .build_for_date(&shopper, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        .await
        .unwrap();

    assert_eq!(list.filename, "shopper_shopping_list.txt");
    assert_eq!(
        list.content,
        "Shopping list for: shopper Tester\n\nDate: 2025-06-01\n\n\
         - flour (g) - 300\n- salt (g) - 5\n\nFoodgram (2025)"
    );
}

#[actix_rt::test]
async fn test_same_name_different_unit_stays_separate() {
    let env = common::setup().await;
    let author = env.user("author").await;
    let tag = env.tag("Dinner").await;
    let milk_ml = env.ingredient("milk", "ml").await;
    let milk_cup = env.ingredient("milk", "cup").await;

    let r = env
        .recipe(&author, "Porridge", &[tag.id], &[(milk_ml.id, 200), (milk_cup.id, 1)])
        .await;
    env.services
        .collections
        .add(RecipeCollection::ShoppingCart, author.id, r.id)
        .await
        .unwrap();

    let items = env.services.shopping_list.collect(author.id).await.unwrap();
    let lines: Vec<_> = items
        .iter()
        .map(|i| format!("{} ({}) - {}", i.name, i.unit, i.total))
        .collect();
    assert_eq!(lines, vec!["milk (cup) - 1", "milk (ml) - 200"]);
}

#[actix_rt::test]
async fn test_empty_cart_is_rejected() {
    let env = common::setup().await;
    let user = env.user("nobody").await;

    let err = env.services.shopping_list.build(&user).await.unwrap_err();
    assert!(matches!(err, FoodgramError::EmptyShoppingCart(_)));
    assert_eq!(err.http_status().as_u16(), 400);
}

#[actix_rt::test]
async fn test_removed_recipe_leaves_the_list() {
    let env = common::setup().await;
    let author = env.user("author").await;
    let tag = env.tag("Lunch").await;
    let rice = env.ingredient("rice", "g").await;
    let beans = env.ingredient("beans", "g").await;

    let r1 = env.recipe(&author, "Rice", &[tag.id], &[(rice.id, 150)]).await;
    let r2 = env.recipe(&author, "Beans", &[tag.id], &[(beans.id, 80)]).await;
    for id in [r1.id, r2.id] {
        env.services
            .collections
            .add(RecipeCollection::ShoppingCart, author.id, id)
            .await
            .unwrap();
    }
    env.services
        .collections
        .remove(RecipeCollection::ShoppingCart, author.id, r1.id)
        .await
        .unwrap();

    let items = env.services.shopping_list.collect(author.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "beans");
    assert_eq!(items[0].total, 80);
}

#[actix_rt::test]
async fn test_two_carts_combine_to_sum_of_each() {
    let env = common::setup().await;
    let author = env.user("author").await;
    let alice = env.user("alice").await;
    let bob = env.user("bob").await;
    let tag = env.tag("Bake").await;
    let flour = env.ingredient("flour", "g").await;
    let sugar = env.ingredient("sugar", "g").await;
    let eggs = env.ingredient("eggs", "pcs").await;

    let cake = env
        .recipe(&author, "Cake", &[tag.id], &[(flour.id, 250), (sugar.id, 100)])
        .await;
    let pancake = env
        .recipe(&author, "Pancake", &[tag.id], &[(flour.id, 150), (eggs.id, 2)])
        .await;

    let carts = [(alice.id, vec![cake.id, pancake.id]), (bob.id, vec![cake.id])];
    for (user_id, recipes) in &carts {
        for recipe_id in recipes {
            env.services
                .collections
                .add(RecipeCollection::ShoppingCart, *user_id, *recipe_id)
                .await
                .unwrap();
        }
    }

    let alice_items = env.services.shopping_list.collect(alice.id).await.unwrap();
    let bob_items = env.services.shopping_list.collect(bob.id).await.unwrap();

    // bob 的清单只来自 Cake
    assert_eq!(
        totals(&bob_items),
        BTreeMap::from([
            (("flour".to_string(), "g".to_string()), 250),
            (("sugar".to_string(), "g".to_string()), 100),
        ])
    );
    assert_eq!(
        totals(&alice_items)[&("flour".to_string(), "g".to_string())],
        400
    );

    let merged = aggregate(
        alice_items
            .iter()
            .chain(bob_items.iter())
            .map(|i| (i.name.clone(), i.unit.clone(), i.total)),
    );

    let mut expected = totals(&alice_items);
    for (key, total) in totals(&bob_items) {
        *expected.entry(key).or_insert(0) += total;
    }
    assert_eq!(totals(&merged), expected);
    assert_eq!(
        expected,
        BTreeMap::from([
            (("eggs".to_string(), "pcs".to_string()), 2),
            (("flour".to_string(), "g".to_string()), 650),
            (("sugar".to_string(), "g".to_string()), 200),
        ])
    );
}
