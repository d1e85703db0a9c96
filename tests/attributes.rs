mod common;

use serde_json::json;
use warp::http::StatusCode;

use common::TestApp;

#[tokio::test]
async fn attribute_endpoints_require_authentication() {
    let app = TestApp::new().await;

    for path in ["/tags/", "/ingredients/"] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
    }

    let response = app
        .request("PATCH", "/tags/1/", None, Some(json!({ "name": "x" })))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tags_are_listed_by_name_descending() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let (other, _) = app.create_user("other@example.com").await;
    app.create_recipe_with(user.id, "Curry", &["Dessert", "Vegan"], &[])
        .await;
    app.create_recipe_with(other.id, "Fruit", &["Fruity"], &[])
        .await;

    let response = app.get("/tags/", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Vegan", "Dessert"]);
}

#[tokio::test]
async fn ingredients_are_scoped_to_owner() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let (other, _) = app.create_user("other@example.com").await;
    app.create_recipe_with(user.id, "Soup", &[], &["Kale", "Salt"])
        .await;
    app.create_recipe_with(other.id, "Stew", &[], &["Vinegar"])
        .await;

    let response = app.get("/ingredients/", &token).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([{ "id": 2, "name": "Salt" }, { "id": 1, "name": "Kale" }])
    );
}

#[tokio::test]
async fn rename_tag() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let recipe = app.create_recipe_with(user.id, "Curry", &["Dinner"], &[]).await;
    let tag = &recipe.row.tags[0];

    let response = app
        .request(
            "PATCH",
            &format!("/tags/{}/", tag.id),
            Some(&token),
            Some(json!({ "name": "Breakfast" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "id": tag.id, "name": "Breakfast" }));

    let response = app
        .get(&format!("/recipes/{}/", recipe.row.id), &token)
        .await;
    assert_eq!(response.body["tags"][0]["name"], "Breakfast");
}

#[tokio::test]
async fn rename_to_existing_name_is_rejected() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let recipe = app
        .create_recipe_with(user.id, "Curry", &["Dinner", "Lunch"], &[])
        .await;
    let lunch = recipe.row.tags.iter().find(|t| t.name == "Lunch").unwrap();

    let response = app
        .request(
            "PUT",
            &format!("/tags/{}/", lunch.id),
            Some(&token),
            Some(json!({ "name": "Dinner" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "name": ["tag with this name already exists."] })
    );
}

#[tokio::test]
async fn full_update_requires_name() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let recipe = app.create_recipe_with(user.id, "Soup", &[], &["Kale"]).await;

    let response = app
        .request(
            "PUT",
            &format!("/ingredients/{}/", recipe.row.ingredients[0].id),
            Some(&token),
            Some(json!({})),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "name": ["This field is required."] }));
}

#[tokio::test]
async fn other_users_attributes_are_not_found() {
    let app = TestApp::new().await;
    let (owner, _) = app.create_user("owner@example.com").await;
    let (_, token) = app.create_user("intruder@example.com").await;
    let recipe = app.create_recipe_with(owner.id, "Curry", &["Thai"], &["Rice"]).await;

    let tag_path = format!("/tags/{}/", recipe.row.tags[0].id);
    let response = app
        .request("PATCH", &tag_path, Some(&token), Some(json!({ "name": "Mine" })))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let ingredient_path = format!("/ingredients/{}/", recipe.row.ingredients[0].id);
    let response = app
        .request("DELETE", &ingredient_path, Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(
        app.count("SELECT COUNT(*) FROM ingredients WHERE user_id = $1", owner.id)
            .await,
        1
    );
}

#[tokio::test]
async fn delete_tag_detaches_it_from_recipes() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let recipe = app.create_recipe_with(user.id, "Curry", &["Thai"], &[]).await;

    let response = app
        .request(
            "DELETE",
            &format!("/tags/{}/", recipe.row.tags[0].id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    assert_eq!(app.get("/tags/", &token).await.body, json!([]));
    let response = app
        .get(&format!("/recipes/{}/", recipe.row.id), &token)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["tags"], json!([]));
}

#[tokio::test]
async fn attributes_have_no_create_or_retrieve() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let recipe = app.create_recipe_with(user.id, "Curry", &["Thai"], &[]).await;

    let response = app
        .request("POST", "/tags/", Some(&token), Some(json!({ "name": "New" })))
        .await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .get(&format!("/tags/{}/", recipe.row.tags[0].id), &token)
        .await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn assigned_only_hides_unused_attributes() {
    let app = TestApp::new().await;
    let (user, token) = app.create_user("user@example.com").await;
    let recipe = app
        .create_recipe_with(user.id, "Curry", &["Thai", "Spicy"], &[])
        .await;

    app.request(
        "PATCH",
        &format!("/recipes/{}/", recipe.row.id),
        Some(&token),
        Some(json!({ "tags": [{ "name": "Thai" }] })),
    )
    .await;

    let all = app.get("/tags/", &token).await;
    assert_eq!(all.body.as_array().unwrap().len(), 2);

    let assigned = app.get("/tags/?assigned_only=1", &token).await;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(assigned.body.as_array().unwrap().len(), 1);
    assert_eq!(assigned.body[0]["name"], "Thai");
}
