#![allow(dead_code)]

use std::path::Path;

use chrono::Duration;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use warp::http::StatusCode;

use recipe_api::{
    actions,
    connection::{establish_memory_pool, establish_pool, run_migrations},
    jwt::SessionKeys,
    payload::{RecipePayload, UserPayload},
    schema::{Id, Price, RecipeDetail, User},
};

pub const PASSWORD: &str = "testpass123";

pub struct TestApp {
    pub pool: Pool<Sqlite>,
    pub keys: SessionKeys,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = establish_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let keys = SessionKeys::new(b"test-secret", Duration::hours(1)).unwrap();

        Self { pool, keys }
    }

    /// Backed by a database file under `dir` with a pool of several connections.
    pub async fn with_file_database(dir: &Path) -> Self {
        let url = format!("sqlite://{}?mode=rwc", dir.join("recipes.db").display());
        let pool = establish_pool(&url, 5).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let keys = SessionKeys::new(b"test-secret", Duration::hours(1)).unwrap();

        Self { pool, keys }
    }

    /// Registers a user and returns it with a valid session token.
    pub async fn create_user(&self, email: &str) -> (User, String) {
        let user = actions::register_user(
            UserPayload {
                email: Some(email.to_string()),
                password: Some(PASSWORD.to_string()),
                name: Some("Test".to_string()),
            },
            &self.pool,
        )
        .await
        .unwrap();
        let token = self.keys.generate_session(&user).unwrap();

        (user, token)
    }

    pub async fn create_recipe(&self, user_id: Id, title: &str) -> RecipeDetail {
        actions::create_recipe(
            user_id,
            RecipePayload {
                title: Some(title.to_string()),
                time_minutes: Some(10),
                price: Some(Price::from_cents(500)),
                link: Some("https://example.com/recipe.pdf".to_string()),
                description: Some("Sample description".to_string()),
                ..RecipePayload::default()
            },
            &self.pool,
        )
        .await
        .unwrap()
    }

    pub async fn create_recipe_with(
        &self,
        user_id: Id,
        title: &str,
        tags: &[&str],
        ingredients: &[&str],
    ) -> RecipeDetail {
        actions::create_recipe(
            user_id,
            RecipePayload {
                title: Some(title.to_string()),
                time_minutes: Some(10),
                price: Some(Price::from_cents(500)),
                tags: Some(tags.iter().map(|t| t.to_string()).collect()),
                ingredients: Some(ingredients.iter().map(|i| i.to_string()).collect()),
                ..RecipePayload::default()
            },
            &self.pool,
        )
        .await
        .unwrap()
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let api = recipe_api::api(self.pool.clone(), self.keys.clone());
        let response = request.reply(&api).await;

        let body = if response.body().is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(response.body()).unwrap()
        };

        Response {
            status: response.status(),
            body,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> Response {
        self.request("GET", path, Some(token), None).await
    }

    pub async fn count(&self, sql: &str, user_id: Id) -> i64 {
        let row: (i64,) = sqlx::query_as(sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        row.0
    }
}
