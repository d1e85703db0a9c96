use log::info;
use sqlx::{Pool, Sqlite};

use crate::{
    authentication::{
        cryptography::{hash_password, verify_password},
        jwt::SessionKeys,
    },
    database::{
        error::{ApiError, TypeError, ValidationErrors, NON_FIELD_ERRORS},
        payload::{Credentials, UserPayload},
        schema::{Id, User},
    },
};

const DUPLICATE_EMAIL: &str = "user with this email already exists.";
const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

pub async fn get_user(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Sqlite>, user_id: Id) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Creates a user, storing the argon2 hash of their password.
pub async fn register_user(payload: UserPayload, pool: &Pool<Sqlite>) -> Result<User, ApiError> {
    let mut errors = ValidationErrors::new();
    let email = errors.collect("email", payload.email.ok_or_else(TypeError::required));
    let password = errors.collect("password", payload.password.ok_or_else(TypeError::required));
    let (Some(email), Some(password)) = (email, password) else {
        return Err(errors.into());
    };
    let password = hash_password(password).await?;

    let user: User = sqlx::query_as(
        "
        INSERT INTO users (email, name, password)
        VALUES ($1, $2, $3)
        RETURNING *
    ",
    )
    .bind(&email)
    .bind(payload.name.unwrap_or_default())
    .bind(password)
    .fetch_one(pool)
    .await
    .map_err(ApiError::unique_violation("email", DUPLICATE_EMAIL.to_string()))?;

    info!("Registered user {}", user.id);
    Ok(user)
}

pub async fn login_user(
    credentials: Credentials,
    keys: &SessionKeys,
    pool: &Pool<Sqlite>,
) -> Result<String, ApiError> {
    let invalid = || ApiError::Validation(ValidationErrors::single(NON_FIELD_ERRORS, INVALID_CREDENTIALS));

    let user = get_user(pool, &credentials.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(credentials.password, user.password.to_owned()).await? {
        return Err(invalid());
    }

    keys.generate_session(&user)
}

/// Applies the submitted fields to the user, re-hashing a new password.
pub async fn update_user(
    user_id: Id,
    payload: UserPayload,
    pool: &Pool<Sqlite>,
) -> Result<User, ApiError> {
    let mut user = get_user_by_id(pool, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(email) = payload.email {
        user.email = email;
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(password) = payload.password {
        user.password = hash_password(password).await?;
    }

    sqlx::query("UPDATE users SET email = $1, name = $2, password = $3 WHERE id = $4")
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.id)
        .execute(pool)
        .await
        .map_err(ApiError::unique_violation("email", DUPLICATE_EMAIL.to_string()))?;

    Ok(user)
}
