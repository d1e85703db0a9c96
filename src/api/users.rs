use serde::Serialize;
use sqlx::{Pool, Sqlite};
use warp::{http::StatusCode, reject::Rejection, Reply};

use crate::{
    authentication::jwt::{SessionData, SessionKeys},
    database::{
        actions,
        error::{reject, ApiError},
        form::{Form, FormData},
        payload::{Credentials, UserPayload},
        schema::UserProfile,
    },
};

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

/// POST /user/create/
pub async fn create_user(data: FormData, pool: Pool<Sqlite>) -> Result<impl Reply, Rejection> {
    let payload = UserPayload::parse(&Form::from_data(data), false).map_err(reject)?;
    let user = actions::register_user(payload, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&UserProfile::from(&user)),
        StatusCode::CREATED,
    ))
}

/// POST /user/token/
pub async fn create_token(
    data: FormData,
    pool: Pool<Sqlite>,
    keys: SessionKeys,
) -> Result<impl Reply, Rejection> {
    let credentials = Credentials::parse(&Form::from_data(data)).map_err(reject)?;
    let token = actions::login_user(credentials, &keys, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&TokenResponse { token }))
}

/// GET /user/me/
pub async fn get_me(session: SessionData, pool: Pool<Sqlite>) -> Result<impl Reply, Rejection> {
    let user = actions::get_user_by_id(&pool, session.user_id)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(ApiError::NotFound))?;

    Ok(warp::reply::json(&UserProfile::from(&user)))
}

/// PATCH (`partial`) or PUT /user/me/
pub async fn update_me(
    partial: bool,
    session: SessionData,
    data: FormData,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    let payload = UserPayload::parse(&Form::from_data(data), partial).map_err(reject)?;
    let user = actions::update_user(session.user_id, payload, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&UserProfile::from(&user)))
}
