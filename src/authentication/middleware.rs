use std::convert::Infallible;

use log::debug;
use sqlx::{Pool, Sqlite};
use warp::{reject::Rejection, Filter};

use super::jwt::{SessionData, SessionKeys};
use crate::{
    constants::AUTH_SCHEMES,
    database::{actions::get_user_by_id, error::ApiError},
};

pub fn with_db(pool: Pool<Sqlite>) -> impl Filter<Extract = (Pool<Sqlite>,), Error = Infallible> + Clone {
    warp::any().map(move || pool.clone())
}

pub fn with_keys(keys: SessionKeys) -> impl Filter<Extract = (SessionKeys,), Error = Infallible> + Clone {
    warp::any().map(move || keys.clone())
}

/// Resolves the caller from the `Authorization` header, rejecting with 401.
pub fn with_session(
    pool: Pool<Sqlite>,
    keys: SessionKeys,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_db(pool))
        .and(with_keys(keys))
        .and_then(|header: Option<String>, pool: Pool<Sqlite>, keys: SessionKeys| async move {
            authenticate(header.as_deref(), &pool, &keys)
                .await
                .map_err(warp::reject::custom)
        })
}

pub async fn authenticate(
    header: Option<&str>,
    pool: &Pool<Sqlite>,
    keys: &SessionKeys,
) -> Result<SessionData, ApiError> {
    let token = parse_authorization(header)?;
    let session = keys.verify_session(token)?;

    match get_user_by_id(pool, session.user_id).await? {
        Some(user) => Ok(SessionData::from(&user)),
        None => {
            debug!("Session for missing user {}", session.user_id);
            Err(ApiError::InvalidToken)
        }
    }
}

/// Extracts the token of a `Bearer <token>` (or `Token <token>`) header.
pub fn parse_authorization(header: Option<&str>) -> Result<&str, ApiError> {
    let header = header.map(str::trim).ok_or(ApiError::AuthenticationRequired)?;
    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));

    if !AUTH_SCHEMES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(scheme))
    {
        return Err(ApiError::AuthenticationRequired);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(ApiError::InvalidToken);
    }
    Ok(token)
}
