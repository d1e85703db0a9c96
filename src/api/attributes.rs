//! Handlers shared by tags and ingredients, parameterised by [`AttributeKind`].

use sqlx::{Pool, Sqlite};
use warp::{http::StatusCode, hyper::body::Bytes, reject::Rejection, Reply};

use crate::{
    authentication::jwt::SessionData,
    database::{
        actions,
        error::{reject, ApiError},
        form::{decode_form, Form},
        payload::{AttributeFilterQuery, AttributePayload},
        schema::{AttributeKind, Id},
    },
};

pub async fn list_attributes(
    kind: AttributeKind,
    session: SessionData,
    query: AttributeFilterQuery,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    let rows = actions::list_attributes(kind, session.user_id, query.assigned_only(), &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&rows))
}

pub async fn update_attribute(
    kind: AttributeKind,
    id: Id,
    partial: bool,
    session: SessionData,
    body: Bytes,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    if actions::get_attribute(kind, id, session.user_id, &pool)
        .await
        .map_err(reject)?
        .is_none()
    {
        return Err(reject(ApiError::NotFound));
    }

    let data = decode_form(&body).map_err(reject)?;
    let payload = AttributePayload::parse(&Form::from_data(data), partial).map_err(reject)?;
    let attribute = actions::update_attribute(kind, id, session.user_id, payload, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&attribute))
}

pub async fn delete_attribute(
    kind: AttributeKind,
    id: Id,
    session: SessionData,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    actions::delete_attribute(kind, id, session.user_id, &pool)
        .await
        .map_err(reject)?;

    Ok(StatusCode::NO_CONTENT)
}
