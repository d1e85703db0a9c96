use sqlx::{Pool, Sqlite};
use warp::{http::StatusCode, hyper::body::Bytes, reject::Rejection, Reply};

use crate::{
    authentication::jwt::SessionData,
    database::{
        actions,
        error::{reject, ApiError},
        form::{decode_form, Form, FormData},
        payload::{RecipeFilter, RecipeFilterQuery, RecipePayload},
        schema::Id,
    },
};

/// GET /recipes/
pub async fn list_recipes(
    session: SessionData,
    query: RecipeFilterQuery,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    let filter = RecipeFilter::parse(&query).map_err(reject)?;
    let rows = actions::fetch_recipes(session.user_id, &filter, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&rows))
}

/// POST /recipes/
pub async fn create_recipe(
    session: SessionData,
    data: FormData,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    let payload = RecipePayload::parse(&Form::from_data(data), false).map_err(reject)?;
    let recipe = actions::create_recipe(session.user_id, payload, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&recipe),
        StatusCode::CREATED,
    ))
}

/// GET /recipes/{id}/
pub async fn get_recipe(
    id: Id,
    session: SessionData,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    let recipe = actions::get_recipe_detail(id, session.user_id, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&recipe))
}

/// PATCH (`partial`) or PUT /recipes/{id}/
pub async fn update_recipe(
    id: Id,
    partial: bool,
    session: SessionData,
    body: Bytes,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    if actions::get_recipe(id, session.user_id, &pool)
        .await
        .map_err(reject)?
        .is_none()
    {
        return Err(reject(ApiError::NotFound));
    }

    let data = decode_form(&body).map_err(reject)?;
    let payload = RecipePayload::parse(&Form::from_data(data), partial).map_err(reject)?;
    let recipe = actions::update_recipe(id, session.user_id, payload, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&recipe))
}

/// DELETE /recipes/{id}/
pub async fn delete_recipe(
    id: Id,
    session: SessionData,
    pool: Pool<Sqlite>,
) -> Result<impl Reply, Rejection> {
    actions::delete_recipe(id, session.user_id, &pool)
        .await
        .map_err(reject)?;

    Ok(StatusCode::NO_CONTENT)
}
