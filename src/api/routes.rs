use std::convert::Infallible;

use sqlx::{Pool, Sqlite};
use warp::{hyper::body::Bytes, reject::Rejection, Filter, Reply};

use super::{attributes, recipes, rejection::handle_rejection, users};
use crate::{
    authentication::{
        jwt::SessionKeys,
        middleware::{with_db, with_keys, with_session},
    },
    constants::BODY_SIZE_LIMIT,
    database::{
        form::FormData,
        payload::{AttributeFilterQuery, RecipeFilterQuery},
        schema::{AttributeKind, Id},
    },
};

/// The complete service: every route, error rendering and access logging.
pub fn api(
    pool: Pool<Sqlite>,
    keys: SessionKeys,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    recipe_routes(pool.clone(), keys.clone())
        .or(attribute_routes(AttributeKind::Tag, pool.clone(), keys.clone()))
        .or(attribute_routes(AttributeKind::Ingredient, pool.clone(), keys.clone()))
        .or(user_routes(pool, keys))
        .recover(handle_rejection)
        .with(warp::log("recipe_api"))
}

fn json_body() -> impl Filter<Extract = (FormData,), Error = Rejection> + Clone {
    warp::body::content_length_limit(BODY_SIZE_LIMIT).and(warp::body::json())
}

/// Undecoded body, for handlers that must resolve the target before parsing it.
fn raw_body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::content_length_limit(BODY_SIZE_LIMIT).and(warp::body::bytes())
}

/// PATCH extracts `true` (partial update), PUT `false`.
fn update_method() -> impl Filter<Extract = (bool,), Error = Rejection> + Clone {
    warp::patch()
        .map(|| true)
        .or(warp::put().map(|| false))
        .unify()
}

pub fn recipe_routes(
    pool: Pool<Sqlite>,
    keys: SessionKeys,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let session = with_session(pool.clone(), keys);

    let list = warp::path!("recipes")
        .and(warp::get())
        .and(session.clone())
        .and(warp::query::<RecipeFilterQuery>())
        .and(with_db(pool.clone()))
        .and_then(recipes::list_recipes);

    let create = warp::path!("recipes")
        .and(warp::post())
        .and(session.clone())
        .and(json_body())
        .and(with_db(pool.clone()))
        .and_then(recipes::create_recipe);

    let detail = warp::path!("recipes" / Id)
        .and(warp::get())
        .and(session.clone())
        .and(with_db(pool.clone()))
        .and_then(recipes::get_recipe);

    let update = warp::path!("recipes" / Id)
        .and(update_method())
        .and(session.clone())
        .and(raw_body())
        .and(with_db(pool.clone()))
        .and_then(recipes::update_recipe);

    let delete = warp::path!("recipes" / Id)
        .and(warp::delete())
        .and(session)
        .and(with_db(pool))
        .and_then(recipes::delete_recipe);

    list.or(create).or(detail).or(update).or(delete)
}

/// List, update and delete for tags or ingredients; neither has create or retrieve.
pub fn attribute_routes(
    kind: AttributeKind,
    pool: Pool<Sqlite>,
    keys: SessionKeys,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let session = with_session(pool.clone(), keys);
    let with_kind = warp::any().map(move || kind);

    let list = with_kind
        .clone()
        .and(warp::path(kind.table()))
        .and(warp::path::end())
        .and(warp::get())
        .and(session.clone())
        .and(warp::query::<AttributeFilterQuery>())
        .and(with_db(pool.clone()))
        .and_then(attributes::list_attributes);

    let update = with_kind
        .clone()
        .and(warp::path(kind.table()))
        .and(warp::path::param::<Id>())
        .and(warp::path::end())
        .and(update_method())
        .and(session.clone())
        .and(raw_body())
        .and(with_db(pool.clone()))
        .and_then(attributes::update_attribute);

    let delete = with_kind
        .and(warp::path(kind.table()))
        .and(warp::path::param::<Id>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(session)
        .and(with_db(pool))
        .and_then(attributes::delete_attribute);

    list.or(update).or(delete)
}

pub fn user_routes(
    pool: Pool<Sqlite>,
    keys: SessionKeys,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let session = with_session(pool.clone(), keys.clone());

    let create = warp::path!("user" / "create")
        .and(warp::post())
        .and(json_body())
        .and(with_db(pool.clone()))
        .and_then(users::create_user);

    let token = warp::path!("user" / "token")
        .and(warp::post())
        .and(json_body())
        .and(with_db(pool.clone()))
        .and(with_keys(keys))
        .and_then(users::create_token);

    let me = warp::path!("user" / "me")
        .and(warp::get())
        .and(session.clone())
        .and(with_db(pool.clone()))
        .and_then(users::get_me);

    let update_me = warp::path!("user" / "me")
        .and(update_method())
        .and(session)
        .and(json_body())
        .and(with_db(pool))
        .and_then(users::update_me);

    create.or(token).or(me).or(update_me)
}
