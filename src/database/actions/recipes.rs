use log::info;
use sqlx::{Pool, QueryBuilder, Sqlite};

use super::attributes::{list_linked_attributes, list_recipe_attributes, set_recipe_attributes};
use crate::database::{
    error::{ApiError, TypeError, ValidationErrors},
    payload::{RecipeFilter, RecipePayload},
    schema::{AttributeKind, Id, Recipe, RecipeDetail, RecipeRow},
};

/// The owner's recipes, newest first, in the compact shape.
pub async fn fetch_recipes(
    user_id: Id,
    filter: &RecipeFilter,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeRow>, ApiError> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT r.* FROM recipes r WHERE r.user_id = ");
    query.push_bind(user_id);

    for (kind, ids) in [
        (AttributeKind::Tag, &filter.tags),
        (AttributeKind::Ingredient, &filter.ingredients),
    ] {
        let Some(ids) = ids.as_ref().filter(|ids| !ids.is_empty()) else {
            continue;
        };

        query.push(format!(
            " AND EXISTS (SELECT 1 FROM {} l WHERE l.recipe_id = r.id AND l.{} IN (",
            kind.link_table(),
            kind.link_column()
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated("))");
    }
    query.push(" ORDER BY r.id DESC");

    let recipes: Vec<Recipe> = query.build_query_as().fetch_all(pool).await?;

    let ids: Vec<Id> = recipes.iter().map(|recipe| recipe.id).collect();
    let mut tags = list_linked_attributes(AttributeKind::Tag, &ids, pool).await?;
    let mut ingredients = list_linked_attributes(AttributeKind::Ingredient, &ids, pool).await?;

    let rows = recipes
        .iter()
        .map(|recipe| {
            RecipeRow::from_parts(
                recipe,
                tags.remove(&recipe.id).unwrap_or_default(),
                ingredients.remove(&recipe.id).unwrap_or_default(),
            )
        })
        .collect();

    Ok(rows)
}

pub async fn get_recipe(
    id: Id,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Option<Recipe>, ApiError> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_recipe_detail(
    id: Id,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<RecipeDetail, ApiError> {
    let recipe = get_recipe(id, user_id, pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    let tags = list_recipe_attributes(AttributeKind::Tag, recipe.id, pool).await?;
    let ingredients = list_recipe_attributes(AttributeKind::Ingredient, recipe.id, pool).await?;

    Ok(RecipeDetail {
        row: RecipeRow::from_parts(&recipe, tags, ingredients),
        description: recipe.description,
    })
}

/// Creates a recipe owned by `user_id`, resolving its tags and ingredients by name.
pub async fn create_recipe(
    user_id: Id,
    payload: RecipePayload,
    pool: &Pool<Sqlite>,
) -> Result<RecipeDetail, ApiError> {
    let mut errors = ValidationErrors::new();
    let title = errors.collect("title", payload.title.ok_or_else(TypeError::required));
    let time_minutes = errors.collect(
        "time_minutes",
        payload.time_minutes.ok_or_else(TypeError::required),
    );
    let price = errors.collect("price", payload.price.ok_or_else(TypeError::required));
    let (Some(title), Some(time_minutes), Some(price)) = (title, time_minutes, price) else {
        return Err(errors.into());
    };

    let mut tr = pool.begin().await?;

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, title, time_minutes, price, link, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ",
    )
    .bind(user_id)
    .bind(title)
    .bind(time_minutes)
    .bind(price)
    .bind(payload.link.unwrap_or_default())
    .bind(payload.description.unwrap_or_default())
    .fetch_one(&mut *tr)
    .await?;

    let recipe_id = id.0;
    for (kind, names) in [
        (AttributeKind::Tag, payload.tags),
        (AttributeKind::Ingredient, payload.ingredients),
    ] {
        if let Some(names) = names {
            set_recipe_attributes(kind, recipe_id, user_id, &names, &mut *tr).await?;
        }
    }

    tr.commit().await?;
    info!("Created recipe {recipe_id} for user {user_id}");

    get_recipe_detail(recipe_id, user_id, pool).await
}

/// Overwrites the submitted fields. A submitted `tags` or `ingredients` list,
/// even an empty one, replaces that association set wholesale.
///
/// The ownership check is the transaction's first statement and a write, so
/// the write lock is taken up front and overlapping updates wait for it.
pub async fn update_recipe(
    id: Id,
    user_id: Id,
    payload: RecipePayload,
    pool: &Pool<Sqlite>,
) -> Result<RecipeDetail, ApiError> {
    let mut tr = pool.begin().await?;

    let recipe: Recipe = sqlx::query_as(
        "
        UPDATE recipes
        SET title = COALESCE($1, title),
            time_minutes = COALESCE($2, time_minutes),
            price = COALESCE($3, price),
            link = COALESCE($4, link),
            description = COALESCE($5, description)
        WHERE id = $6 AND user_id = $7
        RETURNING *
    ",
    )
    .bind(payload.title)
    .bind(payload.time_minutes)
    .bind(payload.price)
    .bind(payload.link)
    .bind(payload.description)
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tr)
    .await?
    .ok_or(ApiError::NotFound)?;

    for (kind, names) in [
        (AttributeKind::Tag, payload.tags),
        (AttributeKind::Ingredient, payload.ingredients),
    ] {
        if let Some(names) = names {
            set_recipe_attributes(kind, recipe.id, user_id, &names, &mut *tr).await?;
        }
    }

    tr.commit().await?;

    get_recipe_detail(recipe.id, user_id, pool).await
}

pub async fn delete_recipe(id: Id, user_id: Id, pool: &Pool<Sqlite>) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }

    info!("Deleted recipe {id} for user {user_id}");
    Ok(())
}
