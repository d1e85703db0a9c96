use std::collections::HashMap;

use log::debug;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::database::{
    error::ApiError,
    payload::AttributePayload,
    schema::{Attribute, AttributeKind, Id, LinkedAttribute},
};

pub async fn list_attributes(
    kind: AttributeKind,
    user_id: Id,
    assigned_only: bool,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Attribute>, ApiError> {
    let assigned = if assigned_only {
        format!(
            "AND EXISTS (SELECT 1 FROM {} l WHERE l.{} = a.id)",
            kind.link_table(),
            kind.link_column()
        )
    } else {
        String::new()
    };

    let rows: Vec<Attribute> = sqlx::query_as(&format!(
        "SELECT a.id, a.name FROM {} a WHERE a.user_id = $1 {assigned} ORDER BY a.name DESC",
        kind.table()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_attribute(
    kind: AttributeKind,
    id: Id,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Option<Attribute>, ApiError> {
    let row: Option<Attribute> = sqlx::query_as(&format!(
        "SELECT id, name FROM {} WHERE id = $1 AND user_id = $2",
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Renames an owned tag or ingredient. Entities of other users are not found.
pub async fn update_attribute(
    kind: AttributeKind,
    id: Id,
    user_id: Id,
    payload: AttributePayload,
    pool: &Pool<Sqlite>,
) -> Result<Attribute, ApiError> {
    let mut attribute = get_attribute(kind, id, user_id, pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(name) = payload.name {
        sqlx::query(&format!(
            "UPDATE {} SET name = $1 WHERE id = $2 AND user_id = $3",
            kind.table()
        ))
        .bind(&name)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(ApiError::unique_violation(
            "name",
            format!("{} with this name already exists.", kind.label()),
        ))?;

        attribute.name = name;
    }

    Ok(attribute)
}

/// Deletes an owned tag or ingredient along with its recipe associations.
pub async fn delete_attribute(
    kind: AttributeKind,
    id: Id,
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), ApiError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE id = $1 AND user_id = $2",
        kind.table()
    ))
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(())
}

/// Resolves `name` to the owner's existing entity, creating it when missing.
pub async fn get_or_create_attribute(
    kind: AttributeKind,
    user_id: Id,
    name: &str,
    conn: &mut SqliteConnection,
) -> Result<Id, ApiError> {
    let created = sqlx::query(&format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2) ON CONFLICT (user_id, name) DO NOTHING",
        kind.table()
    ))
    .bind(user_id)
    .bind(name)
    .execute(&mut *conn)
    .await?;

    if created.rows_affected() > 0 {
        debug!("Created {} {name:?} for user {user_id}", kind.label());
    }

    let id: (Id,) = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE user_id = $1 AND name = $2",
        kind.table()
    ))
    .bind(user_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id.0)
}

/// Replaces the recipe's associations of `kind` with the resolved `names`.
/// Entities that lose their last association are kept.
pub async fn set_recipe_attributes(
    kind: AttributeKind,
    recipe_id: Id,
    user_id: Id,
    names: &[String],
    conn: &mut SqliteConnection,
) -> Result<(), ApiError> {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE recipe_id = $1",
        kind.link_table()
    ))
    .bind(recipe_id)
    .execute(&mut *conn)
    .await?;

    for name in names {
        let attribute_id = get_or_create_attribute(kind, user_id, name, conn).await?;

        sqlx::query(&format!(
            "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.link_table(),
            kind.link_column()
        ))
        .bind(recipe_id)
        .bind(attribute_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn list_recipe_attributes(
    kind: AttributeKind,
    recipe_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Attribute>, ApiError> {
    let rows: Vec<Attribute> = sqlx::query_as(&format!(
        "
        SELECT a.id AS id, a.name AS name
        FROM {link} l
        INNER JOIN {table} a ON a.id = l.{column}
        WHERE l.recipe_id = $1
        ORDER BY a.id
    ",
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column()
    ))
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The associations of `kind` for `recipe_ids`, grouped by recipe.
pub async fn list_linked_attributes(
    kind: AttributeKind,
    recipe_ids: &[Id],
    pool: &Pool<Sqlite>,
) -> Result<HashMap<Id, Vec<Attribute>>, ApiError> {
    let mut linked: HashMap<Id, Vec<Attribute>> = HashMap::new();
    if recipe_ids.is_empty() {
        return Ok(linked);
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "
        SELECT l.recipe_id AS recipe_id, a.id AS id, a.name AS name
        FROM {link} l
        INNER JOIN {table} a ON a.id = l.{column}
        WHERE l.recipe_id IN (",
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column()
    ));
    let mut separated = query.separated(", ");
    for id in recipe_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY a.id");

    let rows: Vec<LinkedAttribute> = query.build_query_as().fetch_all(pool).await?;

    for row in rows {
        linked.entry(row.recipe_id).or_default().push(Attribute {
            id: row.id,
            name: row.name,
        });
    }

    Ok(linked)
}
