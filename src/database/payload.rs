use serde::Deserialize;
use serde_json::Value;

use super::{
    error::{TypeError, ValidationErrors},
    form::{char_field, email_field, integer_field, password_field, Form},
    schema::{Id, Price},
};
use crate::constants::{
    ATTRIBUTE_NAME_MAX_LENGTH, LINK_MAX_LENGTH, PASSWORD_MIN_LENGTH, TITLE_MAX_LENGTH,
    USER_NAME_MAX_LENGTH,
};

/// Writable recipe fields. `None` means the field was not submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipePayload {
    /// With `partial` unset, title, time_minutes and price are required.
    pub fn parse(form: &Form, partial: bool) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = errors
            .collect(
                "title",
                form.get_field("title", partial, char_field(TITLE_MAX_LENGTH, false)),
            )
            .flatten();
        let time_minutes = errors
            .collect("time_minutes", form.get_field("time_minutes", partial, integer_field))
            .flatten();
        let price = errors
            .collect("price", form.get_field("price", partial, Price::try_from))
            .flatten();
        let link = errors
            .collect(
                "link",
                form.get_optional("link", char_field(LINK_MAX_LENGTH, true)),
            )
            .flatten();
        let description = errors
            .collect(
                "description",
                form.get_optional("description", char_field(usize::MAX, true)),
            )
            .flatten();
        let tags = parse_name_list(form, "tags", &mut errors);
        let ingredients = parse_name_list(form, "ingredients", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            title,
            time_minutes,
            price,
            link,
            description,
            tags,
            ingredients,
        })
    }
}

/// Parses `[{"name": ...}, ...]`, keying nested messages as `key[index].name`.
fn parse_name_list(form: &Form, key: &str, errors: &mut ValidationErrors) -> Option<Vec<String>> {
    let items = match form.get_optional(key, list_field) {
        Ok(items) => items?,
        Err(e) => {
            errors.add(key, e);
            return None;
        }
    };

    let name = char_field(ATTRIBUTE_NAME_MAX_LENGTH, false);
    let mut names = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let item = match item {
            Value::Object(item) => Form::from_data(item.into_iter().collect()),
            other => {
                errors.add(
                    &format!("{key}[{index}]"),
                    TypeError::new(&format!(
                        "Invalid data. Expected a dictionary, but got {}.",
                        json_type_name(&other)
                    )),
                );
                continue;
            }
        };

        if let Some(value) = errors.collect(&format!("{key}[{index}].name"), item.get_value("name", &name)) {
            names.push(value);
        }
    }

    Some(names)
}

fn list_field(value: Value) -> Result<Vec<Value>, TypeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(TypeError::new(&format!(
            "Expected a list of items but got type \"{}\".",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Writable tag or ingredient fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePayload {
    pub name: Option<String>,
}

impl AttributePayload {
    pub fn parse(form: &Form, partial: bool) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors
            .collect(
                "name",
                form.get_field("name", partial, char_field(ATTRIBUTE_NAME_MAX_LENGTH, false)),
            )
            .flatten();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self { name })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl UserPayload {
    /// With `partial` unset, email and password are required; name never is.
    pub fn parse(form: &Form, partial: bool) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = errors
            .collect("email", form.get_field("email", partial, email_field))
            .flatten();
        let password = errors
            .collect(
                "password",
                form.get_field("password", partial, password_field(PASSWORD_MIN_LENGTH)),
            )
            .flatten();
        let name = errors
            .collect(
                "name",
                form.get_optional("name", char_field(USER_NAME_MAX_LENGTH, true)),
            )
            .flatten();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            email,
            password,
            name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn parse(form: &Form) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = errors.collect(
            "email",
            form.get_value("email", |value: Value| {
                email_field(value.clone()).or_else(|_| char_field(255, false)(value))
            }),
        );
        let password = errors.collect("password", form.get_value("password", password_field(1)));

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Self { email, password }),
            _ => Err(errors),
        }
    }
}

/// Query parameters of the recipe list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilterQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<Id>>,
    pub ingredients: Option<Vec<Id>>,
}

impl RecipeFilter {
    pub fn parse(query: &RecipeFilterQuery) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let tags = query
            .tags
            .as_deref()
            .and_then(|ids| errors.collect("tags", parse_id_list(ids)));
        let ingredients = query
            .ingredients
            .as_deref()
            .and_then(|ids| errors.collect("ingredients", parse_id_list(ids)));

        errors.is_empty().then_some(Self { tags, ingredients }).ok_or(errors)
    }
}

fn parse_id_list(ids: &str) -> Result<Vec<Id>, TypeError> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<Id>()
                .map_err(|_| TypeError::new(&format!("\"{id}\" is not a valid id.")))
        })
        .collect()
}

/// Query parameters of the tag and ingredient list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeFilterQuery {
    pub assigned_only: Option<String>,
}

impl AttributeFilterQuery {
    pub fn assigned_only(&self) -> bool {
        matches!(
            self.assigned_only.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("True")
        )
    }
}
