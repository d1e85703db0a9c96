use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use log::error;
use serde::Serialize;
use thiserror::Error;
use warp::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    reject::{Reject, Rejection},
    reply::Response,
    Reply,
};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }

    pub fn required() -> Self {
        Self::new("This field is required.")
    }

    pub fn null() -> Self {
        Self::new("This field may not be null.")
    }

    pub fn blank() -> Self {
        Self::new("This field may not be blank.")
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info)
    }
}

impl std::error::Error for TypeError {}

/// Field name to messages, rendered as the body of a 400 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, TypeError::new(message));
        errors
    }

    pub fn add(&mut self, field: &str, error: TypeError) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(error.info);
    }

    /// Keeps the value when it parsed, records the message under `field` otherwise.
    pub fn collect<T>(&mut self, field: &str, result: Result<T, TypeError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "Invalid fields: {}", fields.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Not found.")]
    NotFound,

    #[error("JSON parse error - {0}")]
    MalformedBody(String),

    #[error("Database error: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Reject for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(e) => Self::Query(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::Query(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::Query(String::from("Pool closed")),
            e => Self::Query(format!("{e}")),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

#[derive(Serialize)]
struct Detail<'a> {
    detail: &'a str,
}

pub fn detail_response(status: StatusCode, detail: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&Detail { detail }), status).into_response()
}

impl ApiError {
    /// Turns a unique-constraint violation into a validation message on `field`.
    pub fn unique_violation(field: &'static str, message: String) -> impl FnOnce(sqlx::Error) -> Self {
        move |e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Validation(ValidationErrors::single(field, &message))
            }
            _ => Self::from(e),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Query(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn render(&self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => {
                warp::reply::with_status(warp::reply::json(errors), status).into_response()
            }
            ApiError::AuthenticationRequired | ApiError::InvalidToken => {
                let mut response = detail_response(status, &self.to_string());
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Query(e) | ApiError::Internal(e) => {
                error!("{e}");
                detail_response(status, "A server error occurred.")
            }
            _ => detail_response(status, &self.to_string()),
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        self.render()
    }
}

pub fn reject<E: Into<ApiError>>(error: E) -> Rejection {
    warp::reject::custom(error.into())
}
