mod database {
    pub mod actions;
    pub mod connection;
    pub mod error;
    pub mod form;
    pub mod payload;
    pub mod schema;
}
mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
}
mod api {
    pub mod attributes;
    pub mod recipes;
    pub mod rejection;
    pub mod routes;
    pub mod users;
}
pub mod config;
mod constants;

pub use api::routes::api;
pub use authentication::*;
pub use constants::*;
pub use database::*;
