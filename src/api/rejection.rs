use std::convert::Infallible;

use log::{debug, error};
use warp::{
    filters::body::BodyDeserializeError,
    http::StatusCode,
    reject::{
        InvalidQuery, LengthRequired, MethodNotAllowed, PayloadTooLarge, Rejection,
        UnsupportedMediaType,
    },
    reply::Response,
};

use crate::database::error::{detail_response, ApiError};

/// Renders every rejection that escapes the route tree as a JSON error body.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(e) = err.find::<ApiError>() {
        debug!("{e}");
        return Ok(e.render());
    }

    let response = if err.is_not_found() {
        detail_response(StatusCode::NOT_FOUND, "Not found.")
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        ApiError::MalformedBody(e.to_string()).render()
    } else if let Some(e) = err.find::<InvalidQuery>() {
        detail_response(StatusCode::BAD_REQUEST, &e.to_string())
    } else if err.find::<PayloadTooLarge>().is_some() {
        detail_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large.")
    } else if err.find::<LengthRequired>().is_some() {
        detail_response(StatusCode::LENGTH_REQUIRED, "Content-Length is required.")
    } else if err.find::<UnsupportedMediaType>().is_some() {
        detail_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported media type in request.",
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    } else {
        error!("Unhandled rejection: {err:?}");
        detail_response(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.")
    };

    Ok(response)
}
