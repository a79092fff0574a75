pub mod authors;
pub mod books;
pub mod errors;
pub mod index;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// A `302 Found` redirect, as browsers expect after a form submission.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
