//! The page shown when a request arrives without a signed-in user.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub struct UnauthorizedError;

impl IntoResponse for UnauthorizedError {
    fn into_response(self) -> Response {
        let page = error_view(
            "Unauthorized",
            "401",
            "You are not signed in.",
            "Sign in through your identity provider and try again.",
        );

        (StatusCode::UNAUTHORIZED, Html(page.into_string())).into_response()
    }
}
