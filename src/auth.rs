//! Reading the signed-in user from the headers set by the identity provider.
//!
//! The app runs behind a reverse proxy that authenticates users and forwards
//! the user's ID in a request header. [owner_guard] rejects requests without
//! that header and hands the ID to handlers as an [OwnerId] extension.

use std::fmt::Display;

use axum::{
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_REQUEST;

use crate::{AppState, Error, endpoints};

/// The ID of the user that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner ID, or `None` if `id` is empty or only whitespace.
    pub fn new(id: &str) -> Option<Self> {
        let id = id.trim();

        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state needed for the owner middleware
#[derive(Debug, Clone)]
pub struct OwnerState {
    /// The request header that carries the signed-in user's ID.
    pub owner_header: HeaderName,
}

impl FromRef<AppState> for OwnerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            owner_header: state.owner_header.clone(),
        }
    }
}

/// Middleware that reads the owner ID from the configured header.
///
/// Requests without the header get a 401: a JSON body for API routes, an
/// alert for htmx requests and an error page otherwise.
///
/// **Note**: Route handlers can use the function argument `Extension(owner): Extension<OwnerId>` to receive the owner ID.
pub async fn owner_guard(
    State(state): State<OwnerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let owner = request
        .headers()
        .get(&state.owner_header)
        .and_then(|value| value.to_str().ok())
        .and_then(OwnerId::new);

    let Some(owner) = owner else {
        tracing::warn!(
            "Rejected {} {}: missing {} header",
            request.method(),
            request.uri(),
            state.owner_header
        );

        return if request.uri().path().starts_with(endpoints::API_PREFIX) {
            Error::MissingOwner.into_json_response("authenticate")
        } else if request.headers().contains_key(HX_REQUEST) {
            Error::MissingOwner.into_alert_response()
        } else {
            Error::MissingOwner.into_response()
        };
    };

    request.extensions_mut().insert(owner);

    next.run(request).await
}
