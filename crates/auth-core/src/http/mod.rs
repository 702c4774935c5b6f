//! The trivial HTTP adapter in front of the authentication core (spec §6).
//!
//! Routing mechanics, CORS, and request-ID generation mechanics are out of
//! scope for the core's own testable behavior — this module exists only to
//! expose the three endpoints the spec names and to honor the request-ID
//! contract (every response carries the same opaque ID the logger used).

pub mod error;
pub mod revoke;
pub mod state;
pub mod token;
pub mod validate;

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use state::AppState;

/// Gateway-supplied resource URL header consulted by `/validate`.
pub const RESOURCE_HEADER: &str = "x-forwarded-for";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// An opaque per-request identifier, propagated to logs and error bodies.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Extracts the bearer credential from `Authorization: Bearer <token>`.
/// `None` for a missing header, a non-Bearer scheme, or an empty token.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Builds the three-endpoint router (spec §6).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/token", post(token::token_handler))
        .route("/validate", post(validate::validate_handler))
        .route("/revoke", post(revoke::revoke_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
