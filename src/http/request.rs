//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for requests arriving
//!   without one
//! - Make the ID available to log correlation across the pipeline
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost middleware layer)
//! - The ID is propagated onto the response so clients can report it

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Canonical request id header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Mints a UUID v4 request id.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}
