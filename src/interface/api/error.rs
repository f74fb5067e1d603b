//! HTTP mapping of domain errors and the acting-client extractor

use super::dto::ApiResponse;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::ClientId;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

pub const CLIENT_ID_HEADER: &str = "x-client-id";

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Conflict(_) | DomainError::InvalidStateTransition(_) => StatusCode::CONFLICT,
            DomainError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("API: {}", self);
        } else {
            warn!("API: {}", self);
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

/// Client on whose behalf a request is made, taken from `x-client-id`
#[derive(Debug, Clone)]
pub struct ActingClient(pub ClientId);

#[async_trait]
impl<S> FromRequestParts<S> for ActingClient
where
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ActingClient(ClientId::from(value)))
            .ok_or_else(|| DomainError::Unauthorized(format!("Missing {} header", CLIENT_ID_HEADER)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(DomainError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            DomainError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DomainError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(DomainError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DomainError::Upstream { status: 500, body: String::new() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
