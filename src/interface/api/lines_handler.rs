//! Line and WHIP ingest API handlers

use super::dto::{ApiResponse, CreateLineRequest, LineResponse};
use super::state::AppState;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::LineId;
use crate::domain::smb::ConferenceEndpointState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

const SDP_CONTENT_TYPE: &str = "application/sdp";

fn parse_line_id(id: &str) -> Result<LineId, DomainError> {
    LineId::parse(id).ok_or_else(|| DomainError::not_found(format!("Line {}", id)))
}

pub async fn create_line(
    State(state): State<AppState>,
    Json(req): Json<CreateLineRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LineResponse>>), DomainError> {
    let line = state.lines.create_line(&req.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(line.into()))))
}

pub async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LineResponse>>, DomainError> {
    let line = state.lines.get_line(&parse_line_id(&id)?).await?;
    Ok(Json(ApiResponse::success(line.into())))
}

pub async fn get_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ConferenceEndpointState>>>, DomainError> {
    let participants = state.lines.participants(&parse_line_id(&id)?).await?;
    Ok(Json(ApiResponse::success(participants)))
}

/// WHIP publish into a line; body and answer are raw SDP
pub async fn whip_ingest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, DomainError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with(SDP_CONTENT_TYPE) {
        return Err(DomainError::validation(format!(
            "Expected {} body, got '{}'",
            SDP_CONTENT_TYPE, content_type
        )));
    }

    let line_id = parse_line_id(&id)?;
    let session = state.lines.ingest(&line_id, &body).await?;
    info!("API: WHIP endpoint {} created on line {}", session.endpoint_id, line_id);

    let location = format!("/whip/lines/{}/{}", line_id, session.endpoint_id);
    Ok((
        StatusCode::CREATED,
        [
            (header::CONTENT_TYPE, SDP_CONTENT_TYPE.to_string()),
            (header::LOCATION, location),
        ],
        session.answer_sdp,
    )
        .into_response())
}
