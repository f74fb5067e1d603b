//! Call signaling API handlers
//!
//! Every call operation acts on behalf of the client named in the
//! `x-client-id` header.

use super::dto::{
    AnswerRequest, ApiResponse, CallListResponse, CallOfferResponse, CallResponse,
    EndCallRequest, InitiateCallRequest,
};
use super::error::ActingClient;
use super::state::AppState;
use crate::domain::call::EndReason;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::{CallId, ClientId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

fn parse_call_id(id: &str) -> Result<CallId, DomainError> {
    CallId::parse(id).ok_or_else(|| DomainError::not_found(format!("Call {}", id)))
}

/// Start a call; the response carries the caller's offer
pub async fn initiate_call(
    State(state): State<AppState>,
    ActingClient(caller_id): ActingClient,
    Json(req): Json<InitiateCallRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CallOfferResponse>>), DomainError> {
    let caller_name = match req.caller_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => state
            .clients
            .find_by_id(&caller_id)
            .await?
            .map(|client| client.name)
            .unwrap_or_else(|| caller_id.to_string()),
    };
    let callee_id = ClientId::from(req.callee_id.as_str());

    let initiated = state
        .calls
        .initiate_call(&caller_id, &caller_name, &callee_id)
        .await?;
    info!("API: {} is calling {} ({})", caller_id, callee_id, initiated.call.id());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CallOfferResponse {
            call: CallResponse::from(&initiated.call),
            sdp: initiated.offer_sdp,
        })),
    ))
}

/// Calls the acting client is on and that have not ended
pub async fn list_calls(
    State(state): State<AppState>,
    ActingClient(client_id): ActingClient,
) -> Result<Json<ApiResponse<CallListResponse>>, DomainError> {
    let calls: Vec<CallResponse> = state
        .calls
        .get_active_calls_for_client(&client_id)
        .await?
        .iter()
        .map(CallResponse::from)
        .collect();
    let total = calls.len();
    Ok(Json(ApiResponse::success(CallListResponse { calls, total })))
}

pub async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CallResponse>>, DomainError> {
    let call = state.calls.get_call(&parse_call_id(&id)?).await?;
    Ok(Json(ApiResponse::success(CallResponse::from(&call))))
}

pub async fn caller_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ActingClient(client_id): ActingClient,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ApiResponse<CallResponse>>, DomainError> {
    let call = state
        .calls
        .complete_caller_signaling(&parse_call_id(&id)?, &client_id, &req.sdp)
        .await?;
    Ok(Json(ApiResponse::success(CallResponse::from(&call))))
}

/// Fetch the offer for the callee's endpoint
pub async fn join_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ActingClient(client_id): ActingClient,
) -> Result<Json<ApiResponse<CallOfferResponse>>, DomainError> {
    let (call, sdp) = state.calls.join_call(&parse_call_id(&id)?, &client_id).await?;
    Ok(Json(ApiResponse::success(CallOfferResponse {
        call: CallResponse::from(&call),
        sdp,
    })))
}

pub async fn callee_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ActingClient(client_id): ActingClient,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ApiResponse<CallResponse>>, DomainError> {
    let call = state
        .calls
        .complete_callee_signaling(&parse_call_id(&id)?, &client_id, &req.sdp)
        .await?;
    Ok(Json(ApiResponse::success(CallResponse::from(&call))))
}

/// Hang up; an optional JSON body may carry the reason
pub async fn end_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ActingClient(client_id): ActingClient,
    body: Option<Json<EndCallRequest>>,
) -> Result<Json<ApiResponse<CallResponse>>, DomainError> {
    let reason = body
        .and_then(|Json(req)| req.reason)
        .map(|reason| EndReason::from_string(&reason));
    let call = state
        .calls
        .end_call(&parse_call_id(&id)?, &client_id, reason)
        .await?;
    info!("API: Call {} ended by {}", call.id(), client_id);
    Ok(Json(ApiResponse::success(CallResponse::from(&call))))
}
