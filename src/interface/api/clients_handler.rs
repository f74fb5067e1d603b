//! Client registry API handlers

use super::dto::{ApiResponse, ClientResponse, RegisterClientRequest};
use super::state::AppState;
use crate::domain::client::Client;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::ClientId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

/// Register (or re-register) a client as online
pub async fn register_client(
    State(state): State<AppState>,
    Json(req): Json<RegisterClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponse>>), DomainError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Client name must not be empty"));
    }
    let id = match req.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => ClientId::from(id),
        _ => ClientId::generate(),
    };

    let client = Client::new(id, name);
    state.clients.save(&client).await?;
    info!("API: Registered client {} ({})", client.id, client.name);

    Ok((StatusCode::CREATED, Json(ApiResponse::success(client.into()))))
}

pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ClientResponse>>>, DomainError> {
    let clients = state.clients.list().await?;
    Ok(Json(ApiResponse::success(
        clients.into_iter().map(ClientResponse::from).collect(),
    )))
}

/// Mark a client offline and end every call it is still on
pub async fn disconnect_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ClientResponse>>, DomainError> {
    let client_id = ClientId::from(id.as_str());
    let client = state.clients.set_online(&client_id, false).await?;

    let calls = state.calls.get_active_calls_for_client(&client_id).await?;
    for call in &calls {
        state.calls.end_call_due_to_disconnect(call.id(), &client_id).await;
    }
    info!(
        "API: Client {} disconnected, ended {} call(s)",
        client_id,
        calls.len()
    );

    Ok(Json(ApiResponse::success(client.into())))
}
