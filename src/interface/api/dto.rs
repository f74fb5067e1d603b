//! API DTOs (Data Transfer Objects)

use crate::domain::call::{Call, CallState};
use crate::domain::client::Client;
use crate::domain::line::Line;
use crate::domain::shared::value_objects::{CallId, ClientId, LineId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Register client request
#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    /// Generated when omitted
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: ClientId,
    pub name: String,
    pub online: bool,
    pub registered_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            online: client.online,
            registered_at: client.registered_at,
        }
    }
}

/// Create line request
#[derive(Debug, Deserialize)]
pub struct CreateLineRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineResponse {
    pub id: LineId,
    pub name: String,
    pub smb_conference_id: Option<String>,
}

impl From<Line> for LineResponse {
    fn from(line: Line) -> Self {
        let smb_conference_id = line.has_conference().then(|| line.smb_conference_id.clone());
        Self {
            id: line.id,
            name: line.name,
            smb_conference_id,
        }
    }
}

/// Start call request
#[derive(Debug, Deserialize)]
pub struct InitiateCallRequest {
    pub callee_id: String,
    /// Defaults to the caller's registered name
    pub caller_name: Option<String>,
}

/// SDP answer submitted by either party
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub sdp: String,
}

/// Optional hangup reason
#[derive(Debug, Default, Deserialize)]
pub struct EndCallRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    pub id: CallId,
    pub caller_id: ClientId,
    pub caller_name: String,
    pub callee_id: ClientId,
    pub state: CallState,
    pub conference_id: String,
    pub sfu_instance_url: String,
    pub caller_ready: bool,
    pub callee_ready: bool,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<String>,
}

impl From<&Call> for CallResponse {
    fn from(call: &Call) -> Self {
        Self {
            id: *call.id(),
            caller_id: call.caller_id().clone(),
            caller_name: call.caller_name().to_string(),
            callee_id: call.callee_id().clone(),
            state: call.state(),
            conference_id: call.conference_id().to_string(),
            sfu_instance_url: call.sfu_instance_url().to_string(),
            caller_ready: call.caller_ready(),
            callee_ready: call.callee_ready(),
            created_at: *call.created_at(),
            ended_at: call.ended_at().copied(),
            end_reason: call.end_reason().map(|r| r.as_str().to_string()),
        }
    }
}

/// Call plus the SDP offer the client has to answer
#[derive(Debug, Serialize, Deserialize)]
pub struct CallOfferResponse {
    pub call: CallResponse,
    pub sdp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallListResponse {
    pub calls: Vec<CallResponse>,
    pub total: usize,
}
