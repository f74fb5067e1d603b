//! Call aggregate root

use crate::domain::call::value_object::{CallState, EndReason};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, ClientId, EndpointId};
use crate::domain::smb::SmbEndpointDescription;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of a call a client is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallParty {
    Caller,
    Callee,
}

impl CallParty {
    pub fn hangup_reason(&self) -> EndReason {
        match self {
            CallParty::Caller => EndReason::CallerHangup,
            CallParty::Callee => EndReason::CalleeHangup,
        }
    }

    pub fn disconnect_reason(&self) -> EndReason {
        match self {
            CallParty::Caller => EndReason::CallerDisconnected,
            CallParty::Callee => EndReason::CalleeDisconnected,
        }
    }
}

/// Everything allocated on the bridge before a call is created
#[derive(Debug, Clone)]
pub struct NewCall {
    pub caller_id: ClientId,
    pub caller_name: String,
    pub callee_id: ClientId,
    pub conference_id: String,
    pub sfu_instance_url: String,
    pub caller_endpoint_id: EndpointId,
    pub callee_endpoint_id: EndpointId,
    pub caller_endpoint: SmbEndpointDescription,
    pub callee_endpoint: SmbEndpointDescription,
}

/// Call aggregate root
///
/// A directed session between two clients sharing one bridge conference.
/// Created in `Offering`, promoted to `Active` once both parties are ready,
/// and frozen once `Ended`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    id: CallId,
    caller_id: ClientId,
    caller_name: String,
    callee_id: ClientId,
    conference_id: String,
    sfu_instance_url: String,
    state: CallState,
    caller_endpoint_id: EndpointId,
    callee_endpoint_id: EndpointId,
    /// Bridge view of the caller endpoint
    caller_endpoint: SmbEndpointDescription,
    /// Bridge view of the callee endpoint
    callee_endpoint: SmbEndpointDescription,
    /// Description pushed to the bridge from the caller's answer
    caller_configured: Option<SmbEndpointDescription>,
    callee_configured: Option<SmbEndpointDescription>,
    caller_ready: bool,
    callee_ready: bool,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    end_reason: Option<EndReason>,
}

impl Call {
    /// Create a new call in the `Offering` state
    pub fn new(id: CallId, new_call: NewCall) -> Self {
        Self {
            id,
            caller_id: new_call.caller_id,
            caller_name: new_call.caller_name,
            callee_id: new_call.callee_id,
            conference_id: new_call.conference_id,
            sfu_instance_url: new_call.sfu_instance_url,
            state: CallState::Offering,
            caller_endpoint_id: new_call.caller_endpoint_id,
            callee_endpoint_id: new_call.callee_endpoint_id,
            caller_endpoint: new_call.caller_endpoint,
            callee_endpoint: new_call.callee_endpoint,
            caller_configured: None,
            callee_configured: None,
            caller_ready: false,
            callee_ready: false,
            created_at: Utc::now(),
            ended_at: None,
            end_reason: None,
        }
    }

    /// Side of the call the client is on, if any
    pub fn party_of(&self, client_id: &ClientId) -> Option<CallParty> {
        if *client_id == self.caller_id {
            Some(CallParty::Caller)
        } else if *client_id == self.callee_id {
            Some(CallParty::Callee)
        } else {
            None
        }
    }

    /// Require the client to be the given party
    pub fn authorize(&self, client_id: &ClientId, party: CallParty) -> Result<()> {
        match self.party_of(client_id) {
            Some(actual) if actual == party => Ok(()),
            _ => Err(DomainError::Unauthorized(format!(
                "Client {} is not the {} of call {}",
                client_id,
                match party {
                    CallParty::Caller => "caller",
                    CallParty::Callee => "callee",
                },
                self.id
            ))),
        }
    }

    /// Require the client to be either party
    pub fn authorize_participant(&self, client_id: &ClientId) -> Result<CallParty> {
        self.party_of(client_id).ok_or_else(|| {
            DomainError::Unauthorized(format!(
                "Client {} is not a participant of call {}",
                client_id, self.id
            ))
        })
    }

    pub fn ensure_not_ended(&self) -> Result<()> {
        if self.state.is_ended() {
            return Err(DomainError::Conflict(format!("Call {} has ended", self.id)));
        }
        Ok(())
    }

    /// Record the caller's configured endpoint
    pub fn mark_caller_ready(&mut self, endpoint: SmbEndpointDescription) -> Result<()> {
        self.ensure_not_ended()?;
        self.caller_configured = Some(endpoint);
        self.caller_ready = true;
        self.promote_if_ready()
    }

    /// Record the callee's configured endpoint
    pub fn mark_callee_ready(&mut self, endpoint: SmbEndpointDescription) -> Result<()> {
        self.ensure_not_ended()?;
        self.callee_configured = Some(endpoint);
        self.callee_ready = true;
        self.promote_if_ready()
    }

    fn promote_if_ready(&mut self) -> Result<()> {
        if self.caller_ready && self.callee_ready && self.state == CallState::Offering {
            self.transition_to(CallState::Active)?;
        }
        Ok(())
    }

    /// End the call
    pub fn end(&mut self, reason: EndReason) -> Result<()> {
        self.transition_to(CallState::Ended)?;
        self.ended_at = Some(Utc::now());
        self.end_reason = Some(reason);
        Ok(())
    }

    fn transition_to(&mut self, new_state: CallState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot transition from {:?} to {:?}",
                self.state, new_state
            )));
        }

        self.state = new_state;
        Ok(())
    }

    // Getters
    pub fn id(&self) -> &CallId {
        &self.id
    }

    pub fn caller_id(&self) -> &ClientId {
        &self.caller_id
    }

    pub fn caller_name(&self) -> &str {
        &self.caller_name
    }

    pub fn callee_id(&self) -> &ClientId {
        &self.callee_id
    }

    pub fn conference_id(&self) -> &str {
        &self.conference_id
    }

    pub fn sfu_instance_url(&self) -> &str {
        &self.sfu_instance_url
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn endpoint_id(&self, party: CallParty) -> &EndpointId {
        match party {
            CallParty::Caller => &self.caller_endpoint_id,
            CallParty::Callee => &self.callee_endpoint_id,
        }
    }

    /// Endpoint as allocated; offers are always built from this
    pub fn endpoint(&self, party: CallParty) -> &SmbEndpointDescription {
        match party {
            CallParty::Caller => &self.caller_endpoint,
            CallParty::Callee => &self.callee_endpoint,
        }
    }

    pub fn configured(&self, party: CallParty) -> Option<&SmbEndpointDescription> {
        match party {
            CallParty::Caller => self.caller_configured.as_ref(),
            CallParty::Callee => self.callee_configured.as_ref(),
        }
    }

    pub fn caller_ready(&self) -> bool {
        self.caller_ready
    }

    pub fn callee_ready(&self) -> bool {
        self.callee_ready
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn ended_at(&self) -> Option<&DateTime<Utc>> {
        self.ended_at.as_ref()
    }

    pub fn end_reason(&self) -> Option<&EndReason> {
        self.end_reason.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }
}
