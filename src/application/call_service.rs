//! Call orchestration
//!
//! Drives a call from `offering` to `active` to `ended`: allocates the
//! conference and both endpoints on the least-loaded bridge, negotiates each
//! party's SDP and tears everything down on hangup, disconnect or join
//! timeout.

use crate::application::sdp::{EndpointLocation, MediaStreamDescriptor, SdpEngine};
use crate::application::sfu_router::{SfuReservation, SfuRouter};
use crate::domain::call::{Call, CallParty, CallRepository, CallState, EndReason, NewCall};
use crate::domain::client::ClientRepository;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, ClientId, EndpointId};
use crate::domain::smb::{RelayType, SmbClient, SmbEndpointDescription};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

/// Tunables of the orchestrator
#[derive(Debug, Clone)]
pub struct CallSettings {
    /// How long the callee has to complete signaling
    pub join_timeout: Duration,
    /// Idle timeout requested for every allocated endpoint
    pub endpoint_idle_timeout_secs: u32,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            join_timeout: Duration::from_secs(30),
            endpoint_idle_timeout_secs: 60,
        }
    }
}

/// A new call and the offer its caller has to answer
#[derive(Debug, Clone)]
pub struct InitiatedCall {
    pub call: Call,
    pub offer_sdp: String,
}

/// Conference and endpoints allocated for one call
struct Allocation {
    conference_id: String,
    caller_endpoint_id: EndpointId,
    callee_endpoint_id: EndpointId,
    caller_endpoint: SmbEndpointDescription,
    callee_endpoint: SmbEndpointDescription,
}

struct Inner {
    calls: Arc<dyn CallRepository>,
    clients: Arc<dyn ClientRepository>,
    smb: Arc<dyn SmbClient>,
    sdp: SdpEngine,
    router: Arc<SfuRouter>,
    settings: CallSettings,
    timeouts: Mutex<HashMap<CallId, AbortHandle>>,
    locks: Mutex<HashMap<CallId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Call orchestrator
#[derive(Clone)]
pub struct CallService {
    inner: Arc<Inner>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive hold on one call; the map entry is dropped with its last holder
struct CallLock {
    inner: Arc<Inner>,
    call_id: CallId,
    held: OwnedMutexGuard<()>,
}

impl Drop for CallLock {
    fn drop(&mut self) {
        let mut locks = guard(&self.inner.locks);
        let mutex = OwnedMutexGuard::mutex(&self.held);
        // Only the map and this guard still reference the mutex
        if Arc::strong_count(mutex) == 2 {
            locks.remove(&self.call_id);
        }
    }
}

/// Streams advertised in an endpoint's offer, one per bridge SSRC
fn audio_streams(endpoint_id: &EndpointId, endpoint: &SmbEndpointDescription) -> Result<Vec<MediaStreamDescriptor>> {
    let ssrcs = &endpoint.audio()?.ssrcs;
    Ok(ssrcs
        .iter()
        .enumerate()
        .map(|(index, &ssrc)| {
            if index == 0 {
                MediaStreamDescriptor::for_endpoint(endpoint_id.as_str(), ssrc)
            } else {
                MediaStreamDescriptor::for_endpoint(&format!("{}-{}", endpoint_id, index), ssrc)
            }
        })
        .collect())
}

impl CallService {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        clients: Arc<dyn ClientRepository>,
        smb: Arc<dyn SmbClient>,
        router: Arc<SfuRouter>,
        settings: CallSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                calls,
                clients,
                sdp: SdpEngine::new(smb.clone()),
                smb,
                router,
                settings,
                timeouts: Mutex::new(HashMap::new()),
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start a call from `caller_id` to `callee_id`
    pub async fn initiate_call(
        &self,
        caller_id: &ClientId,
        caller_name: &str,
        callee_id: &ClientId,
    ) -> Result<InitiatedCall> {
        if caller_id == callee_id {
            return Err(DomainError::Conflict("A client cannot call itself".to_string()));
        }
        let callee = self
            .inner
            .clients
            .find_by_id(callee_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Client {}", callee_id)))?;
        if !callee.online {
            return Err(DomainError::Conflict(format!("Client {} is offline", callee_id)));
        }

        let reservation = self.inner.router.reserve()?;
        let allocation = self.allocate(&reservation).await?;

        let offer_sdp = match audio_streams(&allocation.caller_endpoint_id, &allocation.caller_endpoint)
            .and_then(|streams| self.inner.sdp.offer(&allocation.caller_endpoint, &streams))
        {
            Ok(offer) => offer,
            Err(e) => {
                self.inner.router.release(&allocation.conference_id);
                return Err(e);
            }
        };

        let call = Call::new(
            CallId::new(),
            NewCall {
                caller_id: caller_id.clone(),
                caller_name: caller_name.to_string(),
                callee_id: callee_id.clone(),
                conference_id: allocation.conference_id,
                sfu_instance_url: reservation.url.clone(),
                caller_endpoint_id: allocation.caller_endpoint_id,
                callee_endpoint_id: allocation.callee_endpoint_id,
                caller_endpoint: allocation.caller_endpoint,
                callee_endpoint: allocation.callee_endpoint,
            },
        );
        if let Err(e) = self.inner.calls.save(&call).await {
            self.inner.router.release(call.conference_id());
            return Err(e);
        }
        self.schedule_timeout(*call.id());

        metrics::counter!("calls_initiated_total").increment(1);
        metrics::gauge!("intercom_active_calls").increment(1.0);
        info!(
            call_id = %call.id(),
            conference_id = call.conference_id(),
            sfu = call.sfu_instance_url(),
            "Call initiated from {} to {}",
            caller_id,
            callee_id
        );

        Ok(InitiatedCall { call, offer_sdp })
    }

    /// Allocate the conference and both endpoints, undoing the reservation
    /// on failure
    async fn allocate(&self, reservation: &SfuReservation) -> Result<Allocation> {
        let conference_id = match self
            .inner
            .smb
            .allocate_conference(&reservation.url, &reservation.api_key)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!("Conference allocation on {} failed: {}", reservation.url, e);
                self.inner.router.cancel(reservation);
                return Err(e);
            }
        };
        self.inner.router.bind(reservation, &conference_id);

        let caller_endpoint_id = EndpointId::new();
        let callee_endpoint_id = EndpointId::new();
        let endpoints = async {
            let caller = self
                .allocate_endpoint(reservation, &conference_id, &caller_endpoint_id)
                .await?;
            let callee = self
                .allocate_endpoint(reservation, &conference_id, &callee_endpoint_id)
                .await?;
            Ok::<_, DomainError>((caller, callee))
        };

        match endpoints.await {
            Ok((caller_endpoint, callee_endpoint)) => Ok(Allocation {
                conference_id,
                caller_endpoint_id,
                callee_endpoint_id,
                caller_endpoint,
                callee_endpoint,
            }),
            Err(e) => {
                warn!(
                    conference_id = %conference_id,
                    sfu = %reservation.url,
                    "Endpoint allocation failed: {}",
                    e
                );
                self.inner.router.release(&conference_id);
                Err(e)
            }
        }
    }

    async fn allocate_endpoint(
        &self,
        reservation: &SfuReservation,
        conference_id: &str,
        endpoint_id: &EndpointId,
    ) -> Result<SmbEndpointDescription> {
        self.inner
            .smb
            .allocate_endpoint(
                &reservation.url,
                conference_id,
                endpoint_id.as_str(),
                true,
                true,
                true,
                RelayType::SsrcRewrite,
                self.inner.settings.endpoint_idle_timeout_secs,
                &reservation.api_key,
            )
            .await
    }

    /// Apply the caller's answer to its offer
    pub async fn complete_caller_signaling(
        &self,
        call_id: &CallId,
        client_id: &ClientId,
        answer_sdp: &str,
    ) -> Result<Call> {
        let _lock = self.lock_call(call_id).await;
        let mut call = self.load(call_id).await?;
        call.authorize(client_id, CallParty::Caller)?;
        call.ensure_not_ended()?;

        let configured = self
            .inner
            .sdp
            .handle_answer_from_endpoint(
                &self.location(&call, CallParty::Caller),
                call.endpoint(CallParty::Caller),
                answer_sdp,
            )
            .await?;
        call.mark_caller_ready(configured)?;
        self.inner.calls.save(&call).await?;

        debug!(call_id = %call_id, "Caller signaling complete, state {}", call.state().as_str());
        Ok(call)
    }

    /// Offer for the callee's pre-allocated endpoint; may be fetched again
    pub async fn join_call(&self, call_id: &CallId, client_id: &ClientId) -> Result<(Call, String)> {
        let call = self.load(call_id).await?;
        call.authorize(client_id, CallParty::Callee)?;
        call.ensure_not_ended()?;

        let endpoint_id = call.endpoint_id(CallParty::Callee);
        let endpoint = call.endpoint(CallParty::Callee);
        let offer = self
            .inner
            .sdp
            .offer(endpoint, &audio_streams(endpoint_id, endpoint)?)?;
        Ok((call, offer))
    }

    /// Apply the callee's answer; a repeated answer returns the call as is
    pub async fn complete_callee_signaling(
        &self,
        call_id: &CallId,
        client_id: &ClientId,
        answer_sdp: &str,
    ) -> Result<Call> {
        let _lock = self.lock_call(call_id).await;
        let mut call = self.load(call_id).await?;
        call.authorize(client_id, CallParty::Callee)?;
        if call.callee_ready() {
            debug!(call_id = %call_id, "Callee answer already applied");
            return Ok(call);
        }
        call.ensure_not_ended()?;

        let configured = self
            .inner
            .sdp
            .handle_answer_from_endpoint(
                &self.location(&call, CallParty::Callee),
                call.endpoint(CallParty::Callee),
                answer_sdp,
            )
            .await?;
        call.mark_callee_ready(configured)?;
        self.inner.calls.save(&call).await?;
        self.cancel_timeout(call_id);

        info!(
            call_id = %call_id,
            conference_id = call.conference_id(),
            "Callee joined, state {}",
            call.state().as_str()
        );
        Ok(call)
    }

    /// Hang up on behalf of either party
    pub async fn end_call(
        &self,
        call_id: &CallId,
        client_id: &ClientId,
        reason: Option<EndReason>,
    ) -> Result<Call> {
        let _lock = self.lock_call(call_id).await;
        let call = self.load(call_id).await?;
        let party = call.authorize_participant(client_id)?;
        call.ensure_not_ended()?;

        self.finish(call, reason.unwrap_or_else(|| party.hangup_reason()))
            .await
    }

    /// End a call because one party went away; never fails
    pub async fn end_call_due_to_disconnect(&self, call_id: &CallId, client_id: &ClientId) {
        if let Err(e) = self.try_end_on_disconnect(call_id, client_id).await {
            error!(
                call_id = %call_id,
                "Failed to end call after {} disconnected: {}",
                client_id,
                e
            );
        }
    }

    async fn try_end_on_disconnect(&self, call_id: &CallId, client_id: &ClientId) -> Result<()> {
        let _lock = self.lock_call(call_id).await;
        let Some(call) = self.inner.calls.find_by_id(call_id).await? else {
            return Ok(());
        };
        if call.is_ended() {
            return Ok(());
        }
        let Some(party) = call.party_of(client_id) else {
            warn!(call_id = %call_id, "Disconnected client {} is not on the call", client_id);
            return Ok(());
        };

        self.finish(call, party.disconnect_reason()).await?;
        Ok(())
    }

    pub async fn get_call(&self, call_id: &CallId) -> Result<Call> {
        self.load(call_id).await
    }

    pub async fn get_active_calls_for_client(&self, client_id: &ClientId) -> Result<Vec<Call>> {
        self.inner.calls.find_active_by_client(client_id).await
    }

    /// Release the conference and mark the call ended
    async fn finish(&self, mut call: Call, reason: EndReason) -> Result<Call> {
        self.cancel_timeout(call.id());
        self.inner.router.release(call.conference_id());
        call.end(reason)?;
        self.inner.calls.save(&call).await?;

        let reason = call.end_reason().map(|r| r.as_str().to_string()).unwrap_or_default();
        metrics::counter!("calls_ended_total", "reason" => reason.clone()).increment(1);
        metrics::gauge!("intercom_active_calls").decrement(1.0);
        info!(
            call_id = %call.id(),
            conference_id = call.conference_id(),
            sfu = call.sfu_instance_url(),
            "Call ended: {}",
            reason
        );
        Ok(call)
    }

    fn schedule_timeout(&self, call_id: CallId) {
        let service = self.clone();
        let timeout = self.inner.settings.join_timeout;
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            service.expire(&call_id).await;
        });
        guard(&self.inner.timeouts).insert(call_id, task.abort_handle());
    }

    fn cancel_timeout(&self, call_id: &CallId) {
        if let Some(handle) = guard(&self.inner.timeouts).remove(call_id) {
            handle.abort();
        }
    }

    /// Join timeout fired: end the call if the callee still has not joined
    async fn expire(&self, call_id: &CallId) {
        // The task must not abort itself through `finish`
        guard(&self.inner.timeouts).remove(call_id);

        let _lock = self.lock_call(call_id).await;
        let call = match self.inner.calls.find_by_id(call_id).await {
            Ok(Some(call)) if call.state() == CallState::Offering && !call.callee_ready() => call,
            Ok(_) => return,
            Err(e) => {
                error!(call_id = %call_id, "Join timeout could not load call: {}", e);
                return;
            }
        };

        warn!(call_id = %call_id, "Callee did not join in time");
        if let Err(e) = self.finish(call, EndReason::Timeout).await {
            error!(call_id = %call_id, "Failed to end timed out call: {}", e);
        }
    }

    async fn load(&self, call_id: &CallId) -> Result<Call> {
        self.inner
            .calls
            .find_by_id(call_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Call {}", call_id)))
    }

    async fn lock_call(&self, call_id: &CallId) -> CallLock {
        let lock = guard(&self.inner.locks)
            .entry(*call_id)
            .or_default()
            .clone();
        CallLock {
            inner: self.inner.clone(),
            call_id: *call_id,
            held: lock.lock_owned().await,
        }
    }

    fn location(&self, call: &Call, party: CallParty) -> EndpointLocation {
        EndpointLocation {
            base_url: call.sfu_instance_url().to_string(),
            api_key: self
                .inner
                .router
                .api_key_for(call.sfu_instance_url())
                .unwrap_or_default(),
            conference_id: call.conference_id().to_string(),
            endpoint_id: call.endpoint_id(party).to_string(),
        }
    }
}
