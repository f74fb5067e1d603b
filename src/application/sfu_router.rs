//! Least-loaded routing across media bridge instances
//!
//! Conference counts are process-local. Selecting an instance and counting
//! the conference against it happen under one lock, so back-to-back calls
//! see each other's reservations.

use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// One bridge deployment and its believed load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SfuInstance {
    pub url: String,
    #[serde(skip)]
    pub api_key: String,
    pub conference_count: usize,
    pub max_conferences: usize,
}

impl SfuInstance {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, max_conferences: usize) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            conference_count: 0,
            max_conferences,
        }
    }

    fn has_capacity(&self) -> bool {
        self.conference_count < self.max_conferences
    }
}

/// A conference slot counted against one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfuReservation {
    index: usize,
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Default)]
struct RouterState {
    instances: Vec<SfuInstance>,
    /// conference id -> instance index
    conferences: HashMap<String, usize>,
}

#[derive(Debug)]
pub struct SfuRouter {
    state: Mutex<RouterState>,
}

impl SfuRouter {
    pub fn new(instances: Vec<SfuInstance>) -> Self {
        Self {
            state: Mutex::new(RouterState {
                instances,
                conferences: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pick the instance with the fewest conferences among those under
    /// their maximum and count one conference against it
    pub fn reserve(&self) -> Result<SfuReservation> {
        let mut state = self.state();
        let (index, instance) = state
            .instances
            .iter_mut()
            .enumerate()
            .filter(|(_, instance)| instance.has_capacity())
            .min_by_key(|(_, instance)| instance.conference_count)
            .ok_or_else(|| {
                DomainError::ServiceUnavailable("All media bridge instances are at capacity".to_string())
            })?;

        instance.conference_count += 1;
        debug!(
            "Reserved conference slot on {} ({}/{})",
            instance.url, instance.conference_count, instance.max_conferences
        );
        metrics::gauge!("sfu_conferences", "instance" => instance.url.clone())
            .set(instance.conference_count as f64);

        Ok(SfuReservation {
            index,
            url: instance.url.clone(),
            api_key: instance.api_key.clone(),
        })
    }

    /// Give back a reservation whose conference was never allocated
    pub fn cancel(&self, reservation: &SfuReservation) {
        let mut state = self.state();
        if let Some(instance) = state.instances.get_mut(reservation.index) {
            decrement(instance);
        }
    }

    /// Record which instance hosts an allocated conference
    pub fn bind(&self, reservation: &SfuReservation, conference_id: &str) {
        self.state()
            .conferences
            .insert(conference_id.to_string(), reservation.index);
    }

    /// Release a conference: uncount it and forget the mapping
    ///
    /// Only the first release of a conference has any effect.
    pub fn release(&self, conference_id: &str) -> bool {
        let mut state = self.state();
        let Some(index) = state.conferences.remove(conference_id) else {
            warn!("Conference {} released twice or never bound", conference_id);
            return false;
        };
        if let Some(instance) = state.instances.get_mut(index) {
            decrement(instance);
        }
        true
    }

    /// API key configured for an instance URL
    pub fn api_key_for(&self, url: &str) -> Option<String> {
        self.state()
            .instances
            .iter()
            .find(|instance| instance.url == url)
            .map(|instance| instance.api_key.clone())
    }

    pub fn instances(&self) -> Vec<SfuInstance> {
        self.state().instances.clone()
    }
}

fn decrement(instance: &mut SfuInstance) {
    instance.conference_count = instance.conference_count.saturating_sub(1);
    metrics::gauge!("sfu_conferences", "instance" => instance.url.clone())
        .set(instance.conference_count as f64);
}
