//! Client entity

use crate::domain::shared::value_objects::ClientId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signaling client known to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub online: bool,
    pub registered_at: DateTime<Utc>,
}

impl Client {
    pub fn new(id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            online: true,
            registered_at: Utc::now(),
        }
    }
}
