//! In-memory repositories
//!
//! Process-local stores behind the domain repository ports. State is lost
//! on restart; calls and lines are short-lived enough that this is the
//! deployment default.

use crate::domain::call::{Call, CallRepository};
use crate::domain::client::{Client, ClientRepository};
use crate::domain::line::{Line, LineRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, ClientId, LineId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory call store
#[derive(Default, Clone)]
pub struct InMemoryCallRepository {
    calls: Arc<RwLock<HashMap<CallId, Call>>>,
}

impl InMemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CallRepository for InMemoryCallRepository {
    async fn find_by_id(&self, id: &CallId) -> Result<Option<Call>> {
        Ok(self.calls.read().await.get(id).cloned())
    }

    async fn save(&self, call: &Call) -> Result<()> {
        self.calls.write().await.insert(*call.id(), call.clone());
        Ok(())
    }

    async fn find_active_by_client(&self, client_id: &ClientId) -> Result<Vec<Call>> {
        let calls = self.calls.read().await;
        let mut active: Vec<Call> = calls
            .values()
            .filter(|call| !call.is_ended() && call.party_of(client_id).is_some())
            .cloned()
            .collect();
        active.sort_by_key(|call| *call.created_at());
        Ok(active)
    }
}

/// In-memory client registry
#[derive(Default, Clone)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<HashMap<ClientId, Client>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn save(&self, client: &Client) -> Result<()> {
        self.clients
            .write()
            .await
            .insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Client>> {
        Ok(self.clients.read().await.get(id).cloned())
    }

    async fn set_online(&self, id: &ClientId, online: bool) -> Result<Client> {
        let mut clients = self.clients.write().await;
        let client = clients
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("Client {}", id)))?;
        client.online = online;
        Ok(client.clone())
    }

    async fn list(&self) -> Result<Vec<Client>> {
        let mut clients: Vec<Client> = self.clients.read().await.values().cloned().collect();
        clients.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(clients)
    }
}

/// In-memory line store
#[derive(Default, Clone)]
pub struct InMemoryLineRepository {
    lines: Arc<RwLock<HashMap<LineId, Line>>>,
}

impl InMemoryLineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LineRepository for InMemoryLineRepository {
    async fn save(&self, line: &Line) -> Result<()> {
        self.lines.write().await.insert(line.id, line.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LineId) -> Result<Option<Line>> {
        Ok(self.lines.read().await.get(id).cloned())
    }

    async fn set_conference(&self, id: &LineId, conference_id: &str) -> Result<()> {
        let mut lines = self.lines.write().await;
        let line = lines
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("Line {}", id)))?;
        line.smb_conference_id = conference_id.to_string();
        Ok(())
    }
}
