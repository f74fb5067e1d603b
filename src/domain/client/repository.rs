//! Client repository interface

use super::entity::Client;
use crate::domain::shared::error::Result;
use crate::domain::shared::value_objects::ClientId;
use async_trait::async_trait;

/// Client repository trait
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Insert or replace a client
    async fn save(&self, client: &Client) -> Result<()>;

    /// Find client by ID
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<Client>>;

    /// Flip the online flag, returning the updated client
    async fn set_online(&self, id: &ClientId, online: bool) -> Result<Client>;

    /// List all clients
    async fn list(&self) -> Result<Vec<Client>>;
}
