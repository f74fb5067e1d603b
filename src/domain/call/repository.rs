//! Call repository interface

use crate::domain::call::aggregate::Call;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallId, ClientId};
use async_trait::async_trait;

/// Repository interface for Call aggregate
///
/// This is defined in the domain layer as a trait (port),
/// and implemented in the infrastructure layer (adapter).
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Find a call by its ID
    async fn find_by_id(&self, id: &CallId) -> Result<Option<Call>>;

    /// Save a call (insert or update)
    async fn save(&self, call: &Call) -> Result<()>;

    /// Calls not yet ended where the client is caller or callee
    async fn find_active_by_client(&self, client_id: &ClientId) -> Result<Vec<Call>>;
}
