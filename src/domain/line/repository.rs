//! Line repository interface

use super::entity::Line;
use crate::domain::shared::error::Result;
use crate::domain::shared::value_objects::LineId;
use async_trait::async_trait;

/// Line repository trait
#[async_trait]
pub trait LineRepository: Send + Sync {
    /// Insert or replace a line
    async fn save(&self, line: &Line) -> Result<()>;

    /// Find line by ID
    async fn find_by_id(&self, id: &LineId) -> Result<Option<Line>>;

    /// Store the conference currently serving the line
    async fn set_conference(&self, id: &LineId, conference_id: &str) -> Result<()>;
}
