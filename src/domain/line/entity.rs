//! Line entity

use crate::domain::shared::value_objects::LineId;
use serde::{Deserialize, Serialize};

/// A logical channel; `smb_conference_id` is empty until a conference is
/// allocated for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub smb_conference_id: String,
}

impl Line {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LineId::new(),
            name: name.into(),
            smb_conference_id: String::new(),
        }
    }

    pub fn has_conference(&self) -> bool {
        !self.smb_conference_id.is_empty()
    }
}
