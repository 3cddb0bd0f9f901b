use serde::{Deserialize, Serialize};

use super::{Action, Detail, Entity};
use crate::error::Result;

/// One observed event linking an [`Entity`] to a [`Detail`] via an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub entity: Entity,
    pub action: Action,
    pub detail: Detail,
}

impl Triple {
    pub fn new(entity: Entity, action: Action, detail: Detail) -> Self {
        Self {
            entity,
            action,
            detail,
        }
    }

    /// Checks that every required subfield is present and non-blank.
    pub fn validate(&self) -> Result<()> {
        self.entity.validate()?;
        self.action.validate()?;
        self.detail.validate()
    }
}
