use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::fields::{self, Fields};
use crate::error::{LogbookError, Result};

/// A person as recorded in the activity log.
///
/// Two entities are equal only when both name and email match exactly.
/// Fuzzy "same person" judgments are made elsewhere and never change this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub email: String,
}

impl Entity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LogbookError::malformed("entity name is blank"));
        }
        if self.email.trim().is_empty() {
            return Err(LogbookError::malformed(format!(
                "entity {:?} has a blank email",
                self.name
            )));
        }
        Ok(())
    }
}

impl Fields for Entity {
    fn field_names(&self) -> Vec<&str> {
        vec![fields::NAME, fields::EMAIL]
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            fields::NAME => Some(Cow::Borrowed(&self.name)),
            fields::EMAIL => Some(Cow::Borrowed(&self.email)),
            _ => None,
        }
    }
}
