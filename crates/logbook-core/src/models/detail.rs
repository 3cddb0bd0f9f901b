use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::fields::{self, Fields};
use crate::error::{LogbookError, Result};

/// The object an action was performed on, e.g. a course name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.detail.trim().is_empty() {
            return Err(LogbookError::malformed("detail is blank"));
        }
        Ok(())
    }
}

impl Fields for Detail {
    fn field_names(&self) -> Vec<&str> {
        vec![fields::DETAIL]
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        (name == fields::DETAIL).then(|| Cow::Borrowed(self.detail.as_str()))
    }
}
