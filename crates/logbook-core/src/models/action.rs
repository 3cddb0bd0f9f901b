use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{self, Fields};
use crate::error::{LogbookError, Result};

/// A single event: what was done and on which day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action {
    pub action: String,
    pub date: NaiveDate,
}

impl Action {
    pub fn new(action: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            action: action.into(),
            date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.action.trim().is_empty() {
            return Err(LogbookError::malformed(format!(
                "action on {} has a blank name",
                self.date
            )));
        }
        Ok(())
    }
}

impl Fields for Action {
    fn field_names(&self) -> Vec<&str> {
        vec![fields::ACTION, fields::DATE]
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            fields::ACTION => Some(Cow::Borrowed(&self.action)),
            fields::DATE => Some(Cow::Owned(self.date.format("%Y-%m-%d").to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_date_field_is_iso() {
        let date = NaiveDate::from_ymd_opt(2016, 1, 2).unwrap();
        let action = Action::new("View", date);
        assert_eq!(action.field_value("date").as_deref(), Some("2016-01-02"));
        assert_eq!(action.field_value("action").as_deref(), Some("View"));
    }

    #[test]
    fn test_action_validate_rejects_blank_name() {
        let date = NaiveDate::from_ymd_opt(2016, 1, 2).unwrap();
        assert!(Action::new("", date).validate().is_err());
    }
}
