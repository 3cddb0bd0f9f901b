use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const ACTION: &str = "action";
pub const DATE: &str = "date";
pub const DETAIL: &str = "detail";

/// Uniform read access to the named attributes of a record.
///
/// Comparison code is written once against this trait, so records of
/// different kinds (an [`Entity`](super::Entity) against a
/// [`Detail`](super::Detail), say) can be paired field by field.
pub trait Fields {
    /// Names of the attributes this record carries.
    fn field_names(&self) -> Vec<&str>;

    /// Value of the named attribute, or `None` when the record lacks it.
    fn field_value(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: Fields + ?Sized> Fields for &T {
    fn field_names(&self) -> Vec<&str> {
        (**self).field_names()
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field_value(name)
    }
}

/// An ad-hoc record: a map from attribute name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Fields for Record {
    fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        self.fields.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}
