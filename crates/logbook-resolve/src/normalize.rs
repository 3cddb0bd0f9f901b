//! Field normalization: the canonical form two values are compared in.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use logbook_core::models::fields;

/// How a field value is reduced before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeRule {
    /// Lowercase, then drop every whitespace character.
    Collapse,
    /// Keep the part before the first `@`, then [`NormalizeRule::Collapse`].
    /// Values without an `@` are collapsed whole.
    EmailLocalPart,
}

impl NormalizeRule {
    pub fn apply(self, value: &str) -> String {
        match self {
            NormalizeRule::Collapse => collapse(value),
            NormalizeRule::EmailLocalPart => {
                let local = value.split_once('@').map_or(value, |(local, _)| local);
                collapse(local)
            }
        }
    }
}

fn collapse(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Field name → rule lookup with a declared fallback for unlisted names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerTable {
    rules: BTreeMap<String, NormalizeRule>,
    default_rule: NormalizeRule,
}

impl NormalizerTable {
    /// A table with no per-field rules.
    pub fn new(default_rule: NormalizeRule) -> Self {
        Self {
            rules: BTreeMap::new(),
            default_rule,
        }
    }

    /// `email` → [`NormalizeRule::EmailLocalPart`], everything else collapsed.
    pub fn standard() -> Self {
        Self::new(NormalizeRule::Collapse).with_rule(fields::EMAIL, NormalizeRule::EmailLocalPart)
    }

    pub fn with_rule(mut self, field: impl Into<String>, rule: NormalizeRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    pub fn rule_for(&self, field: &str) -> NormalizeRule {
        self.rules.get(field).copied().unwrap_or(self.default_rule)
    }

    pub fn default_rule(&self) -> NormalizeRule {
        self.default_rule
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, NormalizeRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), *rule))
    }

    pub fn normalize(&self, field: &str, value: &str) -> String {
        self.rule_for(field).apply(value)
    }
}

impl Default for NormalizerTable {
    fn default() -> Self {
        Self::standard()
    }
}

static STANDARD: LazyLock<NormalizerTable> = LazyLock::new(NormalizerTable::standard);

/// Normalize `value` under the standard table.
pub fn normalize(field: &str, value: &str) -> String {
    STANDARD.normalize(field, value)
}
