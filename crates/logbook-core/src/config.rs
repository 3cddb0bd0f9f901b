use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LogbookError, Result};
use crate::models::NodeKind;

pub const DEFAULT_THRESHOLD: f64 = 65.0;

/// Caller-supplied knobs for a resolution run.
///
/// Nothing here is read from the environment; the CLI loads it from a
/// TOML file and overlays flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Substituted for an attribute one of the two records lacks.
    pub empty_placeholder: String,
    /// Scores strictly above this are duplicates. Range `[0, 100]`.
    pub threshold: f64,
    pub mode: CandidateMode,
    pub blocking: BlockingPolicy,
    /// Only pair nodes of this kind. `None` pairs every node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
}

/// How candidate pairs are enumerated from the activity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateMode {
    Exhaustive,
    #[default]
    NeighborBlocked,
}

/// What neighbor blocking does with pairs that share a graph neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockingPolicy {
    /// Drop them: both are already known to have acted on the same detail.
    #[default]
    Exclude,
    /// Keep every pair but yield the shared-neighbor ones first.
    Prioritize,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            empty_placeholder: String::new(),
            threshold: DEFAULT_THRESHOLD,
            mode: CandidateMode::default(),
            blocking: BlockingPolicy::default(),
            kind: None,
        }
    }
}

// ─── Validation / TOML ─────────────────────────────────────

impl ResolveConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(LogbookError::InvalidConfiguration(format!(
                "threshold must be within [0, 100], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl fmt::Display for CandidateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CandidateMode::Exhaustive => "exhaustive",
            CandidateMode::NeighborBlocked => "neighbor-blocked",
        })
    }
}

impl FromStr for CandidateMode {
    type Err = LogbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exhaustive" | "pairwise" => Ok(CandidateMode::Exhaustive),
            "neighbor-blocked" | "blocked" => Ok(CandidateMode::NeighborBlocked),
            other => Err(LogbookError::InvalidConfiguration(format!(
                "unknown candidate mode {other:?}"
            ))),
        }
    }
}

impl fmt::Display for BlockingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockingPolicy::Exclude => "exclude",
            BlockingPolicy::Prioritize => "prioritize",
        })
    }
}

impl FromStr for BlockingPolicy {
    type Err = LogbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exclude" => Ok(BlockingPolicy::Exclude),
            "prioritize" => Ok(BlockingPolicy::Prioritize),
            other => Err(LogbookError::InvalidConfiguration(format!(
                "unknown blocking policy {other:?}"
            ))),
        }
    }
}
