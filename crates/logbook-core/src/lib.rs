//! Logbook core: activity log records, configuration, ingestion.

pub mod config;
pub mod error;
pub mod models;
pub mod reader;

pub use config::{BlockingPolicy, CandidateMode, ResolveConfig, DEFAULT_THRESHOLD};
pub use error::{LogbookError, Result};
pub use models::*;

pub use reader::{LogReader, LogRow, Triples, parse_row};
