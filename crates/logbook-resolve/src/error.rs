use logbook_core::LogbookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("records share no comparable fields")]
    NoComparableFields,

    #[error("invalid threshold {0}: must be a finite value within [0, 100]")]
    InvalidThreshold(f64),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown node index {0}")]
    UnknownNode(usize),

    #[error(transparent)]
    Core(LogbookError),
}

impl From<LogbookError> for ResolveError {
    fn from(err: LogbookError) -> Self {
        match err {
            LogbookError::MalformedRecord(msg) => ResolveError::MalformedRecord(msg),
            LogbookError::InvalidConfiguration(msg) => ResolveError::InvalidConfiguration(msg),
            other => ResolveError::Core(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
