use thiserror::Error;

/// All errors that can occur in logbook-core.
#[derive(Debug, Error)]
pub enum LogbookError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid date {value:?}, expected format {format}")]
    InvalidDate { value: String, format: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid log row at line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LogbookError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LogbookError>;
