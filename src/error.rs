use thiserror::Error;

/// Failures that abort a dataset load.
///
/// Field-level problems never surface here: an unparsable cell becomes `None`
/// on the record and the row is kept.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },
    #[error("header has {columns} column(s); at least {required} are needed to locate the company name")]
    SchemaUnrecoverable { columns: usize, required: usize },
}

impl LoadError {
    pub(crate) fn unavailable(source_id: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::SourceUnavailable {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown text encoding label '{0}'")]
    UnknownEncoding(String),
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },
    #[error("registry lookup template '{0}' has no {{name}} placeholder")]
    Template(String),
}
