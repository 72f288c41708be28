//! All error types for the weave crate.
//!
//! Every stage of a pipeline returns these. Conditions the run can recover from
//! (a dead source, a row without a key, a duplicate key) are logged where they
//! happen and never travel up as an `Error`; anything that does reach the caller
//! is fatal for the pipeline that produced it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown platform `{0}` (expected Android, iOS or Web)")]
    UnknownPlatform(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    #[error("unexpected response status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("{source_title}: {message}")]
    MissingColumn {
        source_title: String,
        message: String,
    },

    #[error("{location} {reason}")]
    InvalidKey { location: String, reason: String },
}

impl Error {
    /// Creates a new config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a new missing column error for the given source
    pub fn missing_column(source_title: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MissingColumn {
            source_title: source_title.into(),
            message: message.into(),
        }
    }
}
