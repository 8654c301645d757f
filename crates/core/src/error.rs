//! Error type shared by the core and its adapters

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Response of {url} isn't OK : {status} {body}")]
    HttpStatus { url: String, status: u16, body: String },

    #[error("Error {url} : {reason}")]
    Transport { url: String, reason: String },

    #[error("No channel found for id {0}")]
    ChannelNotFound(String),

    #[error("Malformed channel payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid date format {0:?}")]
    InvalidDateFormat(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// True for failures of an outbound HTTP call, as opposed to local ones.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::Transport { .. })
    }
}
