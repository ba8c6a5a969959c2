//! Validation errors for protocol values.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Media type label outside BRMS, DAILY, WEEKLY, MONTHLY
    #[error("Invalid media type: '{0}' (expected BRMS, DAILY, WEEKLY or MONTHLY)")]
    InvalidMediaType(String),

    #[error("Invalid location: '{0}' (expected offsite, onsite or retired)")]
    InvalidLocation(String),

    #[error("Invalid tape id '{value}': {reason}")]
    InvalidTapeId { value: String, reason: String },

    #[error("Invalid date '{0}' (expected DD/MM/YYYY)")]
    InvalidDate(String),

    /// Row does not have the id / media type / date shape
    #[error("Malformed row: {0}")]
    MalformedRow(String),
}
