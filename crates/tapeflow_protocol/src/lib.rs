//! Shared types for the tape rotation system.
//!
//! A tape lives as one row in exactly one of three location stores:
//!
//! ```text
//! | Tape ID | Media Type | Last Moved |
//! |---------|------------|------------|
//! | 7001    | DAILY      | 19/10/2026 |
//! ```
//!
//! The location is never stored in the row; it is whichever store holds it.

pub mod error;
pub mod paths;
pub mod types;

pub use error::ProtocolError;
pub use types::{
    format_date, parse_date, Location, MediaType, Row, RowPosition, TapeId, TapeRecord,
    DATE_FORMAT, HEADER,
};
