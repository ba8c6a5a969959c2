//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tapeflow::MovementError;
use tapeflow_db::StoreError;
use tapeflow_protocol::{MediaType, ProtocolError, TapeId};

/// An error with helpful context and suggestions
#[derive(Debug, Serialize)]
pub struct HelpfulError {
    /// The main error message
    #[serde(rename = "error")]
    pub message: String,
    /// Additional context about what was happening
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Tape id failed validation
    pub fn invalid_tape_id(raw: &str, err: &ProtocolError) -> Self {
        Self::new(format!("Invalid tape id: '{}'", raw))
            .with_context(err.to_string())
            .with_suggestions([
                "TRY: Use the label printed on the tape, e.g. 7001 or BRMS-014".to_string(),
                "TRY: Allowed characters: letters, digits, '.', '_' and '-'".to_string(),
            ])
    }

    /// Media type not one of the four labels
    pub fn invalid_media_type(raw: &str) -> Self {
        let labels: Vec<&str> = MediaType::ALL.iter().map(|m| m.as_str()).collect();
        Self::new(format!("Invalid media type: '{}'", raw))
            .with_context(format!("Media type must be one of {}", labels.join(", ")))
            .with_suggestion("TRY: --media-type DAILY")
    }

    /// Unknown tape headed Onsite without a media type
    pub fn media_type_required(tape_id: &TapeId) -> Self {
        Self::new(format!("Tape {} is not registered", tape_id))
            .with_context("Registering a new tape Onsite needs its media type")
            .with_suggestions([
                format!("TRY: tapeflow move onsite {} --media-type DAILY", tape_id),
                "TRY: Media types: BRMS, DAILY, WEEKLY, MONTHLY".to_string(),
                format!("TRY: Check for typos: tapeflow lookup {}", tape_id),
            ])
    }

    /// Store directory could not be opened
    pub fn cannot_open_store(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot open tape store: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check permissions: ls -la {}", path.display()),
                "TRY: Point at another directory with --store-dir".to_string(),
                "TRY: Inspect the resolved settings: tapeflow config".to_string(),
            ])
    }

    /// Store failure while reading or writing one location
    pub fn store(err: &StoreError) -> Self {
        let location = err
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "tape".to_string());
        Self::new(err.to_string())
            .with_context(format!("The {} store could not be reached; the operation was aborted", location))
            .with_suggestions([
                "TRY: Check that the sheet files are not open in another program".to_string(),
                "TRY: Re-run the command; nothing was written for the failed step".to_string(),
            ])
    }

    /// Engine failure, including partial relocations
    pub fn movement(err: &MovementError) -> Self {
        match err {
            MovementError::Store(source) => Self::store(source),
            MovementError::PartialRelocation {
                tape_id,
                from,
                to,
                lost,
                ..
            } => {
                let mut helpful = Self::new(err.to_string()).with_context(format!(
                    "Tape {} may now be missing from {} or split between {} and {}",
                    tape_id, to, from, to
                ));
                if let Some(row) = lost {
                    helpful = helpful.with_suggestion(format!(
                        "TRY: Re-add this row to {} by hand: {}",
                        to,
                        row.cells().join(", ")
                    ));
                }
                helpful.with_suggestion(format!("TRY: Verify with: tapeflow lookup {}", tape_id))
            }
        }
    }

    /// Config file unreadable or malformed
    pub fn config_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid config file: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: [store] backend must be \"csv\" or \"memory\"".to_string(),
                format!("TRY: Delete {} to fall back to defaults", path.display()),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print a command failure as JSON on stdout, for `--json` callers.
pub fn print_json_error(err: &anyhow::Error) {
    let value = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::to_value(helpful)
            .unwrap_or_else(|_| serde_json::json!({ "error": helpful.message })),
        None => serde_json::json!({ "error": format!("{:#}", err) }),
    };
    match serde_json::to_string_pretty(&value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{{\"error\": \"{}\"}}", err.to_string().replace('"', "'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapeflow_protocol::{Location, Row};

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While moving a tape")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While moving a tape"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_media_type_required_suggests_flag() {
        let err = HelpfulError::media_type_required(&TapeId::from_cell("7001"));
        let display = format!("{}", err);
        assert!(display.contains("Tape 7001 is not registered"));
        assert!(display.contains("--media-type"));
    }

    #[test]
    fn test_partial_relocation_lists_lost_row() {
        let err = MovementError::PartialRelocation {
            tape_id: TapeId::from_cell("42"),
            from: Location::Onsite,
            to: Location::Offsite,
            moved: Vec::new(),
            lost: Some(Row::from_cells(["42", "DAILY", "01/01/2026"])),
            source: StoreError::unavailable(Location::Offsite, "append rejected"),
        };
        let helpful = HelpfulError::movement(&err);
        assert!(helpful.suggestions.iter().any(|s| s.contains("42, DAILY, 01/01/2026")));
    }

    #[test]
    fn test_serializes_message_as_error() {
        let err = HelpfulError::new("boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"], "boom");
        assert!(json.get("context").is_none());
    }
}
