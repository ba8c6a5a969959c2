//! Canonical value types shared by the store adapter, the engine and the CLI.

use crate::error::ProtocolError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format of the `Last Moved` column.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Header row of every location sheet.
pub const HEADER: [&str; 3] = ["Tape ID", "Media Type", "Last Moved"];

const ID_COLUMN: usize = 0;
const MEDIA_TYPE_COLUMN: usize = 1;
const LAST_MOVED_COLUMN: usize = 2;

const MAX_TAPE_ID_LEN: usize = 64;

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ProtocolError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ProtocolError::InvalidDate(raw.to_string()))
}

// ============================================================================
// Location
// ============================================================================

/// Custody location. Each one is backed by its own row collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    Offsite,
    Onsite,
    Retired,
}

impl Location {
    /// Store iteration order used by lookups and listings.
    pub const ALL: [Location; 3] = [Location::Offsite, Location::Onsite, Location::Retired];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Offsite => "Offsite",
            Location::Onsite => "Onsite",
            Location::Retired => "Retired",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Location {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "offsite" => Ok(Location::Offsite),
            "onsite" => Ok(Location::Onsite),
            "retired" | "retire" => Ok(Location::Retired),
            _ => Err(ProtocolError::InvalidLocation(s.to_string())),
        }
    }
}

// ============================================================================
// Media type
// ============================================================================

/// Backup media class, fixed at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Brms,
    Daily,
    Weekly,
    Monthly,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Brms,
        MediaType::Daily,
        MediaType::Weekly,
        MediaType::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Brms => "BRMS",
            MediaType::Daily => "DAILY",
            MediaType::Weekly => "WEEKLY",
            MediaType::Monthly => "MONTHLY",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BRMS" => Ok(MediaType::Brms),
            "DAILY" => Ok(MediaType::Daily),
            "WEEKLY" => Ok(MediaType::Weekly),
            "MONTHLY" => Ok(MediaType::Monthly),
            _ => Err(ProtocolError::InvalidMediaType(s.to_string())),
        }
    }
}

// ============================================================================
// Tape id
// ============================================================================

/// Opaque tape identifier, compared by exact string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TapeId(String);

impl TapeId {
    /// Validate user input: trimmed, non-empty, `[A-Za-z0-9._-]`, at most 64 chars.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value = raw.trim();
        let invalid = |reason: &str| ProtocolError::InvalidTapeId {
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        if value.is_empty() {
            return Err(invalid("tape id cannot be empty"));
        }
        if value.len() > MAX_TAPE_ID_LEN {
            return Err(invalid("tape id is longer than 64 characters"));
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(invalid(&format!("unexpected character '{}'", bad)));
        }
        Ok(Self(value.to_string()))
    }

    /// Wrap a value read back from a store cell without validation.
    pub fn from_cell(cell: &str) -> Self {
        Self(cell.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TapeId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Rows and positions
// ============================================================================

/// One raw row of a location sheet, cells kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(Into::into).collect())
    }

    pub fn header() -> Self {
        Self::from_cells(HEADER)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn into_cells(self) -> Vec<String> {
        self.0
    }

    pub fn cell(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    /// First column, the tape id.
    pub fn id_cell(&self) -> Option<&str> {
        self.cell(ID_COLUMN)
    }

    /// Exact comparison against the id column; no trimming or case folding.
    pub fn matches_id(&self, id: &TapeId) -> bool {
        self.id_cell() == Some(id.as_str())
    }

    /// Copy of this row with the `Last Moved` cell replaced. Other cells are untouched.
    pub fn with_last_moved(&self, date: NaiveDate) -> Self {
        let mut cells = self.0.clone();
        if cells.len() <= LAST_MOVED_COLUMN {
            cells.resize(LAST_MOVED_COLUMN + 1, String::new());
        }
        cells[LAST_MOVED_COLUMN] = format_date(date);
        Self(cells)
    }
}

/// 1-based row number within a sheet. Row 1 is the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowPosition(usize);

impl RowPosition {
    pub const HEADER: RowPosition = RowPosition(1);

    pub fn new(position: usize) -> Self {
        Self(position)
    }

    /// Position of the n-th data row (0-based index after the header).
    pub fn from_data_index(idx: usize) -> Self {
        Self(idx + 2)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Index into a `read_all` result (which includes the header at index 0).
    pub fn sheet_index(&self) -> usize {
        self.0.saturating_sub(1)
    }

    pub fn is_header(&self) -> bool {
        self.0 <= 1
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

// ============================================================================
// Tape entity
// ============================================================================

/// A tape as seen through one row of one location store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeRecord {
    pub id: TapeId,
    pub media_type: MediaType,
    #[serde(with = "dmy_date")]
    pub last_moved: NaiveDate,
    /// Derived from the store holding the row, never written to it.
    pub location: Location,
}

impl TapeRecord {
    /// A brand-new tape entering custody. Intake always lands Onsite.
    pub fn intake(id: TapeId, media_type: MediaType, today: NaiveDate) -> Self {
        Self {
            id,
            media_type,
            last_moved: today,
            location: Location::Onsite,
        }
    }

    pub fn to_row(&self) -> Row {
        Row::from_cells([
            self.id.as_str().to_string(),
            self.media_type.as_str().to_string(),
            format_date(self.last_moved),
        ])
    }

    pub fn from_row(location: Location, row: &Row) -> Result<Self, ProtocolError> {
        let id = row
            .id_cell()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProtocolError::MalformedRow("missing tape id".to_string()))?;
        let media_type = row
            .cell(MEDIA_TYPE_COLUMN)
            .ok_or_else(|| ProtocolError::MalformedRow(format!("tape {} has no media type", id)))?
            .parse::<MediaType>()?;
        let last_moved = row
            .cell(LAST_MOVED_COLUMN)
            .ok_or_else(|| ProtocolError::MalformedRow(format!("tape {} has no last moved date", id)))
            .and_then(parse_date)?;
        Ok(Self {
            id: TapeId::from_cell(id),
            media_type,
            last_moved,
            location,
        })
    }
}

mod dmy_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
