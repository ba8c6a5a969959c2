//! Flat-file store backend: one CSV sheet per location.
//!
//! ```text
//! <dir>/Offsite.csv
//! <dir>/Onsite.csv
//! <dir>/Retired.csv
//! ```
//!
//! Each operation reads the whole sheet. Mutations rewrite it through a
//! temp file and a rename, so a crash never leaves a half-written sheet.

use crate::error::{Result, StoreError};
use crate::store::{positions_of, remove_at, LocationStore};
use std::fs;
use std::path::{Path, PathBuf};
use tapeflow_protocol::{Location, Row, RowPosition, TapeId};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Open a store directory, creating it and any missing sheet (header only).
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|err| StoreError::Open {
            path: dir.clone(),
            reason: err.to_string(),
        })?;

        let store = Self { dir };
        for location in Location::ALL {
            let path = store.sheet_path(location);
            if !path.exists() {
                store.write_sheet(location, &[Row::header()])?;
                info!(path = %path.display(), "Created location sheet");
            }
        }
        Ok(store)
    }

    /// Open without creating anything. Missing sheets surface as unavailable on use.
    pub fn open_existing(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(StoreError::Open {
                path: dir,
                reason: "directory does not exist".to_string(),
            });
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sheet_path(&self, location: Location) -> PathBuf {
        Self::sheet_file(&self.dir, location)
    }

    /// Where `location`'s sheet lives inside a store directory.
    pub fn sheet_file(dir: &Path, location: Location) -> PathBuf {
        dir.join(format!("{}.csv", location.as_str()))
    }

    fn read_sheet(&self, location: Location) -> Result<Vec<Row>> {
        let path = self.sheet_path(location);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|err| StoreError::unavailable(location, format!("{}: {}", path.display(), err)))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| StoreError::unavailable(location, err))?;
            rows.push(Row::from_cells(record.iter()));
        }
        if rows.is_empty() {
            rows.push(Row::header());
        }
        Ok(rows)
    }

    fn write_sheet(&self, location: Location, rows: &[Row]) -> Result<()> {
        let path = self.sheet_path(location);
        let tmp = self.dir.join(format!(".{}.csv.tmp", location.as_str()));
        let unavailable =
            |reason: String| StoreError::unavailable(location, format!("{}: {}", path.display(), reason));

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&tmp)
            .map_err(|err| unavailable(err.to_string()))?;
        for row in rows {
            writer.write_record(row.cells()).map_err(|err| unavailable(err.to_string()))?;
        }
        writer.flush().map_err(|err| unavailable(err.to_string()))?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(|err| unavailable(err.to_string()))?;
        Ok(())
    }
}

impl LocationStore for CsvStore {
    fn backend_tag(&self) -> &'static str {
        "csv"
    }

    fn find(&self, location: Location, id: &TapeId) -> Result<Vec<RowPosition>> {
        let sheet = self.read_sheet(location)?;
        Ok(positions_of(&sheet, id))
    }

    fn read_all(&self, location: Location) -> Result<Vec<Row>> {
        self.read_sheet(location)
    }

    fn append(&self, location: Location, row: Row) -> Result<()> {
        let mut sheet = self.read_sheet(location)?;
        sheet.push(row);
        self.write_sheet(location, &sheet)?;
        debug!(location = %location, rows = sheet.len(), "Appended row");
        Ok(())
    }

    fn remove(&self, location: Location, position: RowPosition) -> Result<()> {
        let mut sheet = self.read_sheet(location)?;
        remove_at(&mut sheet, location, position)?;
        self.write_sheet(location, &sheet)?;
        debug!(location = %location, position = position.get(), "Removed row");
        Ok(())
    }
}
