//! CSV backfill for historical activity exports.
//!
//! Marketing teams periodically replay event exports from the tracking
//! pipeline through the scoring engine. The importer only parses the feed
//! into activities; scoring them stays with the engine.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::scoring::Activity;

#[derive(Debug)]
pub enum ActivityImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: usize, message: String },
}

impl std::fmt::Display for ActivityImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityImportError::Io(err) => write!(f, "failed to read activity feed: {}", err),
            ActivityImportError::Csv(err) => write!(f, "invalid activity feed data: {}", err),
            ActivityImportError::Row { line, message } => {
                write!(f, "activity feed line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for ActivityImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActivityImportError::Io(err) => Some(err),
            ActivityImportError::Csv(err) => Some(err),
            ActivityImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for ActivityImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ActivityImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ActivityFeedImporter;

impl ActivityFeedImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Activity>, ActivityImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Activity>, ActivityImportError> {
        parser::parse_records(reader)
    }
}
