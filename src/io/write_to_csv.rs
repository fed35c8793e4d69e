use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;
use serde::Serialize;

use crate::io::IoError;

/// One line of the run diagnostics.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub step: usize,
    pub time: f64,
    pub err_density: f64,
    pub err_energy: f64,
    pub err_momentum_x: f64,
    pub err_momentum_y: f64,
    pub pressure_min: f64,
    pub pressure_max: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
}

/// Appends status rows to a CSV file, flushing each one so a diverged run
/// still leaves its history behind.
pub struct DiagnosticsLog {
    writer: Writer<File>,
    path: PathBuf,
}
impl DiagnosticsLog {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        let writer = Writer::from_path(&path).map_err(|source| IoError::Csv {
            path: path.clone(),
            source,
        })?;
        Ok(Self { writer, path })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn append(&mut self, row: &StatusRow) -> Result<(), IoError> {
        let to_io_error = |source| IoError::Csv {
            path: self.path.clone(),
            source,
        };
        self.writer.serialize(row).map_err(to_io_error)?;
        self.writer
            .flush()
            .map_err(|e| to_io_error(csv::Error::from(e)))?;
        Ok(())
    }
}
