use std::path::PathBuf;

use thiserror::Error;

pub mod param_parser;
pub mod write_to_csv;
pub mod write_to_vtu;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {}: {message}", .path.display())]
    Vtu { path: PathBuf, message: String },
}
