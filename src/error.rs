use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a workbook or exporting it to JSON.
///
/// Any of these aborts the run before the destination file is touched.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Source file not found or unreadable: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported spreadsheet format: {}", path.display())]
    UnsupportedFormat {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Unable to read worksheet '{sheet}'")]
    CorruptDocument {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Cannot serialize {location}: {reason}")]
    Serialization { location: String, reason: String },

    #[error("Cannot write destination file: {}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pipeline stage an error belongs to, used in the operator-facing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "Workbook load"),
            Stage::Export => write!(f, "JSON export"),
        }
    }
}

impl ConvertError {
    pub fn stage(&self) -> Stage {
        match self {
            ConvertError::SourceNotFound { .. }
            | ConvertError::UnsupportedFormat { .. }
            | ConvertError::CorruptDocument { .. } => Stage::Load,
            ConvertError::Serialization { .. } | ConvertError::DestinationUnwritable { .. } => {
                Stage::Export
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
