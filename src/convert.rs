use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::excel;
use crate::json_export;

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSummary {
    pub sheet_count: usize,
    pub output_path: PathBuf,
}

/// Load the workbook at `source` and write its JSON export to `dest`.
///
/// The source is fully read and closed before `dest` is opened. On error the
/// destination is left as it was.
pub fn convert(
    source: &Path,
    dest: &Path,
    missing_markers: &[String],
) -> Result<ConversionSummary> {
    let workbook = excel::open_workbook(source, missing_markers)?;

    let sheet_count = json_export::export_workbook(&workbook, dest)?;
    info!(
        "Converted {} sheet(s) from {} to {}",
        sheet_count,
        source.display(),
        dest.display()
    );

    Ok(ConversionSummary {
        sheet_count,
        output_path: dest.to_path_buf(),
    })
}
