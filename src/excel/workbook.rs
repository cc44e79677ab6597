use std::fs::File;
use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use indexmap::IndexMap;
use log::{debug, info};

use crate::error::{ConvertError, Result};
use crate::excel::{Table, create_table_from_range};

/// All sheets of a workbook, in the order they are stored in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: IndexMap<String, Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, table: Table) {
        self.sheets.insert(name.into(), table);
    }

    pub fn get_sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/// Read every sheet of the spreadsheet at `path` into memory.
///
/// The file handle is released before this returns.
pub fn open_workbook<P: AsRef<Path>>(path: P, missing_markers: &[String]) -> Result<Workbook> {
    let path = path.as_ref();

    check_readable(path)?;

    let mut reader =
        open_workbook_auto(path).map_err(|source| ConvertError::UnsupportedFormat {
            path: path.to_path_buf(),
            source,
        })?;

    let sheet_names = reader.sheet_names();
    info!(
        "Opened workbook {} with {} sheet(s)",
        path.display(),
        sheet_names.len()
    );

    let mut workbook = Workbook::new();

    for name in sheet_names {
        let range = reader
            .worksheet_range(&name)
            .map_err(|source| ConvertError::CorruptDocument {
                sheet: name.clone(),
                source,
            })?;

        let table = create_table_from_range(&range, missing_markers);
        debug!(
            "Loaded sheet '{}': {} column(s), {} row(s)",
            name,
            table.columns.len(),
            table.row_count()
        );

        workbook.add_sheet(name, table);
    }

    info!("Loaded sheets: {}", workbook.get_sheet_names().join(", "));

    Ok(workbook)
}

fn check_readable(path: &Path) -> Result<()> {
    let not_found = |source| ConvertError::SourceNotFound {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(not_found)?;
    if !metadata.is_file() {
        return Err(not_found(std::io::Error::other("not a regular file")));
    }

    File::open(path).map(drop).map_err(not_found)
}
