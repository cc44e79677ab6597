use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::excel::{Table, Workbook};
use crate::json_export::converters::process_cell_value;
use crate::json_export::types::{ExportDocument, OrderedSheetData};
use crate::utils::cell_reference;

const INDENT: &[u8] = b"    ";

/// Serialize with four-space indentation. Non-ASCII text is kept as is.
pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    let mut buf = Vec::with_capacity(4096);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));

    data.serialize(&mut serializer)
        .map_err(|e| ConvertError::Serialization {
            location: "document".to_string(),
            reason: e.to_string(),
        })?;

    String::from_utf8(buf).map_err(|e| ConvertError::Serialization {
        location: "document".to_string(),
        reason: e.to_string(),
    })
}

/// Replace `path` with the JSON form of `data`.
///
/// The text goes to a temporary file next to `path` first and is renamed into
/// place, so on failure the previous file (if any) is left untouched.
pub fn write_json_to_file<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let json_string = serialize_to_json(data)?;

    let unwritable = |source: io::Error| ConvertError::DestinationUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(unwritable)?;

    file.write_all(json_string.as_bytes()).map_err(unwritable)?;
    if let Some(permissions) = destination_permissions(path) {
        file.as_file()
            .set_permissions(permissions)
            .map_err(unwritable)?;
    }
    file.as_file().sync_all().map_err(unwritable)?;

    file.persist(path).map_err(|e| unwritable(e.error))?;

    info!("Wrote {} bytes to {}", json_string.len(), path.display());

    Ok(())
}

// Keep the mode of the file being replaced; new files are world-readable
fn destination_permissions(path: &Path) -> Option<Permissions> {
    if let Ok(metadata) = fs::metadata(path) {
        return Some(metadata.permissions());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(Permissions::from_mode(0o644))
    }

    #[cfg(not(unix))]
    {
        None
    }
}

/// Turn one table into records, one per row, with missing values set to `0`.
pub fn process_sheet_for_json(sheet_name: &str, table: &Table) -> Result<OrderedSheetData> {
    let mut sheet_data = Vec::with_capacity(table.row_count());

    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut row_data = IndexMap::with_capacity(table.columns.len());

        for (col_idx, (header, cell)) in table.columns.iter().zip(row).enumerate() {
            let json_value =
                process_cell_value(cell).map_err(|reason| ConvertError::Serialization {
                    // Data rows start below the header row
                    location: format!(
                        "sheet '{}', cell {} (column '{}')",
                        sheet_name,
                        cell_reference(table.origin.0 + row_idx + 1, table.origin.1 + col_idx),
                        header
                    ),
                    reason,
                })?;

            row_data.insert(header.clone(), json_value);
        }

        sheet_data.push(row_data);
    }

    Ok(sheet_data)
}

pub fn generate_all_sheets_json(workbook: &Workbook) -> Result<ExportDocument> {
    let mut all_sheets = IndexMap::with_capacity(workbook.sheet_count());

    for (sheet_name, table) in &workbook.sheets {
        let sheet_data = process_sheet_for_json(sheet_name, table)?;
        debug!("Exported sheet '{}': {} record(s)", sheet_name, sheet_data.len());
        all_sheets.insert(sheet_name.clone(), sheet_data);
    }

    Ok(all_sheets)
}

/// Export all sheets to a single JSON file, returning the number of sheets written.
pub fn export_workbook(workbook: &Workbook, path: &Path) -> Result<usize> {
    let all_sheets = generate_all_sheets_json(workbook)?;

    write_json_to_file(&all_sheets, path)?;

    Ok(all_sheets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::CellValue;

    fn staff_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        workbook.add_sheet(
            "Staff",
            Table::new(
                vec!["Name".to_string(), "HoursWorked".to_string()],
                vec![
                    vec![CellValue::Text("Alice".to_string()), CellValue::Float(37.5)],
                    vec![CellValue::Text("Bob".to_string()), CellValue::Float(f64::NAN)],
                ],
            ),
        );
        workbook
    }

    #[test]
    fn test_staff_document() {
        let document = generate_all_sheets_json(&staff_workbook()).unwrap();
        let json = serialize_to_json(&document).unwrap();

        let expected = r#"{
    "Staff": [
        {
            "Name": "Alice",
            "HoursWorked": 37.5
        },
        {
            "Name": "Bob",
            "HoursWorked": 0
        }
    ]
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_empty_workbook() {
        let document = generate_all_sheets_json(&Workbook::new()).unwrap();
        assert_eq!(serialize_to_json(&document).unwrap(), "{}");
    }

    #[test]
    fn test_column_order_and_coverage() {
        let columns: Vec<String> = ["Zulu", "Alpha", "Mike"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let table = Table::new(
            columns.clone(),
            vec![vec![CellValue::Empty, CellValue::Bool(true), CellValue::Int(7)]; 3],
        );

        let records = process_sheet_for_json("Codes", &table).unwrap();
        assert_eq!(records.len(), 3);
        for record in &records {
            let keys: Vec<&String> = record.keys().collect();
            assert_eq!(keys, columns.iter().collect::<Vec<_>>());
            assert_eq!(record["Zulu"], serde_json::json!(0));
        }
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(
            "Équipe",
            Table::new(
                vec!["Nom".to_string()],
                vec![vec![CellValue::Text("José Müller 日本".to_string())]],
            ),
        );

        let json = serialize_to_json(&generate_all_sheets_json(&workbook).unwrap()).unwrap();
        assert!(json.contains("\"Équipe\""));
        assert!(json.contains("José Müller 日本"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_unrepresentable_value_names_location() {
        let mut workbook = Workbook::new();
        workbook.add_sheet(
            "Totals",
            Table::new(vec!["Sum".to_string()], vec![vec![CellValue::Float(f64::INFINITY)]]),
        );

        let err = generate_all_sheets_json(&workbook).unwrap_err();
        match err {
            ConvertError::Serialization { location, .. } => {
                assert_eq!(location, "sheet 'Totals', cell A2 (column 'Sum')");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_export_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "previous").unwrap();

        let mut workbook = staff_workbook();
        workbook.add_sheet(
            "Broken",
            Table::new(vec!["X".to_string()], vec![vec![CellValue::Float(f64::NEG_INFINITY)]]),
        );

        assert!(export_workbook(&workbook, &path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    }

    #[test]
    fn test_write_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "x".repeat(10_000)).unwrap();

        let count = export_workbook(&staff_workbook(), &path).unwrap();
        assert_eq!(count, 1);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with('{') && written.ends_with('}'));
        assert!(!written.contains('x'));

        // No temporary files are left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = export_workbook(&staff_workbook(), &path).unwrap_err();
        assert!(matches!(err, ConvertError::DestinationUnwritable { .. }));
        assert!(!path.exists());
    }
}
