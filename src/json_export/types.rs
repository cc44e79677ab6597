use indexmap::IndexMap;
use serde_json::Value;

/// One exported row: column name to JSON value, in column order.
pub type Record = IndexMap<String, Value>;

pub type OrderedSheetData = Vec<Record>;

/// Sheet name to its records, in workbook order.
pub type ExportDocument = IndexMap<String, OrderedSheetData>;
