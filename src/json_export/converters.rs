use serde_json::{Value, json};

use crate::excel::{CellValue, MAX_EXACT_INTEGER};

/// Convert a loaded cell into its JSON form.
///
/// Missing values become `0` whatever the column holds otherwise. Dates, times
/// and durations are written as strings. Returns the reason when the value has
/// no JSON form.
pub fn process_cell_value(cell: &CellValue) -> Result<Value, String> {
    if cell.is_missing() {
        return Ok(json!(0));
    }

    match cell {
        CellValue::Int(i) => Ok(json!(i)),
        CellValue::Float(f) => {
            if !f.is_finite() {
                Err(format!("number {} has no JSON representation", f))
            } else if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER {
                Ok(json!(f.trunc() as i64))
            } else {
                Ok(json!(f))
            }
        }
        CellValue::Text(s) => Ok(json!(s)),
        CellValue::Bool(b) => Ok(json!(b)),
        CellValue::DateTime(_) | CellValue::Time(_) | CellValue::Duration(_) => {
            Ok(json!(cell.to_string()))
        }
        CellValue::Empty | CellValue::Error(_) => Ok(json!(0)),
    }
}
