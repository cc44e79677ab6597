mod converters;
mod exporters;
mod types;

pub use converters::process_cell_value;
pub use exporters::{
    export_workbook, generate_all_sheets_json, process_sheet_for_json, serialize_to_json,
    write_json_to_file,
};
pub use types::{ExportDocument, OrderedSheetData, Record};
