mod cell;
mod sheet;
mod workbook;

pub use cell::{
    CellValue, MAX_EXACT_INTEGER, datetime_from_serial, duration_from_serial, time_from_serial,
};
pub use sheet::{Table, create_table_from_range};
pub use workbook::{Workbook, open_workbook};
