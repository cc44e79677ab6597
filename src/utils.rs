/// Spreadsheet column letters for a zero-based column index (0 -> A, 26 -> AA).
#[must_use]
pub fn index_to_col_name(index: usize) -> String {
    let mut col_name = String::new();
    let mut n = index + 1;

    while n > 0 {
        let remainder = (n - 1) % 26;
        col_name.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }

    col_name
}

// Format a zero-based (row, col) position as a cell reference (e.g. (1, 1) -> B2)
#[must_use]
pub fn cell_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col_name(col), row + 1)
}
