/// Strips byte-order marks and zero-width spaces that spreadsheet exports
/// leave in headers and cells, then trims.
pub(crate) fn normalize_cell(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Spreadsheet exports write missing numbers and text as `nan`.
pub(crate) fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}
