//! Canonical photo identifiers from raw cell values.

use crate::sheet::CellValue;

/// Turn a photo cell into the identifier used to build its file name.
///
/// Numbers are truncated toward zero (`42.9` becomes `"42"`). Text that reads as a
/// whole number written with a fraction (`"12.0"`) keeps only the part before the
/// point; any other text passes through untouched and may simply fail to resolve
/// later. Returns `None` only for absent cells.
pub fn normalize(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Absent => None,
        CellValue::Integer(i) => Some(i.to_string()),
        CellValue::Decimal(f) => Some(truncate(*f)),
        CellValue::Text(s) => Some(normalize_text(s)),
    }
}

fn truncate(f: f64) -> String {
    let whole = f.trunc();
    if whole.is_finite() && whole.abs() < i64::MAX as f64 {
        (whole as i64).to_string()
    } else {
        f.to_string()
    }
}

fn normalize_text(s: &str) -> String {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }

    // hand-typed cells often carry stray padding around the number
    let trimmed = s.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => match trimmed.find('.') {
            Some(point) => trimmed[..point].to_string(),
            None => trimmed.to_string(),
        },
        _ => s.to_string(),
    }
}
