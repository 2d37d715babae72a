use calamine::Data;

/// A spreadsheet cell as seen by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
    /// Empty, blank, NaN or an error cell.
    Absent,
}

impl CellValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Plain rendering for text columns such as `Name` and `Email`.
    pub fn render(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Decimal(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Absent => String::new(),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Absent,
            Data::Int(i) => CellValue::Integer(*i),
            Data::Float(f) if f.is_nan() => CellValue::Absent,
            Data::Float(f) => CellValue::Decimal(*f),
            Data::String(s) if s.trim().is_empty() => CellValue::Absent,
            Data::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Decimal(f)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}
