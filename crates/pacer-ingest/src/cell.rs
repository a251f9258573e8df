//! Raw cell values and the two cleaning rules applied to them.

use chrono::NaiveDateTime;

/// A single cell as read from a spreadsheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    /// Whole number stored without a fraction (zipped format only).
    Integer(i64),
    Number(f64),
    Bool(bool),
    /// Date-typed cell; only the zipped format produces these.
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Value text used for field values and footer content.
    ///
    /// Integral numbers lose their fractional part, text is trimmed and the
    /// literal `None` counts as empty.
    pub fn cleaned(&self) -> String {
        let text = match self {
            Self::Empty => return String::new(),
            Self::Number(value) => return format_number(*value),
            Self::Integer(value) => return value.to_string(),
            Self::Text(text) => text.trim(),
            Self::Bool(true) => "True",
            Self::Bool(false) => "False",
            Self::DateTime(value) => return format_datetime(value),
        };
        if text == "None" {
            String::new()
        } else {
            text.to_string()
        }
    }

    /// Label text used for header matching and anchors.
    ///
    /// Zero and false read as empty. Floats keep their float form (`3.0`),
    /// integers do not.
    pub fn label(&self) -> String {
        match self {
            Self::Empty | Self::Bool(false) | Self::Integer(0) => String::new(),
            Self::Integer(value) => value.to_string(),
            Self::Number(value) if *value == 0.0 => String::new(),
            Self::Number(value) => float_text(*value),
            Self::Text(text) => text.trim().to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::DateTime(value) => format_datetime(value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Integer text for integral values, shortest decimal text otherwise.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        if value.abs() < 1e15 {
            return (value as i64).to_string();
        }
        return format!("{value:.0}");
    }
    value.to_string()
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn format_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}
