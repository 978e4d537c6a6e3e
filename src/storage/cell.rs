//! CSV cell encoding that keeps null distinct from the empty string.
//!
//! Null is written as `\N`. Text that starts with a backslash gets one extra
//! leading backslash so it can never be mistaken for the null marker.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use csv::StringRecord;

use crate::error::{AppError, Result};

/// Marker written for a null cell.
pub const NULL: &str = "\\N";

/// Encode an optional text value.
pub fn encode(value: Option<&str>) -> String {
    match value {
        None => NULL.to_string(),
        Some(text) if text.starts_with('\\') => format!("\\{text}"),
        Some(text) => text.to_string(),
    }
}

/// Encode an optional number.
pub fn encode_num<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NULL.to_string(), |v| v.to_string())
}

/// Decode a text cell.
pub fn decode(cell: &str) -> Option<String> {
    if cell == NULL {
        None
    } else if let Some(rest) = cell.strip_prefix('\\') {
        Some(rest.to_string())
    } else {
        Some(cell.to_string())
    }
}

/// Column positions looked up by header name.
#[derive(Debug, Clone)]
pub struct Columns {
    positions: HashMap<String, usize>,
}

impl Columns {
    pub fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Raw cell for `name`, failing when the column or cell is missing.
    pub fn raw<'r>(&self, record: &'r StringRecord, name: &str) -> Result<&'r str> {
        self.position(name)
            .and_then(|i| record.get(i))
            .ok_or_else(|| AppError::decode("csv row", format!("missing column '{name}'")))
    }

    pub fn text(&self, record: &StringRecord, name: &str) -> Result<Option<String>> {
        Ok(decode(self.raw(record, name)?))
    }

    pub fn required_text(&self, record: &StringRecord, name: &str) -> Result<String> {
        self.text(record, name)?
            .ok_or_else(|| AppError::decode("csv row", format!("column '{name}' is null")))
    }

    pub fn num<T>(&self, record: &StringRecord, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.raw(record, name)? {
            NULL => Ok(None),
            cell => cell
                .parse()
                .map(Some)
                .map_err(|e| AppError::decode("csv row", format!("column '{name}': {e}"))),
        }
    }

    pub fn required_num<T>(&self, record: &StringRecord, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.num(record, name)?
            .ok_or_else(|| AppError::decode("csv row", format!("column '{name}' is null")))
    }
}
