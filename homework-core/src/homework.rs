//! Homework records and status translation

use serde_json::Value;

use crate::error::{SchemaError, TranslateError};
use crate::response::RawHomework;
use crate::status::HomeworkStatus;

/// A homework entry with its required fields checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub homework_name: String,
    /// Raw status code; may be outside the known set
    pub status: String,
}

impl HomeworkRecord {
    /// Extracts the required fields from an unchecked entry
    pub fn from_raw(raw: &RawHomework) -> Result<Self, SchemaError> {
        Ok(Self {
            homework_name: required_str(raw, "homework_name")?.to_string(),
            status: required_str(raw, "status")?.to_string(),
        })
    }

    /// Renders the notification for this record
    pub fn message(&self) -> Result<String, TranslateError> {
        let status: HomeworkStatus = self
            .status
            .parse()
            .map_err(TranslateError::UnknownStatus)?;

        Ok(format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.homework_name,
            status.verdict()
        ))
    }
}

fn required_str<'a>(raw: &'a RawHomework, key: &'static str) -> Result<&'a str, SchemaError> {
    match raw.get(key) {
        None => Err(SchemaError::MissingHomeworkKey(key)),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(SchemaError::InvalidHomeworkKey(key)),
    }
}

/// Maps an unchecked homework entry to its notification message
pub fn translate(raw: &RawHomework) -> Result<String, TranslateError> {
    HomeworkRecord::from_raw(raw)?.message()
}
