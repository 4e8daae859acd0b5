//! Structural validation of the grading API payload
//!
//! The client hands over the body as an untyped `serde_json::Value`. Nothing
//! downstream indexes into it before it has passed through [`validate`].

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// A homework entry that is known to be an object, fields still unchecked
pub type RawHomework = Map<String, Value>;

/// Payload that passed the structural checks
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    /// Homework entries in the order the API returned them
    pub homeworks: Vec<RawHomework>,
    /// Server time of the response, `None` when it is not an integer
    pub current_date: Option<i64>,
}

impl ValidatedResponse {
    /// The entry the bot reports on, if any
    pub fn latest(&self) -> Option<&RawHomework> {
        self.homeworks.first()
    }
}

/// Checks the shape of a decoded API response
///
/// Checks run in order and the first violation wins:
/// 1. the payload is an object
/// 2. it has `homeworks` and `current_date`
/// 3. `homeworks` is a list
/// 4. every entry of `homeworks` is an object
///
/// An empty `homeworks` list is valid.
pub fn validate(response: &Value) -> Result<ValidatedResponse, SchemaError> {
    let object = response.as_object().ok_or(SchemaError::NotAnObject)?;

    for key in ["homeworks", "current_date"] {
        if !object.contains_key(key) {
            return Err(SchemaError::MissingKey(key));
        }
    }

    let entries = object["homeworks"]
        .as_array()
        .ok_or(SchemaError::HomeworksNotAList)?;

    let homeworks = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .as_object()
                .cloned()
                .ok_or(SchemaError::HomeworkNotAnObject(index))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedResponse {
        homeworks,
        current_date: object["current_date"].as_i64(),
    })
}
