//! Error types for response validation and status translation

use thiserror::Error;

/// A structural violation in the API payload
///
/// Each variant names the expectation that was not met, so the text can be
/// forwarded to the operator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The top-level payload is a scalar or a list
    #[error("Ответ API не является словарем")]
    NotAnObject,

    /// A required top-level key is absent
    #[error("В ответе API отсутствует ключ \"{0}\"")]
    MissingKey(&'static str),

    /// `homeworks` is present but is not a list
    #[error("Значение ключа \"homeworks\" ответа API не является списком")]
    HomeworksNotAList,

    /// An entry of `homeworks` is not an object
    #[error("Домашняя работа с индексом {0} не является словарем")]
    HomeworkNotAnObject(usize),

    /// A homework entry lacks a required key
    #[error("В ответе API домашней работы отсутствует ключ \"{0}\"")]
    MissingHomeworkKey(&'static str),

    /// A homework entry carries a required key with a non-string value
    #[error("Ключ \"{0}\" домашней работы не является строкой")]
    InvalidHomeworkKey(&'static str),
}

/// Failure to turn a homework entry into a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The status is not one of the known review statuses
    #[error("Неизвестный статус домашней работы: {0}")]
    UnknownStatus(String),
}
