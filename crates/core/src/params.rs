//! Query-string helpers shared by the overview and user filter objects.
//!
//! The dashboard sends its whole filter object on every request, with unset
//! fields as empty strings (`role=&minSessions=&createdFrom=`).
//! [`blank_as_none`] reads those as `None`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};

use crate::error::CoreError;

/// Oldest year accepted in a date filter.
pub const MIN_QUERY_YEAR: i32 = 1900;
/// Latest year accepted in a date filter.
pub const MAX_QUERY_YEAR: i32 = 9999;

#[derive(Deserialize)]
#[serde(untagged)]
enum BlankOr<T> {
    Value(T),
    Text(String),
}

/// `deserialize_with` helper: blank strings become `None`, other strings
/// are parsed with [`FromStr`].
///
/// Query strings carry every value as text, so numbers, booleans and enum
/// names all arrive through the `Text` branch there. JSON values of the
/// right type are taken directly.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<BlankOr<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BlankOr::Value(value)) => Ok(Some(value)),
        Some(BlankOr::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|err| de::Error::custom(format!("invalid value '{text}': {err}")))
        }
    }
}

/// [`FromStr`] for unit enums through their serde names.
pub(crate) fn parse_serde_name<T: DeserializeOwned>(raw: &str) -> Result<T, ValueError> {
    T::deserialize(StrDeserializer::<ValueError>::new(raw))
}

/// Reject dates outside [`MIN_QUERY_YEAR`]..=[`MAX_QUERY_YEAR`].
pub fn check_query_date(field: &str, date: Option<NaiveDate>) -> Result<(), CoreError> {
    match date {
        Some(date) if !(MIN_QUERY_YEAR..=MAX_QUERY_YEAR).contains(&date.year()) => {
            Err(CoreError::Validation(format!(
                "{field} must be between years {MIN_QUERY_YEAR} and {MAX_QUERY_YEAR}"
            )))
        }
        _ => Ok(()),
    }
}
