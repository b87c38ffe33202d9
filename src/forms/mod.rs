//! Form definitions backing the admin pages and the JSON API.
//!
//! Raw forms are deserialized from the request and converted into typed
//! payloads with `TryFrom`, so that services only ever see validated values.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::domain::sort::{SortField, SortKey};
use crate::domain::types::TypeConstraintError;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, PageRequest};

pub mod api;
pub mod auth;
pub mod clients;
pub mod fosters;
pub mod pets;
pub mod users;

/// Shortest password accepted at registration or reset.
pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid {field}: {source}")]
    Field {
        field: &'static str,
        source: TypeConstraintError,
    },

    #[error("invalid {0}: expected a YYYY-MM-DD date")]
    InvalidDate(&'static str),

    #[error("invalid {0}: expected a number")]
    InvalidNumber(&'static str),

    #[error("unknown sort order `{0}`")]
    InvalidSortOrder(String),

    #[error("missing record version")]
    MissingVersion,

    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Builds a closure tagging a [`TypeConstraintError`] with the offending field.
pub(crate) fn field_error(field: &'static str) -> impl Fn(TypeConstraintError) -> FormError {
    move |source| FormError::Field { field, source }
}

/// Treats blank strings in query strings and forms as absent values.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FormError::InvalidDate(field))
}

pub(crate) fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, FormError> {
    value.map(|value| parse_date(field, value)).transpose()
}

pub(crate) fn parse_optional_number<T: std::str::FromStr>(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, FormError> {
    value
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| FormError::InvalidNumber(field))
        })
        .transpose()
}

/// Parses a closed sort key; absent means ascending primary key.
pub(crate) fn parse_sort<F: SortField>(value: Option<&str>) -> Result<SortKey<F>, FormError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidSortOrder(raw.to_string())),
        None => Ok(SortKey::default()),
    }
}

/// Reads `pageNumber`/`pageSize`, defaulting to the first page of
/// [`DEFAULT_ITEMS_PER_PAGE`] items.
pub(crate) fn parse_page(
    page_number: Option<&str>,
    page_size: Option<&str>,
) -> Result<PageRequest, FormError> {
    let page = parse_optional_number::<usize>("pageNumber", page_number)?.unwrap_or(1);
    let per_page =
        parse_optional_number::<usize>("pageSize", page_size)?.unwrap_or(DEFAULT_ITEMS_PER_PAGE);
    Ok(PageRequest::new(page, per_page))
}

/// URL-encodes a filter form for links that keep the current filters.
pub(crate) fn encode_query<T: Serialize>(form: &T) -> String {
    serde_html_form::to_string(form).unwrap_or_default()
}

/// At least [`MIN_PASSWORD_CHARS`] characters with one digit and one
/// uppercase letter.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::new("password_too_short")
            .with_message("Password must be at least 8 characters long.".into()));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_no_digit")
            .with_message("Password must contain a digit.".into()));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(ValidationError::new("password_no_uppercase")
            .with_message("Password must contain an uppercase letter.".into()));
    }
    Ok(())
}
