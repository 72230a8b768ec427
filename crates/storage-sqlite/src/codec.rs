//! Helpers for TEXT-encoded columns.

use milkline_core::errors::DatabaseError;
use milkline_core::{Error, Result};
use rust_decimal::Decimal;

/// Serialize a unit enum to its serde string form without the quotes.
pub fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

/// Parse an enum column written by [`enum_to_db`].
pub fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

/// Decimals are stored as their exact text form.
pub fn decimal_to_db(value: Decimal) -> String {
    value.to_string()
}

pub fn decimal_from_db(value: &str) -> Result<Decimal> {
    value.parse().map_err(|_| {
        Error::Database(DatabaseError::Internal(format!(
            "Invalid decimal '{}' in local store",
            value
        )))
    })
}
