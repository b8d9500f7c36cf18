//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, Rate, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn ensure_non_negative(value: MoneyCents, label: &str) -> ResultEngine<()> {
    if value.is_negative() {
        return Err(EngineError::InvalidSettings(format!(
            "{label} must be >= 0"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_positive_rate(value: Rate, label: &str) -> ResultEngine<()> {
    if !value.is_positive() {
        return Err(EngineError::InvalidSettings(format!(
            "{label} must be > 0"
        )));
    }
    Ok(())
}
