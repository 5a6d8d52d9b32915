//! Internal helpers for input normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules.

use crate::{EngineError, Money, ResultEngine};

/// Trim a required text field, rejecting empty values.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text; blank becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn overflow(label: &str) -> EngineError {
    EngineError::Validation(format!("{label} overflows"))
}

/// `total + (add - sub)`, treating overflow as invalid input.
///
/// The difference is taken first, so only the net change has to fit.
pub(crate) fn adjust_total(total: Money, add: Money, sub: Money) -> ResultEngine<Money> {
    add.checked_sub(sub)
        .and_then(|diff| total.checked_add(diff))
        .ok_or_else(|| overflow("total sum"))
}
