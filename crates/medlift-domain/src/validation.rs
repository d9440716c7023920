//! Validation primitives shared by every entity.

use std::ops::RangeInclusive;

use crate::error::{DomainError, DomainResult};

/// Check that `value` lies inside `range` and narrow it to `i32`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidInputFormat`] naming the field and the
/// accepted range when the value is out of bounds.
pub fn bounded(field: &str, value: i64, range: RangeInclusive<i32>) -> DomainResult<i32> {
    match i32::try_from(value) {
        Ok(narrowed) if range.contains(&narrowed) => Ok(narrowed),
        _ => Err(DomainError::invalid_input(
            value.to_string(),
            format!("{field} between {} and {}", range.start(), range.end()),
        )),
    }
}

/// Character-class patterns used for medication identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Upper-case letters, digits and underscore
    Code,
    /// Letters of either case, digits, hyphen and underscore
    Name,
}

impl Pattern {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "[A-Z0-9_]+",
            Self::Name => "[A-Za-z0-9-_]+",
        }
    }

    const fn accepts(self, c: char) -> bool {
        match self {
            Self::Code => c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_',
            Self::Name => c.is_ascii_alphanumeric() || c == '-' || c == '_',
        }
    }

    /// Whole-string match; the empty string never matches.
    #[must_use]
    pub fn matches(self, input: &str) -> bool {
        !input.is_empty() && input.chars().all(|c| self.accepts(c))
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInputFormat`] when `input` does not match.
    pub fn check(self, input: &str) -> DomainResult<()> {
        if self.matches(input) {
            Ok(())
        } else {
            Err(DomainError::invalid_input(input, self.as_str()))
        }
    }
}
