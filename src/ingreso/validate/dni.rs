//! National identity number (DNI) checks. These are UX checks only; the
//! backend stays authoritative for whether a person exists.
//!
//! Layout: `DDMMYYYYNNNNN` where `DD` is the department (01-18), `MM` the
//! municipality (01-99) and `YYYY` the registration birth year.

use thiserror::Error;

pub const DNI_LEN: usize = 13;
const MIN_BIRTH_YEAR: u32 = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DniError {
    #[error("DNI must contain only digits")]
    NotNumeric,
    #[error("DNI must have exactly 13 digits")]
    Length,
    #[error("Invalid DNI format")]
    Department,
    #[error("Invalid DNI format")]
    Municipality,
    #[error("Invalid DNI format")]
    BirthYear,
}

fn segment(value: &str, range: std::ops::Range<usize>) -> u32 {
    value
        .get(range)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Validates a DNI against `current_year` for the birth-year segment.
///
/// # Errors
/// Returns the first failing rule, in the order digits, length, department,
/// municipality, birth year.
pub fn validate_dni(value: &str, current_year: i32) -> Result<(), DniError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(DniError::NotNumeric);
    }

    if value.len() != DNI_LEN {
        return Err(DniError::Length);
    }

    if !(1..=18).contains(&segment(value, 0..2)) {
        return Err(DniError::Department);
    }

    if !(1..=99).contains(&segment(value, 2..4)) {
        return Err(DniError::Municipality);
    }

    let year = segment(value, 4..8);
    let max_year = u32::try_from(current_year).unwrap_or(0);
    if year < MIN_BIRTH_YEAR || year > max_year {
        return Err(DniError::BirthYear);
    }

    Ok(())
}

/// Filters keystrokes the way the DNI field does: digits only, at most 13.
#[must_use]
pub fn sanitize_dni_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(DNI_LEN)
        .collect()
}
