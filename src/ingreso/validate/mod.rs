pub mod dni;
pub mod plate;
pub mod vehicle;

pub use self::dni::{sanitize_dni_input, validate_dni, DniError};
pub use self::plate::{normalize_plate, plate_status, validate_plate, PlateStatus};
pub use self::vehicle::{normalize_name, Choice};

use regex::Regex;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Trims a free-text field, treating blank input as missing.
#[must_use]
pub fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
