//! License plates: three letters followed by four digits (`ABC1234`).

use regex::Regex;

pub const PLATE_LEN: usize = 7;
const LETTERS: usize = 3;

/// Normalizes keyboard input: uppercases, then accepts letters only in the
/// first three positions and digits only in the next four. Characters that do
/// not fit the next open position are dropped.
#[must_use]
pub fn normalize_plate(raw: &str) -> String {
    let mut plate = String::with_capacity(PLATE_LEN);
    for c in raw.chars().flat_map(char::to_uppercase) {
        if plate.len() >= PLATE_LEN {
            break;
        }
        let fits = if plate.len() < LETTERS {
            c.is_ascii_uppercase()
        } else {
            c.is_ascii_digit()
        };
        if fits {
            plate.push(c);
        }
    }
    plate
}

/// True iff `value` is exactly three uppercase ASCII letters and four digits.
#[must_use]
pub fn validate_plate(value: &str) -> bool {
    Regex::new(r"^[A-Z]{3}[0-9]{4}$").map_or(false, |re| re.is_match(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateStatus {
    Empty,
    Missing(usize),
    Valid,
    Invalid,
}

impl PlateStatus {
    #[must_use]
    pub fn message(self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Missing(n) => Some(format!("Missing {n} characters")),
            Self::Valid => Some("Valid plate format".to_string()),
            Self::Invalid => Some("Incorrect plate format".to_string()),
        }
    }
}

/// Live feedback for partially typed plates.
#[must_use]
pub fn plate_status(value: &str) -> PlateStatus {
    let len = value.chars().count();
    if len == 0 {
        PlateStatus::Empty
    } else if len < PLATE_LEN {
        PlateStatus::Missing(PLATE_LEN - len)
    } else if len == PLATE_LEN && validate_plate(value) {
        PlateStatus::Valid
    } else {
        PlateStatus::Invalid
    }
}
