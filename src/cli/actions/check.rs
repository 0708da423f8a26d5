use crate::ingreso::validate::{normalize_plate, plate_status, validate_dni, PlateStatus};
use anyhow::{bail, Result};
use chrono::{Datelike, Local};

/// Validate a DNI offline.
/// # Errors
/// Returns an error describing why the DNI is invalid.
pub fn dni(value: &str) -> Result<()> {
    match validate_dni(value.trim(), Local::now().year()) {
        Ok(()) => {
            println!("{}: valid DNI", value.trim());
            Ok(())
        }
        Err(err) => bail!("{}: {err}", value.trim()),
    }
}

/// Normalize and validate a plate.
/// # Errors
/// Returns an error when the normalized plate is incomplete or malformed.
pub fn plate(value: &str) -> Result<()> {
    let normalized = normalize_plate(value);
    let status = plate_status(&normalized);
    let message = status
        .message()
        .unwrap_or_else(|| "Please enter a plate".to_string());

    if status == PlateStatus::Valid {
        println!("{normalized}: {message}");
        Ok(())
    } else {
        bail!("{normalized}: {message}")
    }
}
