//! Vehicle form catalog and reference-name matching.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub const OTHER: &str = "Other";

pub const MAKES: &[&str] = &[
    "Toyota",
    "Honda",
    "Nissan",
    "Mazda",
    "Hyundai",
    "Kia",
    "Ford",
    "Chevrolet",
    "Mitsubishi",
    "Suzuki",
];

const MODELS: &[(&str, &[&str])] = &[
    (
        "Toyota",
        &["Corolla", "Camry", "RAV4", "Hilux", "Prado", "Yaris", "4Runner", "Tacoma"],
    ),
    (
        "Honda",
        &["Civic", "Accord", "CR-V", "HR-V", "Pilot", "Fit", "Odyssey"],
    ),
    (
        "Nissan",
        &["Sentra", "Altima", "Versa", "Kicks", "X-Trail", "Frontier", "Pathfinder"],
    ),
    ("Mazda", &["Mazda3", "Mazda6", "CX-3", "CX-5", "CX-9", "BT-50"]),
    (
        "Hyundai",
        &["Accent", "Elantra", "Tucson", "Santa Fe", "Creta", "Kona"],
    ),
    ("Kia", &["Rio", "Forte", "Sportage", "Sorento", "Seltos", "Soul"]),
    (
        "Ford",
        &["Fiesta", "Focus", "Escape", "Explorer", "F-150", "Ranger", "Mustang"],
    ),
    (
        "Chevrolet",
        &["Spark", "Cruze", "Equinox", "Traverse", "Silverado", "Colorado"],
    ),
    ("Mitsubishi", &["Mirage", "Lancer", "Outlander", "Montero", "L200"]),
    ("Suzuki", &["Swift", "Vitara", "Jimny", "Ertiga", "Ciaz"]),
];

pub const COLORS: &[&str] = &[
    "Blanco", "Negro", "Gris", "Plata", "Rojo", "Azul", "Verde", "Amarillo", "Naranja", "Café",
];

/// Models listed for a catalog make; empty for unknown makes.
#[must_use]
pub fn models_for(make: &str) -> &'static [&'static str] {
    MODELS
        .iter()
        .find(|(name, _)| *name == make)
        .map_or(&[], |(_, models)| models)
}

/// A select field with a free-text escape hatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Listed(String),
    Other(String),
}

impl Choice {
    /// Parses kiosk input: a listed value, or `Other: <text>` / `other <text>`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let prefix = OTHER.len();
        match (trimmed.get(..prefix), trimmed.get(prefix..)) {
            (Some(head), Some(rest))
                if head.eq_ignore_ascii_case(OTHER)
                    && (rest.is_empty() || rest.starts_with([':', ' '])) =>
            {
                Self::Other(rest.trim_start_matches([':', ' ']).trim().to_string())
            }
            _ => Self::Listed(trimmed.to_string()),
        }
    }

    /// Resolves the choice against `options`.
    ///
    /// # Errors
    /// Returns the user-facing message for the field `label`.
    pub fn resolve(&self, label: &str, options: &[&str]) -> Result<String, String> {
        match self {
            Self::Other(text) if text.trim().is_empty() => Err(format!("Please specify the {label}")),
            Self::Other(text) => Ok(text.trim().to_string()),
            Self::Listed(value) if value.trim().is_empty() => Err(format!("Please select the {label}")),
            Self::Listed(value) => options
                .iter()
                .find(|option| normalize_name(option) == normalize_name(value))
                .map(|option| (*option).to_string())
                .ok_or_else(|| format!("Unknown {label}: {value}")),
        }
    }
}

/// Case, accent and dash-insensitive key used to match reference data.
#[must_use]
pub fn normalize_name(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect()
}
