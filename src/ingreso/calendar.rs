//! Academic calendar and campus opening hours.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Trimester-style academic period (1-3).
    Period,
    /// Semester (1-2).
    Semester,
}

impl PeriodKind {
    #[must_use]
    pub fn max(self) -> u8 {
        match self {
            Self::Period => 3,
            Self::Semester => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPeriod {
    pub kind: PeriodKind,
    pub number: u8,
}

impl AcademicPeriod {
    /// Period in effect on `date`: Jan 1 - May 15 is 1, May 16 - Aug 31 is 2,
    /// Sep - Dec is 3.
    #[must_use]
    pub fn current_period(date: NaiveDate) -> Self {
        let number = match (date.month(), date.day()) {
            (1..=4, _) | (5, 1..=15) => 1,
            (5..=8, _) => 2,
            _ => 3,
        };
        Self {
            kind: PeriodKind::Period,
            number,
        }
    }

    /// Semester in effect on `date`: January to June is 1, otherwise 2.
    #[must_use]
    pub fn current_semester(date: NaiveDate) -> Self {
        Self {
            kind: PeriodKind::Semester,
            number: if date.month() <= 6 { 1 } else { 2 },
        }
    }

    /// Default selection for `kind` on `date`.
    #[must_use]
    pub fn current(kind: PeriodKind, date: NaiveDate) -> Self {
        match kind {
            PeriodKind::Period => Self::current_period(date),
            PeriodKind::Semester => Self::current_semester(date),
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        (1..=self.kind.max()).contains(&self.number)
    }
}

impl fmt::Display for AcademicPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PeriodKind::Period => write!(f, "Period {}", self.number),
            PeriodKind::Semester => write!(f, "Semester {}", self.number),
        }
    }
}

impl FromStr for AcademicPeriod {
    type Err = String;

    /// Parses `period:2` or `semester:1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, number) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <period|semester>:<n>, got {s}"))?;
        let kind = match kind.trim().to_lowercase().as_str() {
            "period" => PeriodKind::Period,
            "semester" => PeriodKind::Semester,
            other => return Err(format!("unknown period type: {other}")),
        };
        let number = number
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("invalid period number: {e}"))?;
        let period = Self { kind, number };
        if period.is_valid() {
            Ok(period)
        } else {
            Err(format!("{period} does not exist"))
        }
    }
}

/// Hours during which the campus admits entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpeningHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            open_hour: 6,
            close_hour: 22,
        }
    }
}

impl OpeningHours {
    #[must_use]
    pub fn is_open(&self, time: NaiveTime) -> bool {
        (self.open_hour..self.close_hour).contains(&time.hour())
    }

    /// Informational note shown on entry screens outside opening hours.
    #[must_use]
    pub fn closed_notice(&self, now: NaiveTime) -> Option<String> {
        if self.is_open(now) {
            None
        } else {
            Some(format!(
                "Note: the university is closed right now (hours: {:02}:00 - {:02}:00). \
                 You can register your entry for tomorrow.",
                self.open_hour, self.close_hour
            ))
        }
    }

    /// Checks a planned entry/exit window.
    ///
    /// # Errors
    /// Returns a user-facing message when the window is inverted or falls
    /// outside opening hours.
    pub fn check_window(&self, window: &TimeWindow) -> Result<(), String> {
        if window.exit <= window.entry {
            return Err("Exit time must be after entry time".to_string());
        }
        let close = NaiveTime::from_hms_opt(self.close_hour, 0, 0);
        let within = |time: NaiveTime| {
            time.hour() >= self.open_hour && close.map_or(false, |close| time <= close)
        };
        if !within(window.entry) || !within(window.exit) {
            return Err(format!(
                "Entry and exit must be between {:02}:00 and {:02}:00",
                self.open_hour, self.close_hour
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub entry: NaiveTime,
    pub exit: NaiveTime,
}

impl FromStr for TimeWindow {
    type Err = String;

    /// Parses `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (entry, exit) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got {s}"))?;
        let parse = |value: &str| {
            NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .map_err(|e| format!("invalid time {value}: {e}"))
        };
        Ok(Self {
            entry: parse(entry)?,
            exit: parse(exit)?,
        })
    }
}
