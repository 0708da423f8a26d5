//! The contract every screen handler implements.
//!
//! A handler receives the whole session record and the user's input and
//! returns a [`Transition`]. It never touches the store or the location; the
//! router applies the transition.

use super::Step;
use crate::ingreso::{
    api::{types::ReportKind, ApiError, Backend},
    calendar::{AcademicPeriod, TimeWindow},
    capture::Photo,
    config::AppConfig,
    session::{EntryMethod, SessionRecord, StoreError},
    validate::Choice,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use secrecy::SecretString;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const CONNECTIVITY_MESSAGE: &str =
    "Could not connect to the server. Check your connection and try again.";

/// What the user submitted on the current screen.
#[derive(Debug)]
pub enum StepInput {
    Identify {
        dni: String,
    },
    Authenticate {
        password: SecretString,
    },
    /// Forward button on read-only screens.
    Continue,
    ChooseEntryMethod {
        method: EntryMethod,
        account_number: Option<String>,
    },
    RegisterVisitor(VisitorForm),
    RegisterVehicle(VehicleForm),
    /// `None` keeps the photo already on file.
    CapturePhoto {
        photo: Option<Photo>,
    },
    SubmitEntry(EntryForm),
    Login {
        account_number: String,
        password: SecretString,
    },
    Security(SecurityAction),
    Admin(AdminAction),
}

#[derive(Debug, Default)]
pub struct VisitorForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub visit_type: String,
    pub reason: String,
    pub photo: Option<Photo>,
}

#[derive(Debug)]
pub struct VehicleForm {
    pub plate: String,
    pub make: Choice,
    pub model: Choice,
    pub color: Choice,
    /// Defaults to the current year.
    pub year: Option<i32>,
}

#[derive(Debug, Default)]
pub struct EntryForm {
    pub reason: Option<String>,
    pub period: Option<AcademicPeriod>,
    pub planned: Option<TimeWindow>,
}

#[derive(Debug)]
pub enum SecurityAction {
    Lookup { dni: String },
    RegisterEntry,
    RegisterExit,
    Logout,
}

#[derive(Debug)]
pub enum AdminAction {
    Report(ReportKind),
    Logout,
}

/// Something to show the user without leaving the screen.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Message(String),
    Report { kind: ReportKind, rows: Vec<Value> },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Report { kind, rows } => write!(f, "{} {kind}", rows.len()),
        }
    }
}

#[derive(Debug)]
pub enum Transition {
    /// Remain on the current screen, optionally replacing the stored record.
    Stay {
        record: Option<SessionRecord>,
        notice: Option<Notice>,
    },
    Advance {
        to: Step,
        record: SessionRecord,
    },
    /// Workflow completed; the record is cleared.
    Finish { notice: Option<Notice> },
    /// Workflow dropped; the record is cleared and the entry point shown.
    Abandon,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Inactive(String),
    #[error("{0}")]
    Connectivity(String),
    #[error("{0}")]
    Backend(String),
    #[error("{0}")]
    ReferenceNotFound(String),
    #[error("Session not found. Please start again.")]
    NoSession,
    #[error("That action is not available on the {0} screen")]
    UnexpectedInput(Step),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StepError {
    /// Maps a backend failure: unreachable backends get the generic
    /// connectivity message, anything else is reported with `context`.
    #[must_use]
    pub fn from_api(err: &ApiError, context: &str) -> Self {
        if err.is_connectivity() {
            Self::Connectivity(CONNECTIVITY_MESSAGE.to_string())
        } else {
            Self::Backend(format!("{context}: {err}"))
        }
    }
}

/// Shared capabilities handed to every step.
pub struct StepContext<'a> {
    pub backend: &'a dyn Backend,
    pub config: &'a AppConfig,
    pub now: NaiveDateTime,
}

impl StepContext<'_> {
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

#[async_trait]
pub trait WorkflowStep: Send + Sync {
    fn step(&self) -> Step;

    /// Handles `input` for `record` and decides where the workflow goes next.
    ///
    /// # Errors
    /// Returns a `StepError` when the input is rejected; the user stays on
    /// the current screen and the stored record is left untouched.
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError>;
}
