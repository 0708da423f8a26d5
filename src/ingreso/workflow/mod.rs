//! Registration workflow: one handler per screen, sequenced by the router.
//!
//! ```text
//! Identify -> Authenticate -> RoleDashboard -> ChooseEntryMethod
//!          \-> RegisterVisitor ------------------^
//! ChooseEntryMethod -> [RegisterVehicle] -> [CapturePhoto] -> SubmitEntry -> Terminal
//! Login -> SecurityPanel | AdminPanel | ChooseEntryMethod
//! ```

pub mod router;
pub mod step;
pub mod steps;

pub use self::router::WorkflowRouter;
pub use self::step::{
    AdminAction, EntryForm, Notice, SecurityAction, StepContext, StepError, StepInput, Transition,
    VehicleForm, VisitorForm, WorkflowStep,
};

use crate::ingreso::session::SessionId;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Identify,
    Authenticate,
    RoleDashboard,
    ChooseEntryMethod,
    RegisterVisitor,
    RegisterVehicle,
    CapturePhoto,
    SubmitEntry,
    Terminal,
    Login,
    SecurityPanel,
    AdminPanel,
}

const ROUTES: &[(Step, &str)] = &[
    (Step::Identify, "/"),
    (Step::Authenticate, "/autenticacion"),
    (Step::RoleDashboard, "/dashboard"),
    (Step::ChooseEntryMethod, "/registro-entrada"),
    (Step::RegisterVisitor, "/registro-visita"),
    (Step::RegisterVehicle, "/registro-vehiculo"),
    (Step::CapturePhoto, "/captura-foto"),
    (Step::SubmitEntry, "/confirmar"),
    (Step::Terminal, "/fin"),
    (Step::Login, "/login"),
    (Step::SecurityPanel, "/seguridad"),
    (Step::AdminPanel, "/admin"),
];

impl Step {
    #[must_use]
    pub fn path(self) -> &'static str {
        ROUTES
            .iter()
            .find(|(step, _)| *step == self)
            .map_or("/", |(_, path)| path)
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        ROUTES
            .iter()
            .find(|(_, route)| *route == path)
            .map(|(step, _)| *step)
    }

    /// Steps that start a workflow and may run without a stored record.
    #[must_use]
    pub fn is_entry(self) -> bool {
        matches!(self, Self::Identify | Self::Login)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Identify => "identification",
            Self::Authenticate => "authentication",
            Self::RoleDashboard => "dashboard",
            Self::ChooseEntryMethod => "entry method",
            Self::RegisterVisitor => "visitor registration",
            Self::RegisterVehicle => "vehicle registration",
            Self::CapturePhoto => "photo capture",
            Self::SubmitEntry => "confirmation",
            Self::Terminal => "finished",
            Self::Login => "staff login",
            Self::SecurityPanel => "security panel",
            Self::AdminPanel => "admin panel",
        };
        f.write_str(label)
    }
}

/// Current screen plus the continuity token carried in the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub step: Step,
    pub sid: Option<SessionId>,
}

impl Location {
    #[must_use]
    pub fn new(step: Step, sid: Option<SessionId>) -> Self {
        Self { step, sid }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sid {
            Some(sid) => write!(f, "{}?sid={sid}", self.step.path()),
            None => f.write_str(self.step.path()),
        }
    }
}
