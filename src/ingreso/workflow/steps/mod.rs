//! One handler per screen.

pub mod admin;
pub mod authenticate;
pub mod dashboard;
pub mod entry_method;
pub mod identify;
pub mod login;
pub mod photo;
pub mod security;
pub mod submit;
pub mod terminal;
pub mod vehicle;
pub mod visitor;

use super::{step::WorkflowStep, Step};
use crate::ingreso::session::SessionRecord;

static IDENTIFY: identify::Identify = identify::Identify;
static AUTHENTICATE: authenticate::Authenticate = authenticate::Authenticate;
static DASHBOARD: dashboard::RoleDashboard = dashboard::RoleDashboard;
static ENTRY_METHOD: entry_method::ChooseEntryMethod = entry_method::ChooseEntryMethod;
static VISITOR: visitor::RegisterVisitor = visitor::RegisterVisitor;
static VEHICLE: vehicle::RegisterVehicle = vehicle::RegisterVehicle;
static PHOTO: photo::CapturePhoto = photo::CapturePhoto;
static SUBMIT: submit::SubmitEntry = submit::SubmitEntry;
static TERMINAL: terminal::Terminal = terminal::Terminal;
static LOGIN: login::Login = login::Login;
static SECURITY: security::SecurityPanel = security::SecurityPanel;
static ADMIN: admin::AdminPanel = admin::AdminPanel;

#[must_use]
pub fn handler(step: Step) -> &'static dyn WorkflowStep {
    match step {
        Step::Identify => &IDENTIFY,
        Step::Authenticate => &AUTHENTICATE,
        Step::RoleDashboard => &DASHBOARD,
        Step::ChooseEntryMethod => &ENTRY_METHOD,
        Step::RegisterVisitor => &VISITOR,
        Step::RegisterVehicle => &VEHICLE,
        Step::CapturePhoto => &PHOTO,
        Step::SubmitEntry => &SUBMIT,
        Step::Terminal => &TERMINAL,
        Step::Login => &LOGIN,
        Step::SecurityPanel => &SECURITY,
        Step::AdminPanel => &ADMIN,
    }
}

/// Where to go once the entry details are complete: capture a photo unless
/// one is already available.
pub(crate) fn after_entry_details(record: &SessionRecord) -> Step {
    if record.effective_photo().is_some() {
        Step::SubmitEntry
    } else {
        Step::CapturePhoto
    }
}
