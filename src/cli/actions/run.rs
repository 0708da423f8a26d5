use crate::cli::{
    actions::{check, kiosk, Action},
    telemetry,
};
use crate::ingreso::workflow::Step;
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Kiosk { globals, resume } => {
            kiosk::execute(&globals, Step::Identify, resume.as_deref()).await
        }
        Action::Staff { globals, resume } => {
            kiosk::execute(&globals, Step::Login, resume.as_deref()).await
        }
        Action::CheckDni { dni } => check::dni(&dni),
        Action::CheckPlate { plate } => check::plate(&plate),
    };

    telemetry::shutdown_tracer();

    result
}
