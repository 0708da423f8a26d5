use crate::ingreso::{
    api::{types::Credentials, ApiError},
    session::SessionRecord,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::instrument;

/// Checks the password for the identified person. Never changes the identity.
pub struct Authenticate;

fn login_error(err: &ApiError) -> StepError {
    match err.status() {
        Some(401) => StepError::Unauthorized("Incorrect password".to_string()),
        Some(404) => StepError::Unauthorized("User not found".to_string()),
        _ if err.is_connectivity() => StepError::from_api(err, "Authentication error"),
        _ => StepError::Backend("Authentication error".to_string()),
    }
}

#[async_trait]
impl WorkflowStep for Authenticate {
    fn step(&self) -> Step {
        Step::Authenticate
    }

    #[instrument(skip_all, fields(dni = %record.identity.dni))]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::Authenticate { password } = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        if password.expose_secret().trim().is_empty() {
            return Err(StepError::Validation(
                "Please enter your password".to_string(),
            ));
        }

        let credentials = Credentials {
            dni: record.identity.dni.clone(),
            password,
        };

        // Visitors without a member role authenticate against the visit.
        let result = if record.is_visitor() && !record.is_member() {
            ctx.backend.visitor_login(&credentials).await
        } else {
            ctx.backend.person_login(&credentials).await
        };
        result.map_err(|err| login_error(&err))?;

        Ok(Transition::Advance {
            to: Step::RoleDashboard,
            record,
        })
    }
}
