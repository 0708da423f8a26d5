use crate::ingreso::{
    api::types::{AccountLogin, LoginProfile},
    session::{RoleData, SessionRecord, WorkflowData},
    validate::required,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

/// Unified account-number login used by staff and members at the desk.
pub struct Login;

/// Canned session used when the backend is unreachable in demo mode.
fn demo_profile() -> LoginProfile {
    LoginProfile {
        first_name: Some("Demo".to_string()),
        last_name: Some("Student".to_string()),
        role: Some("estudiante".to_string()),
        dni: Some("0801200012345".to_string()),
        persona_id: None,
    }
}

/// Maps the backend role name to the session role and the screen it opens.
fn route(profile: &LoginProfile, account_number: String) -> (RoleData, Step) {
    let role = profile.role.as_deref().unwrap_or_default().trim().to_lowercase();
    match role.as_str() {
        "seguridad" | "security" => (RoleData::Security { account_number }, Step::SecurityPanel),
        "administrador" | "admin" => (RoleData::Admin { account_number }, Step::AdminPanel),
        "empleado" | "employee" => (
            RoleData::Employee {
                employee_number: Some(account_number),
                is_active: true,
                campus: None,
            },
            Step::ChooseEntryMethod,
        ),
        _ => (
            RoleData::Student {
                account_number: Some(account_number),
                is_active: true,
                campus: None,
            },
            Step::ChooseEntryMethod,
        ),
    }
}

#[async_trait]
impl WorkflowStep for Login {
    fn step(&self) -> Step {
        Step::Login
    }

    #[instrument(skip_all)]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::Login {
            account_number,
            password,
        } = input
        else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        let account_number = match required(&account_number) {
            Some(value) if !password.expose_secret().trim().is_empty() => value,
            _ => {
                return Err(StepError::Validation(
                    "Please enter your account number and password".to_string(),
                ));
            }
        };

        let login = AccountLogin {
            account_number: account_number.clone(),
            password,
        };

        let profile = match ctx.backend.login(&login).await {
            Ok(profile) => profile,
            Err(err) if err.is_connectivity() && ctx.config.demo_mode => {
                warn!("backend unreachable, using demo profile");
                demo_profile()
            }
            Err(err) if err.is_connectivity() => {
                return Err(StepError::from_api(&err, "Login failed"));
            }
            Err(err) if err.status().is_some() => {
                return Err(StepError::Unauthorized("Invalid credentials".to_string()));
            }
            Err(err) => return Err(StepError::from_api(&err, "Login failed")),
        };

        let (role, to) = route(&profile, account_number.clone());
        info!("logged in as {}", role.role());

        let mut record =
            SessionRecord::new(record.session_id, profile.dni.clone().unwrap_or_default());
        record.identity.persona_id = profile.persona_id;
        let name = format!(
            "{} {}",
            profile.first_name.as_deref().unwrap_or_default(),
            profile.last_name.as_deref().unwrap_or_default()
        );
        record.identity.name = required(&name);
        record.roles = vec![role];
        record.workflow = WorkflowData {
            account_number: Some(account_number),
            ..WorkflowData::default()
        };

        Ok(Transition::Advance { to, record })
    }
}
