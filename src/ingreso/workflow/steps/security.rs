use crate::ingreso::{
    api::types::{NewEntry, NewExit, Persona},
    session::{EntryMethod, Role, SessionRecord},
    validate::{sanitize_dni_input, validate_dni},
    workflow::{
        step::{Notice, SecurityAction, StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use chrono::Datelike;
use tracing::{info, instrument};

const GUARD_ENTRY_REASON: &str = "Entry registered by security";

/// Guard desk: look a person up and register their entry or exit.
pub struct SecurityPanel;

fn looked_up(record: &SessionRecord) -> Result<&Persona, StepError> {
    record
        .workflow
        .lookup
        .as_ref()
        .ok_or_else(|| StepError::Validation("Look up a person first".to_string()))
}

fn stay(record: SessionRecord, message: String) -> Transition {
    Transition::Stay {
        record: Some(record),
        notice: Some(Notice::Message(message)),
    }
}

#[async_trait]
impl WorkflowStep for SecurityPanel {
    fn step(&self) -> Step {
        Step::SecurityPanel
    }

    #[instrument(skip_all)]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        mut record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::Security(action) = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        if !record.has_role(Role::Security) {
            return Err(StepError::Unauthorized(
                "Only security staff can use this panel".to_string(),
            ));
        }

        match action {
            SecurityAction::Lookup { dni } => {
                let dni = sanitize_dni_input(&dni);
                if dni.is_empty() {
                    return Err(StepError::Validation(
                        "Please enter a DNI to look up".to_string(),
                    ));
                }
                validate_dni(&dni, ctx.today().year())
                    .map_err(|err| StepError::Validation(err.to_string()))?;
                let found = ctx
                    .backend
                    .person_by_dni(&dni)
                    .await
                    .map_err(|err| StepError::from_api(&err, "Lookup failed"))?;

                let message = match &found {
                    Some(persona) => format!("Found: {} ({})", persona.full_name(), persona.dni),
                    None => format!("No person found with DNI {dni}"),
                };
                record.workflow.lookup = found;
                Ok(stay(record, message))
            }
            SecurityAction::RegisterEntry => {
                let persona = looked_up(&record)?;
                let entry = NewEntry {
                    reason: Some(GUARD_ENTRY_REASON.to_string()),
                    kind: EntryMethod::Pedestrian.wire_name().to_string(),
                    persona_id: persona.id,
                    plate: None,
                    period: None,
                    planned_entry: None,
                    planned_exit: None,
                    photo: None,
                };
                ctx.backend
                    .submit_entry(&entry)
                    .await
                    .map_err(|err| StepError::from_api(&err, "Could not register the entry"))?;
                info!("guard entry for persona {}", persona.id);

                let message = format!("Entry registered for {}", persona.full_name());
                Ok(stay(record, message))
            }
            SecurityAction::RegisterExit => {
                let persona = looked_up(&record)?;
                ctx.backend
                    .submit_exit(&NewExit {
                        persona_id: persona.id,
                    })
                    .await
                    .map_err(|err| StepError::from_api(&err, "Could not register the exit"))?;
                info!("guard exit for persona {}", persona.id);

                let message = format!("Exit registered for {}", persona.full_name());
                Ok(stay(record, message))
            }
            SecurityAction::Logout => Ok(Transition::Abandon),
        }
    }
}
