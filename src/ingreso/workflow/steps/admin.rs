use crate::ingreso::{
    session::{Role, SessionRecord},
    workflow::{
        step::{AdminAction, Notice, StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Read-only reports over entries, people and vehicles.
pub struct AdminPanel;

#[async_trait]
impl WorkflowStep for AdminPanel {
    fn step(&self) -> Step {
        Step::AdminPanel
    }

    #[instrument(skip_all)]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::Admin(action) = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        if !record.has_role(Role::Admin) {
            return Err(StepError::Unauthorized(
                "Only administrators can use this panel".to_string(),
            ));
        }

        match action {
            AdminAction::Report(kind) => {
                let rows = ctx
                    .backend
                    .report(kind)
                    .await
                    .map_err(|err| StepError::from_api(&err, "Could not load the report"))?;
                debug!("{} rows of {kind}", rows.len());

                Ok(Transition::Stay {
                    record: None,
                    notice: Some(Notice::Report { kind, rows }),
                })
            }
            AdminAction::Logout => Ok(Transition::Abandon),
        }
    }
}
