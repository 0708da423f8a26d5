use crate::ingreso::{
    session::SessionRecord,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;

/// Read-only confirmation of who is entering. Inactive accounts stop here.
pub struct RoleDashboard;

#[async_trait]
impl WorkflowStep for RoleDashboard {
    fn step(&self) -> Step {
        Step::RoleDashboard
    }

    async fn advance(
        &self,
        _ctx: &StepContext<'_>,
        record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::Continue = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        if !record.is_active() {
            return Err(StepError::Inactive(record.inactive_message().to_string()));
        }

        Ok(Transition::Advance {
            to: Step::ChooseEntryMethod,
            record,
        })
    }
}
