use crate::ingreso::{
    session::SessionRecord,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;

/// End of the workflow; any input returns to the entry point.
pub struct Terminal;

#[async_trait]
impl WorkflowStep for Terminal {
    fn step(&self) -> Step {
        Step::Terminal
    }

    async fn advance(
        &self,
        _ctx: &StepContext<'_>,
        _record: SessionRecord,
        _input: StepInput,
    ) -> Result<Transition, StepError> {
        Ok(Transition::Abandon)
    }
}
