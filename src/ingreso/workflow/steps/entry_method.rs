use super::after_entry_details;
use crate::ingreso::{
    session::{EntryMethod, SessionRecord},
    validate::required,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;

/// Pedestrian or vehicular. Choosing again discards any vehicle captured
/// earlier in the workflow.
pub struct ChooseEntryMethod;

#[async_trait]
impl WorkflowStep for ChooseEntryMethod {
    fn step(&self) -> Step {
        Step::ChooseEntryMethod
    }

    async fn advance(
        &self,
        _ctx: &StepContext<'_>,
        mut record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::ChooseEntryMethod {
            method,
            account_number,
        } = input
        else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        let account_number = account_number
            .as_deref()
            .and_then(required)
            .or_else(|| record.workflow.account_number.clone());

        if record.is_member() && account_number.is_none() {
            return Err(StepError::Validation(
                "Please enter your account number".to_string(),
            ));
        }

        record.workflow.account_number = account_number;
        record.workflow.entry_method = Some(method);
        record.workflow.vehicle = None;

        let to = match method {
            EntryMethod::Vehicular => Step::RegisterVehicle,
            EntryMethod::Pedestrian => after_entry_details(&record),
        };

        Ok(Transition::Advance { to, record })
    }
}
