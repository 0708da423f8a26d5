use crate::ingreso::{
    session::SessionRecord,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// Holds the still produced by the camera. With a photo already on file the
/// user may continue without a new one.
pub struct CapturePhoto;

#[async_trait]
impl WorkflowStep for CapturePhoto {
    fn step(&self) -> Step {
        Step::CapturePhoto
    }

    async fn advance(
        &self,
        _ctx: &StepContext<'_>,
        mut record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::CapturePhoto { photo } = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        match photo.filter(|photo| !photo.is_empty()) {
            Some(photo) => record.workflow.photo = Some(photo),
            None if record.photo.is_some() => debug!("using photo on file"),
            None => {
                return Err(StepError::Validation("Please take a photo".to_string()));
            }
        }

        Ok(Transition::Advance {
            to: Step::SubmitEntry,
            record,
        })
    }
}
