use crate::ingreso::{
    api::types::NewEntry,
    calendar::{AcademicPeriod, PeriodKind},
    session::{EntryMethod, Role, RoleData, SessionRecord},
    validate::required,
    workflow::{
        step::{EntryForm, Notice, StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use tracing::{info, instrument};

const TIME_FORMAT: &str = "%H:%M";

/// Sends the accumulated entry to the backend. A failed submission keeps
/// the user here to retry.
pub struct SubmitEntry;

/// Students register against the academic period, employees the semester.
fn period_kind(record: &SessionRecord) -> PeriodKind {
    if record.has_role(Role::Student) {
        PeriodKind::Period
    } else {
        PeriodKind::Semester
    }
}

fn visit_reason(record: &SessionRecord) -> Option<String> {
    record.roles.iter().find_map(|data| match data {
        RoleData::Visitor { reason, .. } => reason.clone(),
        _ => None,
    })
}

fn build_entry(
    ctx: &StepContext<'_>,
    record: &SessionRecord,
    form: EntryForm,
) -> Result<NewEntry, StepError> {
    let method = record.workflow.entry_method.ok_or_else(|| {
        StepError::Validation("Please choose how you are entering".to_string())
    })?;

    let photo = record.effective_photo().ok_or_else(|| {
        StepError::Validation("A photo is required to register your entry".to_string())
    })?;

    let plate = match (method, &record.workflow.vehicle) {
        (EntryMethod::Vehicular, Some(vehicle)) => Some(vehicle.plate.clone()),
        (EntryMethod::Vehicular, None) => {
            return Err(StepError::Validation(
                "Please register your vehicle first".to_string(),
            ));
        }
        (EntryMethod::Pedestrian, _) => None,
    };

    let period = if record.is_member() {
        let period = form
            .period
            .or(record.workflow.period)
            .unwrap_or_else(|| AcademicPeriod::current(period_kind(record), ctx.today()));
        if !period.is_valid() {
            return Err(StepError::Validation(format!("{period} does not exist")));
        }
        Some(period)
    } else {
        None
    };

    let planned = form.planned.or(record.workflow.planned);
    if let Some(window) = &planned {
        ctx.config
            .hours
            .check_window(window)
            .map_err(StepError::Validation)?;
    }

    let reason = form
        .reason
        .as_deref()
        .and_then(required)
        .or_else(|| visit_reason(record));

    Ok(NewEntry {
        reason,
        kind: method.wire_name().to_string(),
        persona_id: 0,
        plate,
        period: period.map(|period| period.to_string()),
        planned_entry: planned.map(|w| w.entry.format(TIME_FORMAT).to_string()),
        planned_exit: planned.map(|w| w.exit.format(TIME_FORMAT).to_string()),
        photo: Some(photo.clone()),
    })
}

#[async_trait]
impl WorkflowStep for SubmitEntry {
    fn step(&self) -> Step {
        Step::SubmitEntry
    }

    #[instrument(skip_all, fields(dni = %record.identity.dni))]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::SubmitEntry(form) = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        let mut entry = build_entry(ctx, &record, form)?;

        entry.persona_id = match record.identity.persona_id {
            Some(id) => id,
            None if record.identity.dni.trim().is_empty() => {
                return Err(StepError::Validation(
                    "Your identity is missing. Please start again.".to_string(),
                ));
            }
            None => ctx
                .backend
                .person_by_dni(&record.identity.dni)
                .await
                .map_err(|err| StepError::from_api(&err, "Could not look up the DNI"))?
                .map(|persona| persona.id)
                .ok_or_else(|| {
                    StepError::Backend(format!(
                        "No person registered with DNI {}",
                        record.identity.dni
                    ))
                })?,
        };

        ctx.backend
            .submit_entry(&entry)
            .await
            .map_err(|err| StepError::from_api(&err, "Could not register your entry"))?;
        info!("entry registered ({})", entry.kind);

        let greeting = record
            .identity
            .name
            .as_deref()
            .map_or_else(|| "Welcome!".to_string(), |name| format!("Welcome, {name}!"));

        Ok(Transition::Finish {
            notice: Some(Notice::Message(format!("Entry registered. {greeting}"))),
        })
    }
}
