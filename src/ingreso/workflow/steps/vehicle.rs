use super::after_entry_details;
use crate::ingreso::{
    api::{types::NewVehicle, ApiError},
    session::{SessionRecord, VehicleDescriptor},
    validate::{
        normalize_name, normalize_plate, plate_status,
        vehicle::{models_for, COLORS, MAKES},
        PlateStatus,
    },
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, VehicleForm, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use chrono::Datelike;
use tracing::{info, instrument, warn};

/// Validates the vehicle, resolves make and model against the backend
/// catalog and registers it for the person.
pub struct RegisterVehicle;

struct Checked {
    plate: String,
    make: String,
    model: String,
    color: String,
}

fn check(form: &VehicleForm) -> Result<Checked, StepError> {
    let plate = normalize_plate(&form.plate);
    match plate_status(&plate) {
        PlateStatus::Valid => {}
        PlateStatus::Empty => {
            return Err(StepError::Validation("Please enter the plate".to_string()));
        }
        status => {
            let message = status.message().unwrap_or_default();
            return Err(StepError::Validation(message));
        }
    }

    let make = form
        .make
        .resolve("make", MAKES)
        .map_err(StepError::Validation)?;
    let model = form
        .model
        .resolve("model", models_for(&make))
        .map_err(StepError::Validation)?;
    let color = form
        .color
        .resolve("color", COLORS)
        .map_err(StepError::Validation)?;

    Ok(Checked {
        plate,
        make,
        model,
        color,
    })
}

async fn register(
    ctx: &StepContext<'_>,
    vehicle: &Checked,
    persona_id: i64,
    year: i32,
) -> Result<Option<i64>, StepError> {
    let fail = |err: ApiError| StepError::from_api(&err, "Could not register the vehicle");

    let makes = ctx.backend.makes().await.map_err(fail)?;
    let wanted = normalize_name(&vehicle.make);
    let make = makes
        .iter()
        .find(|make| normalize_name(&make.name) == wanted)
        .ok_or_else(|| {
            StepError::ReferenceNotFound(format!(
                "Make \"{}\" was not found in the catalog",
                vehicle.make
            ))
        })?;

    let models = ctx.backend.models(make.id).await.map_err(fail)?;
    let wanted = normalize_name(&vehicle.model);
    let model = models
        .iter()
        .find(|model| normalize_name(&model.name) == wanted)
        .ok_or_else(|| {
            StepError::ReferenceNotFound(format!(
                "Model \"{}\" was not found for {}",
                vehicle.model, make.name
            ))
        })?;

    let created = ctx
        .backend
        .register_vehicle(&NewVehicle {
            model_id: model.id,
            color: vehicle.color.clone(),
            year,
            plate: vehicle.plate.clone(),
            persona_id,
        })
        .await
        .map_err(fail)?;

    Ok(created.id)
}

#[async_trait]
impl WorkflowStep for RegisterVehicle {
    fn step(&self) -> Step {
        Step::RegisterVehicle
    }

    #[instrument(skip_all)]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        mut record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::RegisterVehicle(form) = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        let vehicle = check(&form)?;
        let year = form.year.unwrap_or_else(|| ctx.today().year());
        let vehicle_id = match record.identity.persona_id {
            Some(persona_id) => match register(ctx, &vehicle, persona_id, year).await {
                Ok(id) => id,
                Err(StepError::Connectivity(_)) if ctx.config.demo_mode => {
                    warn!("backend unreachable, keeping vehicle locally (demo mode)");
                    None
                }
                Err(err) => return Err(err),
            },
            // The demo profile has no backend person to attach the vehicle to.
            None if ctx.config.demo_mode => None,
            None => {
                return Err(StepError::Validation(
                    "Your person record is missing. Please start again.".to_string(),
                ));
            }
        };
        info!("vehicle {} registered", vehicle.plate);

        record.workflow.vehicle = Some(VehicleDescriptor {
            plate: vehicle.plate,
            make: vehicle.make,
            model: vehicle.model,
            color: vehicle.color,
            vehicle_id,
        });

        let to = after_entry_details(&record);
        Ok(Transition::Advance { to, record })
    }
}
