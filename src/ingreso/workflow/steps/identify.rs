use crate::ingreso::{
    api::{types::Persona, ApiError},
    session::{RoleData, SessionRecord, WorkflowData},
    validate::validate_dni,
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use chrono::Datelike;
use tracing::{debug, instrument, warn};

/// Resolves a DNI into a known member, a returning visitor or a new visitor.
pub struct Identify;

/// A role lookup that fails for any reason other than connectivity is
/// treated as "does not hold the role".
fn tolerate<T>(result: Result<Option<T>, ApiError>, what: &str) -> Result<Option<T>, StepError> {
    match result {
        Ok(found) => Ok(found),
        Err(err) if err.is_connectivity() => Err(StepError::from_api(&err, what)),
        Err(err) => {
            warn!("{what} failed, assuming no role: {err}");
            Ok(None)
        }
    }
}

fn apply_persona(record: &mut SessionRecord, persona: &Persona) {
    let name = persona.full_name();
    if !name.is_empty() {
        record.identity.name = Some(name);
    }
    record.identity.persona_id = Some(persona.id);
    record.photo = persona.photo.clone().filter(|photo| !photo.is_empty());
}

#[async_trait]
impl WorkflowStep for Identify {
    fn step(&self) -> Step {
        Step::Identify
    }

    #[instrument(skip_all)]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        mut record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::Identify { dni } = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        let dni = dni.trim().to_string();
        validate_dni(&dni, ctx.today().year())
            .map_err(|err| StepError::Validation(err.to_string()))?;

        // A new identification replaces whatever the record held before.
        record.identity.dni.clone_from(&dni);
        record.identity.name = None;
        record.identity.persona_id = None;
        record.roles.clear();
        record.photo = None;
        record.workflow = WorkflowData::default();

        let persona = ctx
            .backend
            .person_by_dni(&dni)
            .await
            .map_err(|err| StepError::from_api(&err, "Could not look up the DNI"))?;

        if let Some(persona) = &persona {
            apply_persona(&mut record, persona);

            let student = tolerate(
                ctx.backend.student_by_person(persona.id).await,
                "student lookup",
            )?;
            if let Some(student) = student {
                record.roles.push(RoleData::Student {
                    account_number: student.account_number,
                    is_active: student.active.unwrap_or(true),
                    campus: student.campus,
                });
            }

            let employee = tolerate(
                ctx.backend.employee_by_person(persona.id).await,
                "employee lookup",
            )?;
            if let Some(employee) = employee {
                record.roles.push(RoleData::Employee {
                    employee_number: employee.employee_number,
                    is_active: employee.active.unwrap_or(true),
                    campus: employee.campus,
                });
            }

            if !record.roles.is_empty() {
                debug!("member found: {}", record.roles_display());
                return Ok(Transition::Advance {
                    to: Step::Authenticate,
                    record,
                });
            }
        }

        let visits = tolerate(
            ctx.backend.visits_by_dni(&dni).await.map(Some),
            "visit lookup",
        )?
        .unwrap_or_default();

        if let Some(visit) = visits.into_iter().next() {
            if let Some(visitor) = &visit.persona {
                if persona.is_none() {
                    apply_persona(&mut record, visitor);
                }
            }
            let (email, phone) = persona
                .as_ref()
                .or(visit.persona.as_ref())
                .map_or((None, None), |p| (p.email.clone(), p.phone.clone()));
            record.roles.push(RoleData::Visitor {
                visit_id: visit.id,
                visit_type: visit.visit_type,
                reason: visit.reason,
                email,
                phone,
            });
            debug!("returning visitor");
            return Ok(Transition::Advance {
                to: Step::Authenticate,
                record,
            });
        }

        // Unknown: carry only the DNI (and the person id when the person
        // exists without a role, so registration does not duplicate it).
        let persona_id = persona.map(|p| p.id);
        let mut fresh = SessionRecord::new(record.session_id, dni);
        fresh.identity.persona_id = persona_id;
        Ok(Transition::Advance {
            to: Step::RegisterVisitor,
            record: fresh,
        })
    }
}
