use crate::ingreso::{
    api::types::{NewPersona, NewVisit},
    capture::Photo,
    session::{RoleData, SessionRecord},
    validate::{required, valid_email},
    workflow::{
        step::{StepContext, StepError, StepInput, Transition, VisitorForm, WorkflowStep},
        Step,
    },
};
use async_trait::async_trait;
use tracing::{info, instrument};

const MIN_PHONE_DIGITS: usize = 8;

/// Registers a first-time visitor: creates the person when needed, then the
/// visit, and continues to the entry method choice.
pub struct RegisterVisitor;

struct Visitor {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    visit_type: String,
    reason: String,
}

fn field(value: &str, message: &str) -> Result<String, StepError> {
    required(value).ok_or_else(|| StepError::Validation(message.to_string()))
}

fn check(form: &VisitorForm) -> Result<Visitor, StepError> {
    let visitor = Visitor {
        first_name: field(&form.first_name, "Please enter your first name")?,
        last_name: field(&form.last_name, "Please enter your last name")?,
        email: field(&form.email, "Please enter your email")?,
        phone: field(&form.phone, "Please enter your phone number")?,
        visit_type: field(&form.visit_type, "Please select the type of visit")?,
        reason: field(&form.reason, "Please enter the reason for your visit")?,
    };

    if !valid_email(&visitor.email) {
        return Err(StepError::Validation("Invalid email address".to_string()));
    }

    let phone_ok = visitor
        .phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '))
        && visitor.phone.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS;
    if !phone_ok {
        return Err(StepError::Validation("Invalid phone number".to_string()));
    }

    Ok(visitor)
}

#[async_trait]
impl WorkflowStep for RegisterVisitor {
    fn step(&self) -> Step {
        Step::RegisterVisitor
    }

    #[instrument(skip_all)]
    async fn advance(
        &self,
        ctx: &StepContext<'_>,
        mut record: SessionRecord,
        input: StepInput,
    ) -> Result<Transition, StepError> {
        let StepInput::RegisterVisitor(form) = input else {
            return Err(StepError::UnexpectedInput(self.step()));
        };

        let visitor = check(&form)?;
        let photo = form.photo.filter(|photo| !photo.is_empty());

        let persona_id = match record.identity.persona_id {
            Some(id) => id,
            None => {
                let person = NewPersona {
                    first_name: visitor.first_name.clone(),
                    last_name: visitor.last_name.clone(),
                    dni: record.identity.dni.clone(),
                    email: visitor.email.clone(),
                    phone: visitor.phone.clone(),
                };
                ctx.backend
                    .create_person(&person)
                    .await
                    .map_err(|err| StepError::from_api(&err, "Could not register the person"))?
                    .id
            }
        };

        let visit = NewVisit {
            persona_id,
            visit_type: visitor.visit_type.clone(),
            reason: visitor.reason.clone(),
            email: visitor.email.clone(),
            phone: visitor.phone.clone(),
            photo: photo
                .clone()
                .unwrap_or_else(|| Photo::from_data_url(String::new())),
        };
        let created = ctx
            .backend
            .create_visit(&visit)
            .await
            .map_err(|err| StepError::from_api(&err, "Could not register the visit"))?;
        info!("visit registered for persona {persona_id}");

        record.identity.persona_id = Some(persona_id);
        record.identity.name = Some(format!("{} {}", visitor.first_name, visitor.last_name));
        record.roles = vec![RoleData::Visitor {
            visit_id: created.id,
            visit_type: Some(visitor.visit_type),
            reason: Some(visitor.reason),
            email: Some(visitor.email),
            phone: Some(visitor.phone),
        }];
        record.workflow.photo = photo;

        Ok(Transition::Advance {
            to: Step::ChooseEntryMethod,
            record,
        })
    }
}
