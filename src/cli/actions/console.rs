//! Line-oriented terminal front end for the workflow screens.

use crate::ingreso::{
    api::Backend,
    calendar::{AcademicPeriod, TimeWindow},
    capture::PhotoSource,
    session::{EntryMethod, SessionRecord, Storage},
    validate::{sanitize_dni_input, Choice},
    workflow::{
        AdminAction, EntryForm, Notice, SecurityAction, Step, StepInput, VehicleForm, VisitorForm,
        WorkflowRouter,
    },
};
use anyhow::Result;
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub enum Answer {
    Text(String),
    Back,
    Quit,
}

pub enum Command {
    Input(StepInput),
    /// Input was not understood; ask again.
    Retry,
    Back,
    Quit,
}

pub struct Console<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Prints `prompt` and reads one line. `:back` and `:quit` (or end of
    /// input) are navigation, not answers.
    ///
    /// # Errors
    /// Returns an error if stdin or stdout fail.
    pub async fn ask(&mut self, prompt: &str) -> Result<Answer> {
        print!("{prompt}: ");
        std::io::stdout().flush()?;

        let Some(line) = self.lines.next_line().await? else {
            return Ok(Answer::Quit);
        };

        Ok(match line.trim() {
            ":back" => Answer::Back,
            ":quit" | ":q" => Answer::Quit,
            text => Answer::Text(text.to_string()),
        })
    }
}

macro_rules! answer {
    ($console:expr, $prompt:expr) => {
        match $console.ask($prompt).await? {
            Answer::Text(text) => text,
            Answer::Back => return Ok(Command::Back),
            Answer::Quit => return Ok(Command::Quit),
        }
    };
}

fn optional(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn show_record(record: &SessionRecord) {
    let name = record.identity.name.as_deref().unwrap_or("(no name on file)");
    println!("  {name}  DNI {}", record.identity.dni);
    for role in &record.roles {
        let number = role.number().unwrap_or("-");
        let campus = role.campus().unwrap_or("-");
        let status = if role.is_active() { "active" } else { "inactive" };
        println!("  {:<14} {number:<14} {campus:<10} {status}", role.role());
    }
}

pub fn show_notice(notice: &Notice) {
    match notice {
        Notice::Message(message) => println!("* {message}"),
        Notice::Report { kind, rows } => {
            println!("* {} {kind}", rows.len());
            for row in rows {
                println!("  {row}");
            }
        }
    }
}

/// Collects the input for the current screen.
///
/// # Errors
/// Returns an error if the terminal fails.
pub async fn prompt<R, S, B>(
    console: &mut Console<R>,
    router: &WorkflowRouter<S, B>,
    photos: &dyn PhotoSource,
) -> Result<Command>
where
    R: AsyncBufRead + Unpin,
    S: Storage,
    B: Backend,
{
    let record = router.record();

    let input = match router.step() {
        Step::Identify => {
            let dni = answer!(console, "DNI (13 digits)");
            StepInput::Identify {
                dni: sanitize_dni_input(&dni),
            }
        }
        Step::Authenticate => {
            if let Some(record) = &record {
                println!("  Welcome {}", record.identity.name.as_deref().unwrap_or(""));
            }
            let password = answer!(console, "Password");
            StepInput::Authenticate {
                password: SecretString::from(password),
            }
        }
        Step::RoleDashboard => {
            if let Some(record) = &record {
                show_record(record);
            }
            answer!(console, "Press Enter to continue");
            StepInput::Continue
        }
        Step::ChooseEntryMethod => {
            let method = loop {
                match answer!(console, "Entry method [p]edestrian / [v]ehicular")
                    .to_lowercase()
                    .as_str()
                {
                    "p" | "pedestrian" | "peatonal" => break EntryMethod::Pedestrian,
                    "v" | "vehicular" => break EntryMethod::Vehicular,
                    _ => println!("* Choose p or v"),
                }
            };
            let account_number = match &record {
                Some(record) if record.is_member() && record.workflow.account_number.is_none() => {
                    optional(answer!(console, "Account number"))
                }
                _ => None,
            };
            StepInput::ChooseEntryMethod {
                method,
                account_number,
            }
        }
        Step::RegisterVisitor => {
            println!("  New visitor. Please register.");
            let mut form = VisitorForm {
                first_name: answer!(console, "First name"),
                last_name: answer!(console, "Last name"),
                email: answer!(console, "Email"),
                phone: answer!(console, "Phone"),
                visit_type: answer!(console, "Type of visit"),
                reason: answer!(console, "Reason for the visit"),
                photo: None,
            };
            let take = answer!(console, "Take a photo now? [y/N]");
            if take.eq_ignore_ascii_case("y") {
                match photos.capture().await {
                    Ok(photo) => form.photo = Some(photo),
                    Err(err) => println!("* {err}"),
                }
            }
            StepInput::RegisterVisitor(form)
        }
        Step::RegisterVehicle => {
            let plate = answer!(console, "Plate (ABC1234)");
            let make = answer!(console, "Make (or 'Other: <make>')");
            let model = answer!(console, "Model (or 'Other: <model>')");
            let color = answer!(console, "Color (or 'Other: <color>')");
            let year = answer!(console, "Year (Enter for current)");
            StepInput::RegisterVehicle(VehicleForm {
                plate,
                make: Choice::parse(&make),
                model: Choice::parse(&model),
                color: Choice::parse(&color),
                year: year.trim().parse().ok(),
            })
        }
        Step::CapturePhoto => {
            let on_file = record.as_ref().is_some_and(|r| r.photo.is_some());
            let hint = if on_file {
                "Press Enter to take the photo, or 'k' to keep the one on file"
            } else {
                "Press Enter to take the photo"
            };
            let choice = answer!(console, hint);
            let photo = if on_file && choice.eq_ignore_ascii_case("k") {
                None
            } else {
                match photos.capture().await {
                    Ok(photo) => Some(photo),
                    Err(err) => {
                        println!("* {err}");
                        return Ok(Command::Retry);
                    }
                }
            };
            StepInput::CapturePhoto { photo }
        }
        Step::SubmitEntry => {
            let mut form = EntryForm::default();
            let is_member = record.as_ref().is_some_and(SessionRecord::is_member);
            if is_member {
                let period = answer!(console, "Period, e.g. period:2 (Enter for current)");
                if let Some(period) = optional(period) {
                    match period.parse::<AcademicPeriod>() {
                        Ok(period) => form.period = Some(period),
                        Err(err) => println!("* {err}"),
                    }
                }
            } else {
                form.reason = optional(answer!(console, "Reason (Enter to keep)"));
            }
            let window = answer!(console, "Planned hours HH:MM-HH:MM (Enter to skip)");
            if let Some(window) = optional(window) {
                match window.parse::<TimeWindow>() {
                    Ok(window) => form.planned = Some(window),
                    Err(err) => println!("* {err}"),
                }
            }
            answer!(console, "Press Enter to submit");
            StepInput::SubmitEntry(form)
        }
        Step::Terminal => {
            answer!(console, "Press Enter to start over");
            StepInput::Continue
        }
        Step::Login => {
            let account_number = answer!(console, "Account number");
            let password = answer!(console, "Password");
            StepInput::Login {
                account_number,
                password: SecretString::from(password),
            }
        }
        Step::SecurityPanel => {
            let line = answer!(console, "lookup <dni> | entry | exit | logout");
            let (verb, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let action = match verb.to_lowercase().as_str() {
                "lookup" => SecurityAction::Lookup {
                    dni: rest.trim().to_string(),
                },
                "entry" => SecurityAction::RegisterEntry,
                "exit" => SecurityAction::RegisterExit,
                "logout" => SecurityAction::Logout,
                other => {
                    println!("* Unknown command: {other}");
                    return Ok(Command::Retry);
                }
            };
            StepInput::Security(action)
        }
        Step::AdminPanel => {
            let line = answer!(console, "report <entries|people|vehicles> | logout");
            let (verb, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let action = if verb.eq_ignore_ascii_case("logout") {
                AdminAction::Logout
            } else {
                match rest.parse() {
                    Ok(kind) if verb.eq_ignore_ascii_case("report") => AdminAction::Report(kind),
                    _ => {
                        println!("* Unknown command: {line}");
                        return Ok(Command::Retry);
                    }
                }
            };
            StepInput::Admin(action)
        }
    };

    Ok(Command::Input(input))
}
