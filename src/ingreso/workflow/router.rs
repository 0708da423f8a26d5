use super::{
    step::{Notice, StepContext, StepError, StepInput, Transition},
    steps, Location, Step,
};
use crate::ingreso::{
    api::Backend,
    config::AppConfig,
    session::{generate, SessionId, SessionRecord, SessionStore, Storage},
};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};
use url::Url;

const ROUTE_BASE: &str = "http://ingreso.local/";

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Sequences the workflow steps and owns navigation.
///
/// The session id is generated once when a workflow starts and carried to
/// every later location; the record under it is removed when the workflow
/// finishes or is abandoned. `dispatch` borrows the router mutably, so a
/// router never has more than one request in flight.
pub struct WorkflowRouter<S, B> {
    store: SessionStore<S>,
    backend: B,
    config: AppConfig,
    entry: Step,
    location: Location,
    clock: fn() -> NaiveDateTime,
}

impl<S: Storage, B: Backend> WorkflowRouter<S, B> {
    /// Builds a router whose workflows begin at `entry` (`Identify` for the
    /// kiosk, `Login` for staff).
    pub fn new(store: SessionStore<S>, backend: B, config: AppConfig, entry: Step) -> Self {
        let sid = generate(config.id_strategy);
        Self {
            store,
            backend,
            config,
            entry,
            location: Location::new(entry, Some(sid)),
            clock: local_now,
        }
    }

    /// Overrides the wall clock used for dates and opening hours.
    pub fn set_clock(&mut self, clock: fn() -> NaiveDateTime) {
        self.clock = clock;
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.location.step
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// The record for the current location, if one is stored.
    #[must_use]
    pub fn record(&self) -> Option<SessionRecord> {
        self.location
            .sid
            .as_ref()
            .and_then(|sid| self.store.get(sid))
    }

    /// Opening-hours note for the current time, if the campus is closed.
    #[must_use]
    pub fn closed_notice(&self) -> Option<String> {
        self.config.hours.closed_notice((self.clock)().time())
    }

    /// Starts a fresh workflow at the entry point with a new session id.
    pub fn start(&mut self) -> &Location {
        let sid = generate(self.config.id_strategy);
        debug!("starting workflow {sid} at {}", self.entry);
        self.location = Location::new(self.entry, Some(sid));
        &self.location
    }

    /// Resumes from a location such as `/captura-foto?sid=abc`.
    ///
    /// # Errors
    /// Returns `StepError::NoSession` and resets to the entry point when the
    /// path needs a session that is not stored. Returns
    /// `StepError::Validation` for unknown paths.
    pub fn open(&mut self, path: &str) -> Result<&Location, StepError> {
        let url = Url::parse(ROUTE_BASE)
            .and_then(|base| base.join(path))
            .map_err(|err| StepError::Validation(format!("Invalid location {path}: {err}")))?;

        let step = Step::from_path(url.path())
            .ok_or_else(|| StepError::Validation(format!("Unknown location {}", url.path())))?;

        let sid = url
            .query_pairs()
            .find(|(key, _)| key == "sid")
            .and_then(|(_, value)| SessionId::parse(&value));

        match (step, sid) {
            (Step::Terminal, _) => {
                self.location = Location::new(Step::Terminal, None);
            }
            // An entry step always begins a new workflow.
            (step, _) if step.is_entry() => {
                let sid = generate(self.config.id_strategy);
                self.location = Location::new(step, Some(sid));
            }
            (step, Some(sid)) if self.store.get::<SessionRecord>(&sid).is_some() => {
                self.location = Location::new(step, Some(sid));
            }
            (step, _) => {
                warn!("no session for {step}, restarting");
                self.start();
                return Err(StepError::NoSession);
            }
        }

        Ok(&self.location)
    }

    /// Hands `input` to the current step and applies the resulting transition.
    ///
    /// # Errors
    /// Returns the step's error; the location and the stored record are left
    /// as they were, except for a missing session which restarts the workflow.
    pub async fn dispatch(&mut self, input: StepInput) -> Result<Option<Notice>, StepError> {
        let step = self.location.step;

        if step == Step::Terminal {
            self.start();
            return Ok(None);
        }

        let Some(sid) = self.location.sid.clone() else {
            self.start();
            return Err(StepError::NoSession);
        };

        let record = match self.store.get::<SessionRecord>(&sid) {
            Some(record) => record,
            None if step.is_entry() => SessionRecord::new(sid.clone(), ""),
            None => {
                warn!("session {sid} vanished on {step}, restarting");
                self.start();
                return Err(StepError::NoSession);
            }
        };

        let transition = {
            let ctx = StepContext {
                backend: &self.backend,
                config: &self.config,
                now: (self.clock)(),
            };
            steps::handler(step).advance(&ctx, record, input).await?
        };

        self.apply(sid, transition)
    }

    fn apply(
        &mut self,
        sid: SessionId,
        transition: Transition,
    ) -> Result<Option<Notice>, StepError> {
        match transition {
            Transition::Stay { record, notice } => {
                if let Some(mut record) = record {
                    record.session_id = sid.clone();
                    self.store.put(&sid, &record)?;
                }
                Ok(notice)
            }
            Transition::Advance { to, mut record } => {
                record.session_id = sid.clone();
                self.store.put(&sid, &record)?;
                info!("{} -> {to}", self.location.step);
                self.location = Location::new(to, Some(sid));
                Ok(None)
            }
            Transition::Finish { notice } => {
                self.store.remove(&sid)?;
                info!("workflow {sid} finished");
                self.location = Location::new(Step::Terminal, None);
                Ok(notice)
            }
            Transition::Abandon => {
                self.store.remove(&sid)?;
                info!("workflow {sid} abandoned");
                self.start();
                Ok(None)
            }
        }
    }

    /// Back navigation. Leaving the vehicle or photo screens returns to the
    /// entry method choice and keeps the record; anywhere else abandons the
    /// workflow.
    ///
    /// # Errors
    /// Returns an error if the record cannot be removed from storage.
    pub fn back(&mut self) -> Result<&Location, StepError> {
        match self.location.step {
            Step::RegisterVehicle | Step::CapturePhoto if self.record().is_some() => {
                self.location.step = Step::ChooseEntryMethod;
            }
            Step::Terminal => {
                self.start();
            }
            _ => {
                if let Some(sid) = self.location.sid.clone() {
                    self.store.remove(&sid)?;
                }
                self.start();
            }
        }

        Ok(&self.location)
    }
}
