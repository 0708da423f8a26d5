pub mod check;
pub mod console;
pub mod kiosk;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Kiosk {
        globals: GlobalArgs,
        resume: Option<String>,
    },
    Staff {
        globals: GlobalArgs,
        resume: Option<String>,
    },
    CheckDni {
        dni: String,
    },
    CheckPlate {
        plate: String,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
