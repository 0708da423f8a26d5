use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::ingreso::session::IdStrategy;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>("api-url")
        .context("missing required argument: --api-url")?;

    let mut globals = GlobalArgs::new(api_url);

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        globals.set_timeout(*timeout);
    }

    if let Some(strategy) = matches.get_one::<String>("session-id") {
        let strategy = strategy.parse::<IdStrategy>().map_err(|e| anyhow!(e))?;
        globals.set_id_strategy(strategy);
    }

    globals.set_demo(matches.get_flag("demo"));
    globals.session_dir = matches.get_one::<String>("session-dir").map(PathBuf::from);

    if let Some(dir) = matches.get_one::<String>("photo-dir") {
        globals.photo_dir = PathBuf::from(dir);
    }

    Ok(globals)
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let resume = |sub: &clap::ArgMatches| sub.get_one::<String>("resume").cloned();

    match matches.subcommand() {
        Some(("check-dni", sub)) => Ok(Action::CheckDni {
            dni: sub
                .get_one::<String>("dni")
                .cloned()
                .context("missing required argument: dni")?,
        }),
        Some(("check-plate", sub)) => Ok(Action::CheckPlate {
            plate: sub
                .get_one::<String>("plate")
                .cloned()
                .context("missing required argument: plate")?,
        }),
        Some(("staff", sub)) => Ok(Action::Staff {
            globals: globals(matches)?,
            resume: resume(sub),
        }),
        Some(("kiosk", sub)) => Ok(Action::Kiosk {
            globals: globals(matches)?,
            resume: resume(sub),
        }),
        _ => Ok(Action::Kiosk {
            globals: globals(matches)?,
            resume: None,
        }),
    }
}
