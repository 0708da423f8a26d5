use crate::cli::{
    actions::console::{prompt, show_notice, Command, Console},
    globals::GlobalArgs,
};
use crate::ingreso::{
    api::{Backend, HttpBackend},
    capture::{FilePhotoSource, PhotoSource},
    session::{DirStorage, MemoryStorage, SessionStore, Storage},
    workflow::{Step, WorkflowRouter},
};
use anyhow::{Context, Result};
use tokio::io::{stdin, AsyncBufRead, BufReader};
use tracing::{debug, info};

/// Run the interactive workflow starting at `entry`.
/// # Errors
/// Returns an error if the backend client or the session directory cannot be
/// set up, or if the terminal fails.
pub async fn execute(globals: &GlobalArgs, entry: Step, resume: Option<&str>) -> Result<()> {
    let backend = HttpBackend::new(&globals.config).context("failed to create backend client")?;
    let photos = FilePhotoSource::new(&globals.photo_dir);
    let console = Console::new(BufReader::new(stdin()));

    info!(
        "backend {} (demo mode: {})",
        globals.config.api_base_url, globals.config.demo_mode
    );

    match &globals.session_dir {
        Some(dir) => {
            let storage = DirStorage::new(dir)
                .with_context(|| format!("failed to open session directory {}", dir.display()))?;
            let router =
                WorkflowRouter::new(SessionStore::new(storage), backend, globals.config.clone(), entry);
            drive(router, console, &photos, resume).await
        }
        None => {
            let router = WorkflowRouter::new(
                SessionStore::new(MemoryStorage::new()),
                backend,
                globals.config.clone(),
                entry,
            );
            drive(router, console, &photos, resume).await
        }
    }
}

/// Screen loop: prompt, dispatch, report. Step errors are shown and the
/// user stays where they are.
///
/// # Errors
/// Returns an error if the terminal fails.
pub async fn drive<S, B, R>(
    mut router: WorkflowRouter<S, B>,
    mut console: Console<R>,
    photos: &dyn PhotoSource,
    resume: Option<&str>,
) -> Result<()>
where
    S: Storage,
    B: Backend,
    R: AsyncBufRead + Unpin,
{
    if let Some(path) = resume {
        if let Err(err) = router.open(path) {
            println!("* {err}");
        }
    }

    if let Some(note) = router.closed_notice() {
        println!("* {note}");
    }

    let mut shown = None;
    loop {
        let location = router.location().clone();
        if shown.as_ref() != Some(&location) {
            println!("\n== {} [{location}]", location.step);
            shown = Some(location);
        }

        match prompt(&mut console, &router, photos).await? {
            Command::Quit => break,
            Command::Retry => {}
            Command::Back => {
                if let Err(err) = router.back() {
                    println!("* {err}");
                }
            }
            Command::Input(input) => match router.dispatch(input).await {
                Ok(Some(notice)) => show_notice(&notice),
                Ok(None) => {}
                Err(err) => {
                    debug!("step error: {err:?}");
                    println!("* {err}");
                }
            },
        }
    }

    Ok(())
}
