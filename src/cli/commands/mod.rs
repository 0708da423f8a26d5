use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn resume_arg() -> Arg {
    Arg::new("resume")
        .long("resume")
        .help("Resume at a location, example: /captura-foto?sid=k3j2h1q9z0a7b")
        .value_name("PATH")
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("ingreso")
        .about("Campus entry registration kiosk")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the access-control backend")
                .default_value("http://localhost:3000")
                .env("INGRESO_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Backend request timeout in milliseconds")
                .default_value("10000")
                .env("INGRESO_TIMEOUT_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("session-id")
                .long("session-id")
                .help("Session id format")
                .default_value("base36")
                .env("INGRESO_SESSION_ID")
                .global(true)
                .value_parser(["base36", "uuid"]),
        )
        .arg(
            Arg::new("session-dir")
                .long("session-dir")
                .help("Keep sessions as JSON files in this directory instead of in memory")
                .env("INGRESO_SESSION_DIR")
                .global(true),
        )
        .arg(
            Arg::new("photo-dir")
                .long("photo-dir")
                .help("Directory where the camera drops its stills")
                .default_value(".")
                .env("INGRESO_PHOTO_DIR")
                .global(true),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Use canned data when the backend is unreachable")
                .env("INGRESO_DEMO")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("INGRESO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("kiosk")
                .about("Identify with a DNI and register an entry (default)")
                .arg(resume_arg()),
        )
        .subcommand(
            Command::new("staff")
                .about("Account login for members, security and administrators")
                .arg(resume_arg()),
        )
        .subcommand(
            Command::new("check-dni")
                .about("Validate a DNI without contacting the backend")
                .arg(Arg::new("dni").required(true)),
        )
        .subcommand(
            Command::new("check-plate")
                .about("Normalize and validate a license plate")
                .arg(Arg::new("plate").required(true)),
        )
}
