use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub const ARG_VERBOSITY: &str = "verbosity";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
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

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email")
        .env("MAGICSTREAM_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password")
        .env("MAGICSTREAM_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn imdb_id_arg() -> Arg {
    Arg::new("imdb-id")
        .help("IMDb id of the movie, example: tt0111161")
        .required(true)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::app_lib::GIT_COMMIT_HASH)
            .into_boxed_str(),
    );

    Command::new("magicstream")
        .about("MagicStream movie catalog client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("API base URL, example: https://api.magicstream.tld")
                .env("MAGICSTREAM_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("File used to keep the session between runs")
                .env("MAGICSTREAM_SESSION_FILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long(ARG_TIMEOUT_MS)
                .help("Request timeout in milliseconds")
                .env("MAGICSTREAM_TIMEOUT_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("MAGICSTREAM_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(Command::new("movies").about("List the public catalog"))
        .subcommand(Command::new("genres").about("List the available genres"))
        .subcommand(
            Command::new("register")
                .about("Create an account; log in afterwards")
                .arg(
                    Arg::new("first-name")
                        .long("first-name")
                        .help("First name")
                        .required(true),
                )
                .arg(
                    Arg::new("last-name")
                        .long("last-name")
                        .help("Last name")
                        .required(true),
                )
                .arg(email_arg())
                .arg(password_arg())
                .arg(
                    Arg::new("confirm-password")
                        .long("confirm-password")
                        .help("Password confirmation")
                        .env("MAGICSTREAM_CONFIRM_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("genre")
                        .short('g')
                        .long("genre")
                        .help("Favorite genre name, repeat for more")
                        .action(ArgAction::Append)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and keep the session")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout").about("End the current session"))
        .subcommand(Command::new("whoami").about("Show the current session"))
        .subcommand(Command::new("recommended").about("List movies recommended for you"))
        .subcommand(
            Command::new("movie")
                .about("Show one movie")
                .arg(imdb_id_arg()),
        )
        .subcommand(
            Command::new("review")
                .about("Submit an admin review for a movie")
                .arg(imdb_id_arg())
                .arg(Arg::new("text").help("Review text").required(true)),
        )
        .subcommand(
            Command::new("open")
                .about("Check whether a route can be opened with the current session")
                .arg(Arg::new("path").help("Route path, example: /recommended").required(true)),
        )
}
