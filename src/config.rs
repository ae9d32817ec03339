use std::path::PathBuf;
use std::time::Duration;

use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};

use crate::catalog::Catalog;
use crate::errors::ConsoleResult;
use crate::http_request_executor::ReqwestTransport;
use crate::session::SessionState;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "JUNEBUG_URL";

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Compose(Vec<String>),
    Fire { endpoint_ids: Vec<String>, concurrent: bool },
    Repl,
}

/// Settings shared by every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub catalog: Option<PathBuf>,
    pub session_overrides: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub verbosity: u8,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog: None,
            session_overrides: Vec::new(),
            timeout: None,
            verbosity: 0,
        }
    }
}

impl ConsoleConfig {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        ConsoleConfig {
            base_url: matches
                .get_one::<String>("base-url")
                .cloned()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            catalog: matches.get_one::<PathBuf>("catalog").cloned(),
            session_overrides: matches
                .get_many::<(String, String)>("set")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            timeout: matches.get_one::<u64>("timeout").map(|secs| Duration::from_secs(*secs)),
            verbosity: matches.get_count("verbose"),
        }
    }

    pub fn load_catalog(&self) -> ConsoleResult<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::from_path(path),
            None => Ok(Catalog::builtin()),
        }
    }

    /// Default prompts with any `--set` values applied on top.
    pub fn initial_session(&self) -> SessionState {
        let mut session = SessionState::with_defaults();
        for (name, value) in &self.session_overrides {
            session.set(name.clone(), value.clone());
        }
        session
    }

    pub fn transport(&self) -> ConsoleResult<ReqwestTransport> {
        ReqwestTransport::new(&self.base_url, self.timeout)
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

fn endpoint_ids_arg() -> clap::Arg {
    arg!(<ENDPOINTS> "endpoint ids")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(String))
        .action(ArgAction::Append)
}

pub fn build_cli() -> Command {
    command!()
        .name("junebug-console")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            arg!(-u --"base-url" <URL>)
                .help("Base url of the junebug server")
                .env(BASE_URL_ENV)
                .default_value(DEFAULT_BASE_URL)
                .global(true),
        )
        .arg(
            arg!(-c --catalog <FILE>)
                .help("JSON endpoint catalog, the built-in junebug catalog is used otherwise")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            arg!(-s --set <ASSIGNMENT>)
                .help("Initial session value as NAME=VALUE - you can specify this argument multiple times")
                .value_parser(parse_assignment)
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            arg!(-t --timeout <SECS>)
                .help("Give up on a request after this many seconds")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .arg(
            arg!(-v --verbose ...)
                .help("More logging, repeat for debug output")
                .global(true),
        )
        .subcommand(command!("list").about("list the endpoints of the catalog"))
        .subcommand(
            command!("compose")
                .about("print the requests the endpoints would send, without sending them")
                .arg(endpoint_ids_arg()),
        )
        .subcommand(
            command!("fire")
                .about("fire one or multiple endpoints, in order")
                .arg(endpoint_ids_arg())
                .arg(
                    arg!(--concurrent)
                        .help("Fire all endpoints at once instead of one after another")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(command!("repl").about("interactive console"))
}

/// Splits parsed arguments into the shared config and the requested action.
pub fn parse_matches(matches: &ArgMatches) -> (ConsoleConfig, Action) {
    let config = ConsoleConfig::from_matches(matches);
    let ids = |sub: &ArgMatches| -> Vec<String> {
        sub.get_many::<String>("ENDPOINTS")
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };
    let action = match matches.subcommand() {
        Some(("compose", sub)) => Action::Compose(ids(sub)),
        Some(("fire", sub)) => Action::Fire {
            endpoint_ids: ids(sub),
            concurrent: sub.get_flag("concurrent"),
        },
        Some(("repl", _)) => Action::Repl,
        _ => Action::List,
    };
    (config, action)
}
