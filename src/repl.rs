use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::console::Console;
use crate::http_request_executor::Transport;
use crate::render::{RenderSink, TextRenderer};

pub const HELP: &str = "\
commands:
  list                  endpoints in the catalog
  session               current session values
  set NAME VALUE        overwrite a session value
  compose ID            show the request ID would send
  fire ID [ID...]       fire endpoints, the prompt stays available
  help                  this text
  quit                  wait for pending requests and leave";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Help,
    List,
    Session,
    Set { name: String, value: String },
    Compose(String),
    Fire(Vec<String>),
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<ReplCommand, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word {
            "" => Ok(ReplCommand::Empty),
            "help" | "?" => Ok(ReplCommand::Help),
            "list" | "ls" => Ok(ReplCommand::List),
            "session" => Ok(ReplCommand::Session),
            "quit" | "exit" => Ok(ReplCommand::Quit),
            "set" => match rest.split_once(char::is_whitespace) {
                Some((name, value)) => Ok(ReplCommand::Set {
                    name: name.to_string(),
                    value: value.trim().to_string(),
                }),
                None => Err("usage: set NAME VALUE".to_string()),
            },
            "compose" if !rest.is_empty() && !rest.contains(char::is_whitespace) => Ok(ReplCommand::Compose(rest.to_string())),
            "compose" => Err("usage: compose ID".to_string()),
            "fire" if !rest.is_empty() => Ok(ReplCommand::Fire(rest.split_whitespace().map(str::to_string).collect())),
            "fire" => Err("usage: fire ID [ID...]".to_string()),
            other => Err(format!("unknown command '{}', try help", other)),
        }
    }
}

/// Reads commands from `input` until it ends or the operator quits.
///
/// Fires are spawned onto the current `LocalSet` so a slow request does not
/// hold the prompt; their outcomes are rendered whenever they resolve. Must be
/// driven from inside a `LocalSet`.
pub async fn run_repl<T, R, W>(console: Rc<Console<T>>, input: R, renderer: Rc<RefCell<TextRenderer<W>>>)
where
    T: Transport + 'static,
    R: AsyncBufRead + Unpin,
    W: Write + 'static,
{
    let mut lines = input.lines();
    let mut pending: Vec<JoinHandle<()>> = Vec::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "couldn't read input");
                break;
            }
        };
        pending.retain(|handle| !handle.is_finished());

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                renderer.borrow_mut().text(&message);
                continue;
            }
        };

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Help => renderer.borrow_mut().text(HELP),
            ReplCommand::List => renderer.borrow_mut().catalog(console.catalog()),
            ReplCommand::Session => renderer.borrow_mut().session(&console.session()),
            ReplCommand::Set { name, value } => console.set_param(&name, &value),
            ReplCommand::Compose(id) => match console.compose(&id) {
                Ok(request) => renderer.borrow_mut().text(&request.to_string()),
                Err(e) => renderer.borrow_mut().text(&e.to_string()),
            },
            ReplCommand::Fire(ids) => {
                for id in ids {
                    let console = Rc::clone(&console);
                    let renderer = Rc::clone(&renderer);
                    pending.push(tokio::task::spawn_local(async move {
                        match console.fire(&id).await {
                            Ok(outcome) => renderer.borrow_mut().render(&id, &outcome),
                            Err(e) => renderer.borrow_mut().text(&e.to_string()),
                        }
                    }));
                }
            }
            ReplCommand::Quit => break,
        }
    }

    for handle in pending {
        if let Err(e) = handle.await {
            warn!(error = %e, "fire task ended abnormally");
        }
    }
}
