use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use tokio::io::BufReader;
use tokio::task::LocalSet;

use crate::config::{Action, ConsoleConfig};
use crate::console::Console;
use crate::http_request_executor::Transport;
use crate::render::{RenderSink, TextRenderer};
use crate::repl::{run_repl, HELP};

/// Builds a console from `config` and carries out `action` against the real server.
pub async fn execute(config: &ConsoleConfig, action: Action) -> Result<()> {
    let catalog = config.load_catalog().context("while loading the endpoint catalog")?;
    let transport = config
        .transport()
        .with_context(|| format!("while connecting to {}", config.base_url))?;
    let console = Console::new(catalog, transport, config.initial_session());
    let renderer = TextRenderer::new(std::io::stdout());

    match action {
        Action::Repl => {
            let renderer = Rc::new(RefCell::new(renderer));
            renderer.borrow_mut().text(HELP);
            let input = BufReader::new(tokio::io::stdin());
            LocalSet::new()
                .run_until(run_repl(Rc::new(console), input, renderer))
                .await;
            Ok(())
        }
        other => execute_batch(&console, other, renderer).await,
    }
}

/// Runs a non-interactive action. Fires stop at the first unknown endpoint;
/// failed requests are rendered and do not stop the batch.
pub async fn execute_batch<T: Transport, W: Write>(console: &Console<T>, action: Action, mut renderer: TextRenderer<W>) -> Result<()> {
    match action {
        Action::List => renderer.catalog(console.catalog()),
        Action::Compose(ids) => {
            for id in ids {
                let request = console.compose(&id)?;
                renderer.text(&format!("# {}\n{}", id, request));
            }
        }
        Action::Fire { endpoint_ids, concurrent: false } => {
            for id in endpoint_ids {
                let outcome = console.fire(&id).await.with_context(|| format!("while firing {}", id))?;
                renderer.render(&id, &outcome);
            }
        }
        Action::Fire { endpoint_ids, concurrent: true } => {
            let ids: Vec<&str> = endpoint_ids.iter().map(String::as_str).collect();
            for (id, result) in ids.iter().zip(console.fire_concurrently(&ids).await) {
                let outcome = result.with_context(|| format!("while firing {}", id))?;
                renderer.render(id, &outcome);
            }
        }
        Action::Repl => bail!("the interactive console is not a batch action"),
    }
    Ok(())
}
