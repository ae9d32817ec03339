use anyhow::Result;
use junebug_console::config::{build_cli, parse_matches};
use junebug_console::execute::execute;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let (config, action) = parse_matches(&matches);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())))
        .with_writer(std::io::stderr)
        .init();

    execute(&config, action).await
}
