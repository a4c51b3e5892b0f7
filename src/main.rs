//! notilog - write a log line and forward it to a chat webhook
//!
//! Handy in shell scripts and deploy hooks: the line goes to stdout or stderr
//! like any other log line, and the notification is delivered before exit.

use anyhow::Result;
use clap::Parser;
use notilog::{cli::Cli, config::Config, Logger, Severity};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics of the crate itself, quiet unless RUST_LOG asks for more.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, severity) = match Config::load(&cli).and_then(|config| {
        let severity = cli.level.parse::<Severity>()?;
        Ok((config, severity))
    }) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("notilog: {}", err);
            std::process::exit(1);
        }
    };

    let logger = Logger::from_config(&config).unwrap_or_else(|err| {
        eprintln!("notilog: {}", err);
        std::process::exit(1);
    });

    logger.emit(severity, &cli.message, cli.annotations().as_ref());

    logger.flush().await;
    Ok(())
}
