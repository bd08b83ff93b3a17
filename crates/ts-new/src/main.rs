//! ts-new - Interactive TypeScript project creation

use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use ts_new_core::config::{env_key, LOG_VAR};
use ts_new_core::ProductConfig;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ts-new product configuration
#[derive(Clone)]
pub struct TsNewConfig;

impl ProductConfig for TsNewConfig {
    fn name(&self) -> &'static str {
        "ts-new"
    }

    fn display_name(&self) -> &'static str {
        "ts-new"
    }

    fn template_owner(&self) -> &'static str {
        "mkvlrn"
    }

    fn env_prefix(&self) -> &'static str {
        "TS_NEW"
    }
}

#[derive(Parser, Debug)]
#[command(name = "ts-new")]
#[command(about = "Create a new TypeScript project from a template")]
#[command(version)]
pub struct Args {}

fn init_tracing(config: &TsNewConfig) {
    let filter = EnvFilter::try_from_env(env_key(config, LOG_VAR))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();
    let config = TsNewConfig;
    init_tracing(&config);
    tracing::debug!(version = CLI_VERSION, "starting");

    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // First Ctrl+C rolls back through the token; a second one exits at once
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            let _ = console::Term::stderr().show_cursor();
            std::process::exit(130);
        }
        handler_token.cancel();
    })
    .ok();

    let result = ts_new_core::run(&config, cancel, CLI_VERSION).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
