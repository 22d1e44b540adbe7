//! Stepgate CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use stepgate::cli::{self, Cli};
use stepgate::report::ConsoleReporter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("stepgate=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stepgate=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.debug);

    tracing::debug!("stepgate starting with args: {:?}", args);

    if args.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut reporter = if args.no_color || !console::colors_enabled() {
        ConsoleReporter::plain()
    } else {
        ConsoleReporter::new()
    };

    match cli::dispatch(&args, &mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
