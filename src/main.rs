//! bespoke binary entry point.

use std::process::ExitCode;

use bespoke::cli::{self, Cli};
use bespoke::ui::output;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "BESPOKE_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug, cli.quiet);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber.
fn init_tracing(debug: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else if debug {
            EnvFilter::new("bespoke=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
