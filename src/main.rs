//! tagtrack binary entry point.

use std::process::ExitCode;

use tagtrack::cli::{self, Cli};
use tagtrack::ui::output::{Level, Reporter, Verbosity};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TAGTRACK_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.debug_enabled());

    let in_actions = std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");
    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{:#}", err);
            if in_actions {
                let reporter = Reporter::new(Verbosity::default()).with_workflow_commands(true);
                println!("{}", reporter.render(Level::Error, &message));
            }
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr, filtered by `TAGTRACK_LOG`.
fn init_logging(debug: bool) {
    let default = if debug { "tagtrack=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
