pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod errors;
pub mod history;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod redirection;
pub mod repl;
pub mod session;
pub mod supervisor;
pub mod timing;

use commands::Flow;
use config::ShellConfig;
use errors::{ShellError, ShellResult};
use repl::Repl;
use session::Session;
use tracing::{debug, info};

/// Print a failed line on the diagnostic stream
pub fn report_error(err: &ShellError) {
    debug!(error = %err, "line failed");
    eprintln!("{}", err);
}

/// Run one line in a fresh session, as `-c` does
pub fn run_once(line: &str) -> Flow {
    let mut session = Session::new();
    match session.execute_line(line) {
        Ok(report) => report.flow,
        Err(e) => {
            report_error(&e);
            Flow::Continue
        }
    }
}

/// Main entry point for the shell REPL
pub fn run_shell(config: &ShellConfig) -> ShellResult<()> {
    let mut repl = Repl::new(config)?;
    let mut session = Session::new();
    info!("session started");

    loop {
        match repl.read_input() {
            Ok(input) => match session.execute_line(&input) {
                Ok(report) if report.flow == Flow::Exit => break,
                Ok(_) => {}
                Err(e) => report_error(&e),
            },
            Err(ShellError::Interrupted) => {
                // Ctrl-D pressed, exit gracefully
                break;
            }
            Err(e) => {
                eprintln!("{}", e);
            }
        }
    }

    info!(
        lines = session.history().len(),
        child_time = %session.elapsed(),
        "session ended"
    );
    Ok(())
}
