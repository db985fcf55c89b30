use clap::Parser;
use pipeshell::cli::ShellArgs;
use pipeshell::config::ShellConfig;
use pipeshell::logging::init_tracing;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = ShellArgs::parse();
    let config = ShellConfig::from(&args);
    init_tracing(&config.log_filter, config.color);

    if let Some(line) = args.command.as_deref() {
        pipeshell::run_once(line);
        return ExitCode::SUCCESS;
    }

    match pipeshell::run_shell(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // only reachable when the line editor cannot start
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
