use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use csv_processor::cli::{run, Args};
use csv_processor::ProcessingError;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(&args) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err);
            ExitCode::from(err.exit_status())
        }
    }
}

/// Logging is opt-in (`-v` or `RUST_LOG`); the `Error:` line is the user-facing report.
fn init_logging(args: &Args) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"));
    if let Some(level) = args.log_level() {
        builder.filter_level(level);
    }
    builder.init();
}

fn print_error(err: &ProcessingError) {
    let line = format!("Error: [{}] {err}", err.code());
    if std::io::stderr().is_terminal() {
        eprintln!("\x1b[91m{line}\x1b[0m");
    } else {
        eprintln!("{line}");
    }
}
