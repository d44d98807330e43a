use anyhow::Result;

use crew_ranking::cli::Command;
use crew_ranking::{handle_completions, handle_fit, handle_matrix, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Fit {
            input,
            output,
            equipment_bias,
            format,
            max_iterations,
            tolerance,
        } => handle_fit(
            input,
            output.as_deref(),
            *equipment_bias,
            *format,
            *max_iterations,
            *tolerance,
        ),
        Command::Matrix { input, output } => handle_matrix(input, output.as_deref()),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
