use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bradley-Terry ratings for head-to-head rowing results")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fit athlete strengths from a JSON array of comparisons
    Fit {
        /// Path to the comparisons file
        #[arg(short, long)]
        input: PathBuf,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Jointly estimate equipment speed
        #[arg(short, long)]
        equipment_bias: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Override the iteration cap
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Override the convergence tolerance
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Print the win-probability matrix for a JSON array of fitted athletes
    Matrix {
        /// Path to the athletes file
        #[arg(short, long)]
        input: PathBuf,
        /// Write the matrix here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fit_with_overrides() {
        let cli = Cli::try_parse_from([
            "crew_ranking",
            "fit",
            "--input",
            "results.json",
            "--equipment-bias",
            "--format",
            "table",
            "--max-iterations",
            "250",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Fit {
                input: PathBuf::from("results.json"),
                output: None,
                equipment_bias: true,
                format: OutputFormat::Table,
                max_iterations: Some(250),
                tolerance: None,
            }
        );
    }

    #[test]
    fn test_fit_requires_input() {
        assert!(Cli::try_parse_from(["crew_ranking", "fit"]).is_err());
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["crew_ranking", "completions", "bash"]).unwrap();
        assert_eq!(cli.command, Command::Completions { shell: Shell::Bash });
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
