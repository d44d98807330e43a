pub mod cli;
pub mod config;
pub mod errors;
pub mod rating;
pub mod services;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use std::path::{Path, PathBuf};

use crate::cli::{Command, OutputFormat};
use crate::config::settings::{AppConfig, RatingSettings};
use crate::rating::FitOptions;
use crate::services::fitting::{FitRequest, FittingService, probability_matrix_from_file};

pub use errors::RatingError;
pub use rating::{
    AthleteNode, Comparison, EquipmentNode, FitResult, RatingsReport, compute_probability_matrix,
    compute_standard_errors, fit_model, fit_model_with_settings,
};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_fit(
    input: &Path,
    output: Option<&Path>,
    equipment_bias: bool,
    format: OutputFormat,
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
) -> Result<()> {
    let config = AppConfig {
        rating: RatingSettings::default()
            .with_max_iterations(max_iterations)
            .with_tolerance(tolerance),
    };
    let request = FitRequest {
        input: input.to_path_buf(),
        output: output.map(PathBuf::from),
        format,
        options: FitOptions {
            include_equipment_bias: equipment_bias,
        },
    };

    FittingService::new(config).run(&request)
}

pub fn handle_matrix(input: &Path, output: Option<&Path>) -> Result<()> {
    probability_matrix_from_file(input, output)
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
