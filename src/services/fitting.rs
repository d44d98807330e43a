use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use super::files::{load_json, write_json};
use super::output::render_table;
use crate::cli::OutputFormat;
use crate::config::settings::AppConfig;
use crate::rating::{self, AthleteNode, Comparison, FitOptions, RatingsReport};

pub struct FitRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub options: FitOptions,
}

pub struct FittingService {
    config: AppConfig,
}

impl FittingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, request: &FitRequest) -> Result<()> {
        info!("=== Starting Rating Fit ===");

        let comparisons: Vec<Comparison> = load_json(&request.input, "comparisons")?;
        info!("  → Loaded {} comparisons", comparisons.len());

        let report = self.build_report(&comparisons, &request.options)?;
        info!(
            "  → Rated {} athletes and {} equipment units",
            report.athletes.len(),
            report.equipment.len()
        );

        self.emit(&report, request)?;

        info!("=== Rating Fit Complete ===");
        Ok(())
    }

    pub fn build_report(
        &self,
        comparisons: &[Comparison],
        options: &FitOptions,
    ) -> Result<RatingsReport> {
        let result = rating::fit_model_with_settings(comparisons, options, &self.config.rating)?;
        Ok(RatingsReport::build(result))
    }

    fn emit(&self, report: &RatingsReport, request: &FitRequest) -> Result<()> {
        match request.format {
            OutputFormat::Json => write_json(request.output.as_deref(), report),
            OutputFormat::Table => {
                print!("{}", render_table(report));
                Ok(())
            }
        }
    }
}

/// Win-probability matrix for previously fitted athletes
pub fn probability_matrix_from_file(input: &Path, output: Option<&Path>) -> Result<()> {
    let athletes: Vec<AthleteNode> = load_json(input, "athletes")?;
    let matrix = rating::compute_probability_matrix(&athletes);
    write_json(output, &matrix)
}
