#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a City Limits scenario headlessly.

mod config;
mod scenario;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::ScenarioConfig;

/// Command-line arguments for the City Limits runner.
#[derive(Debug, Parser)]
#[command(name = "city-limits", about = "Plays a City Limits level without a window")]
struct CliArgs {
    /// Scenario file describing the grid, level and scripted drags.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the level selected by the scenario.
    #[arg(long, value_name = "LEVEL")]
    level: Option<u32>,
    /// Overrides the seed used to place the perimeter markers.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Overrides the maximum number of simulated ticks.
    #[arg(long, value_name = "COUNT")]
    ticks: Option<u32>,
}

impl CliArgs {
    fn scenario(&self) -> Result<ScenarioConfig> {
        let mut scenario = match &self.config {
            Some(path) => ScenarioConfig::load(path)?,
            None => ScenarioConfig::default(),
        };
        if let Some(level) = self.level {
            scenario.level = level;
        }
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            scenario.ticks = ticks;
        }
        scenario.validate()?;
        Ok(scenario)
    }
}

/// Entry point for the City Limits command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    let scenario = args.scenario()?;
    let report = scenario::run(&scenario)?;
    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_built_in_scenario() {
        let args = CliArgs::try_parse_from(["city-limits", "--level", "2", "--seed", "5"])
            .expect("arguments parse");
        let scenario = args.scenario().expect("scenario resolves");

        assert_eq!(scenario.level, 2);
        assert_eq!(scenario.seed, 5);
        assert_eq!(scenario.ticks, ScenarioConfig::default().ticks);
    }

    #[test]
    fn unknown_level_flag_is_rejected() {
        let args =
            CliArgs::try_parse_from(["city-limits", "--level", "9"]).expect("arguments parse");
        assert!(args.scenario().is_err());
    }

    #[test]
    fn missing_scenario_file_reports_its_path() {
        let args = CliArgs::try_parse_from(["city-limits", "--config", "/nonexistent/level.toml"])
            .expect("arguments parse");
        let error = args.scenario().expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/level.toml"));
    }
}
