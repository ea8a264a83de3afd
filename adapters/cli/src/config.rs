//! TOML scenario describing the level a headless run should play.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use city_limits_core::{GridGeometry, Level};
use city_limits_world::PlacerConfig;
use glam::{IVec2, Vec2};
use serde::Deserialize;

const DEFAULT_CAR_SPEED: f32 = 80.0;

/// Scenario parameters loaded from disk or falling back to the built-in level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScenarioConfig {
    /// Level identifier selecting the marker configuration.
    pub(crate) level: u32,
    /// Seed for marker placement.
    pub(crate) seed: u64,
    /// Maximum number of ticks to simulate.
    pub(crate) ticks: u32,
    /// Simulated duration of a single tick in milliseconds.
    pub(crate) tick_ms: u64,
    /// Speed of every spawned car in pixels per second.
    pub(crate) car_speed: f32,
    /// Random draws the placer attempts before falling back.
    pub(crate) retry_budget: u32,
    /// Grid the level is played on.
    pub(crate) grid: GridConfig,
    /// Intersections to create and drag onto the grid.
    pub(crate) intersections: Vec<IntersectionDrag>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            level: 1,
            seed: 0,
            ticks: 600,
            tick_ms: 16,
            car_speed: DEFAULT_CAR_SPEED,
            retry_budget: PlacerConfig::default().retry_budget(),
            grid: GridConfig::default(),
            intersections: vec![IntersectionDrag {
                start: [40.0, 40.0],
                drop: [310.0, 190.0],
            }],
        }
    }
}

/// Grid dimensions and placement in pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridConfig {
    pub(crate) rows: u32,
    pub(crate) columns: u32,
    pub(crate) cell_size: u32,
    pub(crate) origin: [i32; 2],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 1,
            columns: 3,
            cell_size: 200,
            origin: [100, 100],
        }
    }
}

/// Scripted drag of a single intersection.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct IntersectionDrag {
    /// Position the intersection is created at and picked up from.
    pub(crate) start: [f32; 2],
    /// Position the intersection is dropped at.
    pub(crate) drop: [f32; 2],
}

impl IntersectionDrag {
    pub(crate) fn start(&self) -> Vec2 {
        Vec2::from(self.start)
    }

    pub(crate) fn drop_point(&self) -> Vec2 {
        Vec2::from(self.drop)
    }
}

impl ScenarioConfig {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses and validates scenario contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields that have no natural type-level constraint.
    pub(crate) fn validate(&self) -> Result<()> {
        let _ = self.level()?;
        let _ = self.geometry()?;
        if !self.car_speed.is_finite() || self.car_speed <= 0.0 {
            bail!("car speed must be positive, found {}", self.car_speed);
        }
        Ok(())
    }

    /// Level selected by the scenario.
    pub(crate) fn level(&self) -> Result<Level> {
        Level::try_from(self.level).context("unsupported level in scenario")
    }

    /// Grid geometry described by the scenario.
    pub(crate) fn geometry(&self) -> Result<GridGeometry> {
        let grid = &self.grid;
        GridGeometry::new(
            grid.rows,
            grid.columns,
            grid.cell_size,
            IVec2::from(grid.origin),
        )
        .context("invalid grid in scenario")
    }
}
