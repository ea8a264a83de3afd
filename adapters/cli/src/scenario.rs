//! Headless playthrough of a scripted scenario.

use std::{fmt, time::Duration};

use anyhow::{bail, ensure, Result};
use city_limits_core::{
    Command, Event, GridGeometry, Level, MarkerRole, PlacementStrategy, SpawnMarker,
};
use city_limits_system_perimeter::bordering_cell;
use city_limits_world::{self as world, query, PlacerConfig, Session};
use glam::Vec2;
use tracing::{debug, info};

use crate::config::ScenarioConfig;

/// Summary of a finished scenario run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Report {
    pub(crate) level: Level,
    pub(crate) strategy: PlacementStrategy,
    pub(crate) markers: Vec<SpawnMarker>,
    pub(crate) snapped: usize,
    pub(crate) rejected_drops: usize,
    pub(crate) cars_spawned: usize,
    pub(crate) cars_arrived: usize,
    pub(crate) ticks: u64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "level {} ({:?} placement, {} markers)",
            self.level.number(),
            self.strategy,
            self.markers.len()
        )?;
        for marker in &self.markers {
            let role = match marker.role {
                MarkerRole::Start => "start",
                MarkerRole::End => "end",
            };
            writeln!(
                f,
                "  {role:<5} #{} at ({}, {})",
                marker.index, marker.pixel.x, marker.pixel.y
            )?;
        }
        writeln!(
            f,
            "intersections: {} snapped, {} dropped off-grid",
            self.snapped, self.rejected_drops
        )?;
        write!(
            f,
            "cars: {}/{} arrived after {} ticks",
            self.cars_arrived, self.cars_spawned, self.ticks
        )
    }
}

/// Plays the scenario to completion or until its tick limit runs out.
pub(crate) fn run(config: &ScenarioConfig) -> Result<Report> {
    let level = config.level()?;
    let geometry = config.geometry()?;
    ensure!(config.tick_ms > 0, "tick duration must be positive");

    let mut session = Session::with_placer(PlacerConfig::new(config.retry_budget));
    let mut events = Vec::new();

    world::apply(
        &mut session,
        Command::LoadLevel {
            level,
            geometry,
            seed: config.seed,
        },
        &mut events,
    );

    for drag in &config.intersections {
        let start = drag.start();
        let drop = drag.drop_point();
        for command in [
            Command::AddIntersection { position: start },
            Command::PointerPressed { position: start },
            Command::PointerMoved {
                position: start.lerp(drop, 0.5),
            },
            Command::PointerReleased { position: drop },
        ] {
            world::apply(&mut session, command, &mut events);
        }
    }

    for path in routes(&session, &geometry) {
        world::apply(
            &mut session,
            Command::SpawnCar {
                path,
                speed: config.car_speed,
            },
            &mut events,
        );
    }

    let dt = Duration::from_millis(config.tick_ms);
    for _ in 0..config.ticks {
        if query::all_cars_arrived(&session) {
            break;
        }
        world::apply(&mut session, Command::Tick { dt }, &mut events);
    }

    let report = summarise(&session, &events)?;
    info!(
        level = report.level.number(),
        arrived = report.cars_arrived,
        spawned = report.cars_spawned,
        ticks = report.ticks,
        "scenario finished"
    );
    Ok(report)
}

/// Builds one route per end marker, taking start markers in turn.
///
/// Cars leave their start marker for the bordering cell, travel along the
/// start row and then the destination column, and exit through the end marker.
fn routes(session: &Session, geometry: &GridGeometry) -> Vec<Vec<Vec2>> {
    let starts: Vec<_> = query::markers_with_role(session, MarkerRole::Start).collect();
    if starts.is_empty() {
        return Vec::new();
    }

    query::markers_with_role(session, MarkerRole::End)
        .zip(starts.iter().cycle())
        .map(|(end, start)| {
            let entry = geometry
                .cell_center(bordering_cell(start.slot, geometry))
                .as_vec2();
            let exit = geometry
                .cell_center(bordering_cell(end.slot, geometry))
                .as_vec2();
            let path = vec![
                start.pixel.as_vec2(),
                entry,
                Vec2::new(exit.x, entry.y),
                exit,
                end.pixel.as_vec2(),
            ];
            debug!(from = start.index, to = end.index, "route planned");
            path
        })
        .collect()
}

fn summarise(session: &Session, events: &[Event]) -> Result<Report> {
    let Some(level) = query::level(session) else {
        bail!("scenario finished without a loaded level");
    };
    let Some(strategy) = query::placement_strategy(session) else {
        bail!("scenario finished without a marker layout");
    };

    let count = |predicate: fn(&Event) -> bool| events.iter().filter(|e| predicate(e)).count();
    Ok(Report {
        level,
        strategy,
        markers: query::markers(session).to_vec(),
        snapped: count(|event| matches!(event, Event::IntersectionSnapped { .. })),
        rejected_drops: count(|event| matches!(event, Event::SnapRejected { .. })),
        cars_spawned: count(|event| matches!(event, Event::CarSpawned { .. })),
        cars_arrived: count(|event| matches!(event, Event::CarArrived { .. })),
        ticks: query::tick_index(session),
    })
}
