#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for a City Limits level.
//!
//! A [`Session`] owns the active grid, the perimeter markers placed when the
//! level loaded, the cars travelling through the city and the intersections
//! the player drags around. Drivers mutate it exclusively through [`apply`],
//! which reports the resulting [`Event`] values, and observe it through the
//! read-only [`query`] functions.

use std::collections::BTreeMap;

use city_limits_core::{
    CarId, Command, Event, GridGeometry, IntersectionId, Level, PlacementStrategy, SpawnMarker,
};
use city_limits_system_movement::{Car, CarProgress};
use city_limits_system_placement::PlacementSlot;
use city_limits_system_spawning::SpawnPlacer;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use city_limits_system_spawning::Config as PlacerConfig;

/// Level that is currently being played.
#[derive(Clone, Debug, PartialEq)]
struct ActiveLevel {
    level: Level,
    geometry: GridGeometry,
    markers: Vec<SpawnMarker>,
    strategy: PlacementStrategy,
}

/// Represents the authoritative state of a single play session.
#[derive(Debug)]
pub struct Session {
    placer: SpawnPlacer,
    active: Option<ActiveLevel>,
    cars: BTreeMap<CarId, Car>,
    next_car_id: CarId,
    intersections: Vec<PlacementSlot>,
    dragging: Option<IntersectionId>,
    tick_index: u64,
}

impl Session {
    /// Creates an empty session using the default placement configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_placer(PlacerConfig::default())
    }

    /// Creates an empty session whose marker placement uses `config`.
    #[must_use]
    pub fn with_placer(config: PlacerConfig) -> Self {
        Self {
            placer: SpawnPlacer::new(config),
            active: None,
            cars: BTreeMap::new(),
            next_car_id: CarId::new(0),
            intersections: Vec::new(),
            dragging: None,
            tick_index: 0,
        }
    }

    fn load_level(&mut self, level: Level, geometry: GridGeometry, seed: u64) -> &ActiveLevel {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let placement = self.placer.place(level, &geometry, &mut rng);
        info!(
            level = level.number(),
            rows = geometry.rows(),
            columns = geometry.columns(),
            strategy = ?placement.strategy,
            "level loaded"
        );

        self.cars.clear();
        self.next_car_id = CarId::new(0);
        self.tick_index = 0;
        if let Some(id) = self.dragging.take() {
            if let Some(slot) = self.intersection_mut(id) {
                slot.end_drag();
            }
        }
        for slot in &mut self.intersections {
            slot.clear_snap();
        }

        self.active.insert(ActiveLevel {
            level,
            geometry,
            markers: placement.markers,
            strategy: placement.strategy,
        })
    }

    fn allocate_car_id(&mut self) -> CarId {
        let id = self.next_car_id;
        self.next_car_id = CarId::new(id.get().saturating_add(1));
        id
    }

    fn intersection_mut(&mut self, id: IntersectionId) -> Option<&mut PlacementSlot> {
        let index = usize::try_from(id.get()).ok()?;
        self.intersections.get_mut(index)
    }

    fn press(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        if self.dragging.is_some() {
            return;
        }

        let Some(index) = self
            .intersections
            .iter()
            .position(|slot| slot.hit_test(position))
        else {
            return;
        };

        let Ok(raw) = u32::try_from(index) else {
            return;
        };
        let intersection = IntersectionId::new(raw);
        self.intersections[index].begin_drag();
        self.dragging = Some(intersection);
        out_events.push(Event::DragStarted { intersection });
    }

    fn release(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        let Some(intersection) = self.dragging.take() else {
            return;
        };
        let geometry = self.active.as_ref().map(|active| active.geometry);
        let Some(slot) = self.intersection_mut(intersection) else {
            return;
        };

        slot.update_drag(position);
        slot.end_drag();

        let snapped = match geometry {
            Some(geometry) if slot.snap_to_grid(&geometry) => slot.snapped_cell(),
            _ => None,
        };

        match snapped {
            Some(cell) => {
                debug!(
                    intersection = intersection.get(),
                    column = cell.column(),
                    row = cell.row(),
                    "intersection snapped"
                );
                out_events.push(Event::IntersectionSnapped { intersection, cell });
            }
            None => {
                debug!(
                    intersection = intersection.get(),
                    x = slot.position().x,
                    y = slot.position().y,
                    "intersection dropped outside the grid"
                );
                out_events.push(Event::SnapRejected {
                    intersection,
                    position: slot.position(),
                });
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the session, reporting what changed.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel {
            level,
            geometry,
            seed,
        } => {
            let active = session.load_level(level, geometry, seed);
            out_events.push(Event::LevelLoaded {
                level: active.level,
                markers: active.markers.clone(),
                strategy: active.strategy,
            });
        }
        Command::AddIntersection { position } => {
            let Ok(raw) = u32::try_from(session.intersections.len()) else {
                warn!("intersection identifiers exhausted");
                return;
            };
            let intersection = IntersectionId::new(raw);
            session.intersections.push(PlacementSlot::new(position));
            out_events.push(Event::IntersectionAdded { intersection });
        }
        Command::SpawnCar { path, speed } => match Car::new(path, speed) {
            Ok(car) => {
                let id = session.allocate_car_id();
                let _ = session.cars.insert(id, car);
                out_events.push(Event::CarSpawned { car: id });
            }
            Err(reason) => {
                warn!(%reason, "car rejected");
                out_events.push(Event::CarRejected { reason });
            }
        },
        Command::Tick { dt } => {
            session.tick_index = session.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            for (&car, state) in session.cars.iter_mut() {
                match state.update(dt) {
                    CarProgress::ReachedWaypoint(waypoint) => {
                        out_events.push(Event::WaypointReached { car, waypoint });
                    }
                    CarProgress::Arrived => {
                        debug!(car = car.get(), tick = session.tick_index, "car arrived");
                        out_events.push(Event::CarArrived { car });
                    }
                    CarProgress::Moving | CarProgress::Idle => {}
                }
            }
        }
        Command::PointerPressed { position } => session.press(position, out_events),
        Command::PointerMoved { position } => {
            if let Some(id) = session.dragging {
                if let Some(slot) = session.intersection_mut(id) {
                    slot.update_drag(position);
                }
            }
        }
        Command::PointerReleased { position } => session.release(position, out_events),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use super::Session;
    use city_limits_core::{
        CarSnapshot, GridGeometry, IntersectionId, IntersectionSnapshot, Level, MarkerRole,
        PlacementStrategy, SpawnMarker,
    };

    /// Level currently being played, if any.
    #[must_use]
    pub fn level(session: &Session) -> Option<Level> {
        session.active.as_ref().map(|active| active.level)
    }

    /// Grid of the level currently being played, if any.
    #[must_use]
    pub fn geometry(session: &Session) -> Option<GridGeometry> {
        session.active.as_ref().map(|active| active.geometry)
    }

    /// Markers placed when the current level loaded.
    #[must_use]
    pub fn markers(session: &Session) -> &[SpawnMarker] {
        match &session.active {
            Some(active) => &active.markers,
            None => &[],
        }
    }

    /// Markers of the provided role in placement order.
    pub fn markers_with_role(
        session: &Session,
        role: MarkerRole,
    ) -> impl Iterator<Item = &SpawnMarker> {
        markers(session)
            .iter()
            .filter(move |marker| marker.role == role)
    }

    /// Strategy that produced the current marker layout.
    #[must_use]
    pub fn placement_strategy(session: &Session) -> Option<PlacementStrategy> {
        session.active.as_ref().map(|active| active.strategy)
    }

    /// Captures the state of every car in identifier order.
    #[must_use]
    pub fn car_view(session: &Session) -> Vec<CarSnapshot> {
        session
            .cars
            .iter()
            .map(|(&id, car)| CarSnapshot {
                id,
                pose: car.pose(),
                next_waypoint: car.next_waypoint(),
            })
            .collect()
    }

    /// Reports whether every car has passed its final waypoint.
    #[must_use]
    pub fn all_cars_arrived(session: &Session) -> bool {
        session.cars.values().all(|car| car.is_done())
    }

    /// Captures the state of every intersection in identifier order.
    #[must_use]
    pub fn intersection_view(session: &Session) -> Vec<IntersectionSnapshot> {
        session
            .intersections
            .iter()
            .enumerate()
            .map_while(|(index, slot)| {
                let id = IntersectionId::new(u32::try_from(index).ok()?);
                Some(IntersectionSnapshot {
                    id,
                    position: slot.position(),
                    dragging: slot.is_dragging(),
                    snapped_cell: slot.snapped_cell(),
                })
            })
            .collect()
    }

    /// Intersection currently following the pointer, if any.
    #[must_use]
    pub fn dragged_intersection(session: &Session) -> Option<IntersectionId> {
        session.dragging
    }

    /// Number of ticks applied since the current level loaded.
    #[must_use]
    pub fn tick_index(session: &Session) -> u64 {
        session.tick_index
    }
}
