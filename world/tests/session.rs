use std::{collections::HashSet, time::Duration};

use city_limits_core::{
    CellCoord, Command, Event, GridGeometry, IntersectionId, Level, MarkerRole, PathError,
};
use city_limits_world::{self as world, query, Session};
use glam::{IVec2, Vec2};

fn geometry() -> GridGeometry {
    GridGeometry::new(2, 2, 50, IVec2::new(100, 100)).expect("valid geometry")
}

fn loaded_session(level: Level) -> Session {
    let mut session = Session::new();
    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::LoadLevel {
            level,
            geometry: geometry(),
            seed: 0x1234_5678,
        },
        &mut events,
    );
    session
}

fn add_intersection(session: &mut Session, position: Vec2) -> IntersectionId {
    let mut events = Vec::new();
    world::apply(session, Command::AddIntersection { position }, &mut events);
    match events.as_slice() {
        [Event::IntersectionAdded { intersection }] => *intersection,
        other => panic!("unexpected events: {other:?}"),
    }
}

fn drag(session: &mut Session, from: Vec2, to: Vec2) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(session, Command::PointerPressed { position: from }, &mut events);
    world::apply(
        session,
        Command::PointerMoved {
            position: from.lerp(to, 0.5),
        },
        &mut events,
    );
    world::apply(session, Command::PointerReleased { position: to }, &mut events);
    events
}

#[test]
fn loading_a_level_reports_its_markers() {
    let mut session = Session::new();
    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::LoadLevel {
            level: Level::Two,
            geometry: geometry(),
            seed: 3,
        },
        &mut events,
    );

    let [Event::LevelLoaded {
        level,
        markers,
        strategy,
    }] = events.as_slice()
    else {
        panic!("unexpected events: {events:?}");
    };

    assert_eq!(*level, Level::Two);
    assert_eq!(markers.len(), 3);
    assert_eq!(markers.as_slice(), query::markers(&session));
    assert_eq!(Some(*strategy), query::placement_strategy(&session));
    assert_eq!(query::level(&session), Some(Level::Two));
    assert_eq!(query::geometry(&session), Some(geometry()));
    assert_eq!(query::markers_with_role(&session, MarkerRole::Start).count(), 1);
    assert_eq!(query::markers_with_role(&session, MarkerRole::End).count(), 2);

    let slots: HashSet<_> = markers.iter().map(|marker| marker.slot).collect();
    assert_eq!(slots.len(), markers.len());
}

#[test]
fn empty_session_exposes_no_level() {
    let session = Session::default();
    assert_eq!(query::level(&session), None);
    assert!(query::markers(&session).is_empty());
    assert!(query::car_view(&session).is_empty());
    assert!(query::all_cars_arrived(&session));
}

#[test]
fn dropping_inside_the_grid_snaps_the_intersection() {
    let mut session = loaded_session(Level::One);
    let intersection = add_intersection(&mut session, Vec2::new(20.0, 20.0));

    let events = drag(
        &mut session,
        Vec2::new(25.0, 15.0),
        Vec2::new(105.0, 125.0),
    );

    assert_eq!(
        events,
        vec![
            Event::DragStarted { intersection },
            Event::IntersectionSnapped {
                intersection,
                cell: CellCoord::new(0, 0),
            },
        ]
    );

    let view = query::intersection_view(&session);
    assert_eq!(view[0].position, Vec2::new(125.0, 125.0));
    assert_eq!(view[0].snapped_cell, Some(CellCoord::new(0, 0)));
    assert!(!view[0].dragging);
    assert_eq!(query::dragged_intersection(&session), None);
}

#[test]
fn dropping_outside_the_grid_leaves_the_intersection_in_place() {
    let mut session = loaded_session(Level::One);
    let intersection = add_intersection(&mut session, Vec2::new(20.0, 20.0));

    let events = drag(&mut session, Vec2::new(20.0, 20.0), Vec2::new(50.0, 125.0));

    assert_eq!(
        events.last(),
        Some(&Event::SnapRejected {
            intersection,
            position: Vec2::new(50.0, 125.0),
        })
    );
    let view = query::intersection_view(&session);
    assert_eq!(view[0].position, Vec2::new(50.0, 125.0));
    assert_eq!(view[0].snapped_cell, None);
}

#[test]
fn pointer_moves_follow_the_dragged_intersection() {
    let mut session = loaded_session(Level::One);
    let _ = add_intersection(&mut session, Vec2::new(20.0, 20.0));

    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::PointerPressed {
            position: Vec2::new(20.0, 20.0),
        },
        &mut events,
    );
    world::apply(
        &mut session,
        Command::PointerMoved {
            position: Vec2::new(70.0, 80.0),
        },
        &mut events,
    );

    let view = query::intersection_view(&session);
    assert!(view[0].dragging);
    assert_eq!(view[0].position, Vec2::new(70.0, 80.0));
    assert_eq!(query::dragged_intersection(&session), Some(view[0].id));
}

#[test]
fn pressing_empty_space_starts_no_drag() {
    let mut session = loaded_session(Level::One);
    let _ = add_intersection(&mut session, Vec2::new(20.0, 20.0));

    let events = drag(&mut session, Vec2::new(300.0, 300.0), Vec2::new(105.0, 125.0));

    assert!(events.is_empty(), "unexpected events: {events:?}");
    let view = query::intersection_view(&session);
    assert_eq!(view[0].position, Vec2::new(20.0, 20.0));
}

#[test]
fn first_hit_intersection_claims_the_drag() {
    let mut session = loaded_session(Level::One);
    let first = add_intersection(&mut session, Vec2::new(20.0, 20.0));
    let second = add_intersection(&mut session, Vec2::new(30.0, 20.0));

    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::PointerPressed {
            position: Vec2::new(25.0, 20.0),
        },
        &mut events,
    );
    world::apply(
        &mut session,
        Command::PointerPressed {
            position: Vec2::new(30.0, 20.0),
        },
        &mut events,
    );

    assert_eq!(events, vec![Event::DragStarted { intersection: first }]);
    let view = query::intersection_view(&session);
    assert!(view[first.get() as usize].dragging);
    assert!(!view[second.get() as usize].dragging);
}

#[test]
fn release_before_any_level_is_rejected() {
    let mut session = Session::new();
    let intersection = add_intersection(&mut session, Vec2::new(20.0, 20.0));

    let events = drag(&mut session, Vec2::new(20.0, 20.0), Vec2::new(105.0, 125.0));

    assert_eq!(
        events.last(),
        Some(&Event::SnapRejected {
            intersection,
            position: Vec2::new(105.0, 125.0),
        })
    );
}

#[test]
fn reloading_a_level_clears_cars_and_snaps() {
    let mut session = loaded_session(Level::One);
    let _ = add_intersection(&mut session, Vec2::new(20.0, 20.0));
    let _ = drag(&mut session, Vec2::new(20.0, 20.0), Vec2::new(105.0, 125.0));

    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::SpawnCar {
            path: vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            speed: 5.0,
        },
        &mut events,
    );
    assert_eq!(query::car_view(&session).len(), 1);

    world::apply(
        &mut session,
        Command::LoadLevel {
            level: Level::Three,
            geometry: geometry(),
            seed: 9,
        },
        &mut events,
    );

    assert!(query::car_view(&session).is_empty());
    let view = query::intersection_view(&session);
    assert_eq!(view[0].snapped_cell, None);
    assert_eq!(view[0].position, Vec2::new(125.0, 125.0));
    assert_eq!(query::markers(&session).len(), 4);
}

#[test]
fn cars_report_waypoints_and_arrival() {
    let mut session = loaded_session(Level::One);
    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::SpawnCar {
            path: vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            speed: 10.0,
        },
        &mut events,
    );
    let [Event::CarSpawned { car }] = events.as_slice() else {
        panic!("unexpected events: {events:?}");
    };
    let car = *car;

    let mut tick_events = Vec::new();
    world::apply(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut tick_events,
    );
    assert_eq!(
        tick_events,
        vec![
            Event::TimeAdvanced {
                dt: Duration::from_secs(1)
            },
            Event::WaypointReached { car, waypoint: 1 },
        ]
    );
    assert!(!query::all_cars_arrived(&session));

    tick_events.clear();
    world::apply(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut tick_events,
    );
    assert_eq!(tick_events.last(), Some(&Event::CarArrived { car }));
    assert!(query::all_cars_arrived(&session));

    let snapshot = query::car_view(&session)[0];
    assert_eq!(snapshot.id, car);
    assert_eq!(snapshot.pose.position, Vec2::new(10.0, 0.0));
    assert!(snapshot.pose.done);
    assert_eq!(query::tick_index(&session), 2);
}

#[test]
fn invalid_cars_are_rejected() {
    let mut session = loaded_session(Level::One);
    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::SpawnCar {
            path: Vec::new(),
            speed: 10.0,
        },
        &mut events,
    );
    world::apply(
        &mut session,
        Command::SpawnCar {
            path: vec![Vec2::ZERO],
            speed: 0.0,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::CarRejected {
                reason: PathError::Empty
            },
            Event::CarRejected {
                reason: PathError::InvalidSpeed
            },
        ]
    );
    assert!(query::car_view(&session).is_empty());
}

#[test]
fn intersection_ids_follow_creation_order() {
    let mut session = loaded_session(Level::One);
    let added: Vec<_> = [20.0, 80.0, 140.0]
        .into_iter()
        .map(|x| add_intersection(&mut session, Vec2::new(x, 20.0)))
        .collect();

    assert_eq!(
        added,
        vec![
            IntersectionId::new(0),
            IntersectionId::new(1),
            IntersectionId::new(2)
        ]
    );
    let ids: Vec<_> = query::intersection_view(&session)
        .iter()
        .map(|snapshot| snapshot.id)
        .collect();
    assert_eq!(ids, added);
}

#[test]
fn redropping_a_snapped_intersection_off_grid_is_rejected() {
    let mut session = loaded_session(Level::One);
    let intersection = add_intersection(&mut session, Vec2::new(20.0, 20.0));
    let _ = drag(&mut session, Vec2::new(20.0, 20.0), Vec2::new(105.0, 125.0));

    let events = drag(&mut session, Vec2::new(125.0, 125.0), Vec2::new(400.0, 400.0));

    assert_eq!(
        events,
        vec![
            Event::DragStarted { intersection },
            Event::SnapRejected {
                intersection,
                position: Vec2::new(400.0, 400.0),
            },
        ]
    );
    let view = query::intersection_view(&session);
    assert_eq!(view[0].snapped_cell, None);
    assert!(!view[0].dragging);
}
