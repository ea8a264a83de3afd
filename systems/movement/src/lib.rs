#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Waypoint-following kinematics for cars.
//!
//! A car starts on the first waypoint of its path and travels towards each
//! following waypoint in turn at constant speed, turning to face the waypoint
//! it is heading for. Overshooting a waypoint snaps the car onto it; the
//! remainder of that tick's movement is discarded.

use std::time::Duration;

use city_limits_core::{CarPose, PathError};
use glam::Vec2;

/// Lifecycle of a car travelling along its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarState {
    /// The car still has waypoints ahead of it.
    Traveling,
    /// The car passed its final waypoint; updates no longer have any effect.
    Done,
}

/// Outcome of a single [`Car::update`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarProgress {
    /// The car moved towards its next waypoint without reaching it.
    Moving,
    /// The car arrived at the waypoint with the provided index.
    ReachedWaypoint(usize),
    /// The car had no waypoints left and finished this tick.
    Arrived,
    /// The car had already finished; nothing changed.
    Idle,
}

/// Moving point that follows a fixed, externally supplied route.
#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    path: Vec<Vec2>,
    next_waypoint: usize,
    position: Vec2,
    speed: f32,
    heading_degrees: f32,
    state: CarState,
}

impl Car {
    /// Places a new car on the first waypoint of `path`.
    ///
    /// `speed` is measured in pixels per second.
    pub fn new(path: Vec<Vec2>, speed: f32) -> Result<Self, PathError> {
        let Some(&start) = path.first() else {
            return Err(PathError::Empty);
        };
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PathError::InvalidSpeed);
        }

        Ok(Self {
            path,
            next_waypoint: 1,
            position: start,
            speed,
            heading_degrees: 0.0,
            state: CarState::Traveling,
        })
    }

    /// Advances the car by `dt` of simulated time.
    pub fn update(&mut self, dt: Duration) -> CarProgress {
        if self.state == CarState::Done {
            return CarProgress::Idle;
        }

        let Some(&target) = self.path.get(self.next_waypoint) else {
            self.state = CarState::Done;
            return CarProgress::Arrived;
        };

        let delta = target - self.position;
        let distance = delta.length();
        if distance > 0.0 {
            self.heading_degrees = delta.y.atan2(delta.x).to_degrees();
        }

        let step = self.speed * dt.as_secs_f32();
        if step >= distance {
            self.position = target;
            let reached = self.next_waypoint;
            self.next_waypoint += 1;
            CarProgress::ReachedWaypoint(reached)
        } else {
            self.position += delta * (step / distance);
            CarProgress::Moving
        }
    }

    /// Snapshot of the car's position, heading and completion flag.
    #[must_use]
    pub fn pose(&self) -> CarPose {
        CarPose {
            position: self.position,
            heading_degrees: self.heading_degrees,
            done: self.is_done(),
        }
    }

    /// Current pixel position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Heading in degrees, 0 facing along +x.
    #[must_use]
    pub const fn heading_degrees(&self) -> f32 {
        self.heading_degrees
    }

    /// Travel speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Lifecycle state of the car.
    #[must_use]
    pub const fn state(&self) -> CarState {
        self.state
    }

    /// Reports whether the car passed its final waypoint.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == CarState::Done
    }

    /// Index of the waypoint the car is heading for.
    #[must_use]
    pub const fn next_waypoint(&self) -> usize {
        self.next_waypoint
    }

    /// Waypoints the car follows.
    #[must_use]
    pub fn path(&self) -> &[Vec2] {
        &self.path
    }
}
