#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the City Limits traffic layout engine.
//!
//! This crate defines the value types every other crate speaks in: the grid
//! geometry that maps cells to pixels, perimeter slots and the spawn markers
//! placed on them, level configurations, and the [`Command`] / [`Event`]
//! surface used by drivers to interact with a session. Drivers submit
//! commands, the session applies them through its `apply` entry point and
//! reports events describing what changed. Everything here is plain data that
//! an external renderer can consume without knowing how it was produced.

use std::time::Duration;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playable levels, each selecting a fixed start/end marker configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// One start marker and one end marker.
    One,
    /// One start marker and two end markers.
    Two,
    /// Two start markers and two end markers.
    Three,
}

impl Level {
    /// Every level in ascending order.
    pub const ALL: [Level; 3] = [Level::One, Level::Two, Level::Three];

    /// Numeric identifier used by menus and configuration files.
    #[must_use]
    pub const fn number(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Number of start markers placed when the level loads.
    #[must_use]
    pub const fn starts(self) -> usize {
        match self {
            Self::One | Self::Two => 1,
            Self::Three => 2,
        }
    }

    /// Number of end markers placed when the level loads.
    #[must_use]
    pub const fn ends(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two | Self::Three => 2,
        }
    }

    /// Total number of markers placed when the level loads.
    #[must_use]
    pub const fn marker_count(self) -> usize {
        self.starts() + self.ends()
    }
}

impl TryFrom<u32> for Level {
    type Error = UnknownLevel;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(UnknownLevel(other)),
        }
    }
}

/// Raised when a level identifier has no entry in the marker configuration table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("level {0} has no marker configuration")]
pub struct UnknownLevel(pub u32);

/// Reasons a grid geometry cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The grid must contain at least one row.
    #[error("grid requires at least one row")]
    NoRows,
    /// The grid must contain at least one column.
    #[error("grid requires at least one column")]
    NoColumns,
    /// Cells must span at least one pixel.
    #[error("cell size must be positive")]
    EmptyCells,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Pixel layout of the city grid for a single level.
///
/// The geometry is immutable once built; every placement and snap operation
/// borrows it rather than storing a copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridGeometry {
    rows: u32,
    columns: u32,
    cell_size: u32,
    origin: IVec2,
}

impl GridGeometry {
    /// Creates a new geometry, rejecting empty grids and zero-sized cells.
    pub fn new(
        rows: u32,
        columns: u32,
        cell_size: u32,
        origin: IVec2,
    ) -> Result<Self, GeometryError> {
        if rows == 0 {
            return Err(GeometryError::NoRows);
        }
        if columns == 0 {
            return Err(GeometryError::NoColumns);
        }
        if cell_size == 0 {
            return Err(GeometryError::EmptyCells);
        }

        Ok(Self {
            rows,
            columns,
            cell_size,
            origin,
        })
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Side length of a single square cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Pixel coordinate of the grid's top-left corner.
    #[must_use]
    pub const fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        (self.columns * self.cell_size) as i32
    }

    /// Total height of the grid in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        (self.rows * self.cell_size) as i32
    }

    /// Number of discrete slots along the outer boundary of the grid.
    #[must_use]
    pub const fn perimeter_len(&self) -> u32 {
        2 * (self.rows + self.columns)
    }

    /// Half the cell size, rounded down, as used for every midpoint.
    #[must_use]
    pub const fn half_cell(&self) -> i32 {
        (self.cell_size / 2) as i32
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Pixel coordinate of the centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> IVec2 {
        let size = self.cell_size as i32;
        self.origin
            + IVec2::new(
                cell.column() as i32 * size + self.half_cell(),
                cell.row() as i32 * size + self.half_cell(),
            )
    }

    /// Resolves the cell containing the provided pixel position.
    ///
    /// Positions left of or above the origin, or beyond the last row or column,
    /// resolve to `None`.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        let relative = point - self.origin.as_vec2();
        if !relative.is_finite() || relative.x < 0.0 || relative.y < 0.0 {
            return None;
        }

        let size = self.cell_size as f32;
        let column = (relative.x / size).floor() as u32;
        let row = (relative.y / size).floor() as u32;
        let cell = CellCoord::new(column, row);
        self.contains(cell).then_some(cell)
    }
}

/// Edge of the grid a perimeter slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PerimeterSide {
    /// Upper edge, traversed left to right.
    Top,
    /// Right edge, traversed top to bottom.
    Right,
    /// Lower edge, traversed right to left.
    Bottom,
    /// Left edge, traversed bottom to top.
    Left,
}

impl PerimeterSide {
    /// Unit vector pointing away from the grid, used by renderers to offset markers.
    #[must_use]
    pub const fn outward(self) -> IVec2 {
        match self {
            Self::Top => IVec2::new(0, -1),
            Self::Right => IVec2::new(1, 0),
            Self::Bottom => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
        }
    }
}

/// One discrete position along the outer boundary of the grid.
///
/// `lane` is the column index for top and bottom slots and the row index for
/// left and right slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PerimeterSlot {
    side: PerimeterSide,
    lane: u32,
}

impl PerimeterSlot {
    /// Creates a slot on the given side at the given lane.
    #[must_use]
    pub const fn new(side: PerimeterSide, lane: u32) -> Self {
        Self { side, lane }
    }

    /// Side of the grid the slot belongs to.
    #[must_use]
    pub const fn side(&self) -> PerimeterSide {
        self.side
    }

    /// Column or row index of the cell the slot borders.
    #[must_use]
    pub const fn lane(&self) -> u32 {
        self.lane
    }
}

/// Role assigned to a spawn marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerRole {
    /// Cars enter the city here.
    Start,
    /// Cars leave the city here.
    End,
}

/// Immutable record describing a marker placed on the grid perimeter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnMarker {
    /// Whether cars start or end at the marker.
    pub role: MarkerRole,
    /// Perimeter slot the marker occupies.
    pub slot: PerimeterSlot,
    /// Clockwise linear index of the slot.
    pub index: u32,
    /// Midpoint of the outward-facing cell edge in pixels.
    pub pixel: IVec2,
}

/// Strategy that produced a marker layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementStrategy {
    /// Random draws satisfied the spacing within the retry budget.
    Sampled,
    /// Random draws ran out, so an evenly spaced lattice was used instead.
    Lattice,
    /// Spacing was infeasible and unused slots were filled at random.
    Unspaced,
}

impl PlacementStrategy {
    /// Reports whether the layout honours the minimum marker spacing.
    #[must_use]
    pub const fn is_spaced(self) -> bool {
        !matches!(self, Self::Unspaced)
    }
}

/// Unique identifier assigned to a car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CarId(u32);

impl CarId {
    /// Creates a new car identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a draggable intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntersectionId(u32);

impl IntersectionId {
    /// Creates a new intersection identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position and heading of a car as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarPose {
    /// Current pixel position.
    pub position: Vec2,
    /// Heading in degrees, 0 facing along +x.
    pub heading_degrees: f32,
    /// Whether the car has passed its final waypoint.
    pub done: bool,
}

/// Immutable representation of a single car's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarSnapshot {
    /// Identifier assigned to the car.
    pub id: CarId,
    /// Position, heading and completion flag of the car.
    pub pose: CarPose,
    /// Index of the waypoint the car is heading for.
    pub next_waypoint: usize,
}

/// Immutable representation of a single intersection's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionSnapshot {
    /// Identifier assigned to the intersection.
    pub id: IntersectionId,
    /// Current pixel position.
    pub position: Vec2,
    /// Whether the intersection is following the pointer.
    pub dragging: bool,
    /// Cell the intersection rests on, if snapped.
    pub snapped_cell: Option<CellCoord>,
}

/// Reasons a car cannot be created from the supplied route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// Routes require at least one waypoint.
    #[error("car path must contain at least one waypoint")]
    Empty,
    /// Speeds must be finite and positive.
    #[error("car speed must be finite and positive")]
    InvalidSpeed,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads a level, placing fresh perimeter markers on the provided grid.
    LoadLevel {
        /// Level selecting the marker configuration.
        level: Level,
        /// Grid the level is played on.
        geometry: GridGeometry,
        /// Seed for the marker placement random source.
        seed: u64,
    },
    /// Adds a draggable intersection at the provided pixel position.
    AddIntersection {
        /// Initial pixel position of the intersection.
        position: Vec2,
    },
    /// Creates a car that follows the provided waypoints.
    SpawnCar {
        /// Ordered pixel waypoints, the first being the spawn position.
        path: Vec<Vec2>,
        /// Travel speed in pixels per second.
        speed: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that the pointer was pressed.
    PointerPressed {
        /// Pointer position in pixels.
        position: Vec2,
    },
    /// Reports that the pointer moved.
    PointerMoved {
        /// Pointer position in pixels.
        position: Vec2,
    },
    /// Reports that the pointer was released.
    PointerReleased {
        /// Pointer position in pixels.
        position: Vec2,
    },
}

/// Events reported by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a level was loaded and its markers placed.
    LevelLoaded {
        /// Level that became active.
        level: Level,
        /// Markers placed along the perimeter.
        markers: Vec<SpawnMarker>,
        /// Strategy that produced the marker layout.
        strategy: PlacementStrategy,
    },
    /// Confirms that an intersection was created.
    IntersectionAdded {
        /// Identifier assigned to the intersection.
        intersection: IntersectionId,
    },
    /// Confirms that a car was created.
    CarSpawned {
        /// Identifier assigned to the car.
        car: CarId,
    },
    /// Reports that a car could not be created.
    CarRejected {
        /// Specific reason the car was rejected.
        reason: PathError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that a car arrived at one of its waypoints.
    WaypointReached {
        /// Identifier of the car.
        car: CarId,
        /// Index of the waypoint within the car's path.
        waypoint: usize,
    },
    /// Reports that a car passed its final waypoint.
    CarArrived {
        /// Identifier of the car.
        car: CarId,
    },
    /// Reports that an intersection claimed the pointer drag.
    DragStarted {
        /// Identifier of the dragged intersection.
        intersection: IntersectionId,
    },
    /// Reports that a dropped intersection snapped onto a grid cell.
    IntersectionSnapped {
        /// Identifier of the intersection.
        intersection: IntersectionId,
        /// Cell the intersection now occupies.
        cell: CellCoord,
    },
    /// Reports that a dropped intersection landed outside the grid.
    SnapRejected {
        /// Identifier of the intersection.
        intersection: IntersectionId,
        /// Position the intersection was left at.
        position: Vec2,
    },
}
