#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drag and snap handling for intersections placed onto the city grid.

use city_limits_core::{CellCoord, GridGeometry};
use glam::Vec2;

/// Width and height of the pointer hit box centred on a slot.
pub const DEFAULT_EXTENT: Vec2 = Vec2::new(40.0, 40.0);

/// Interaction state of a placement slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Resting at a free-form position.
    Idle,
    /// Following the pointer.
    Dragging,
    /// Resting at the centre of the contained cell.
    Snapped(CellCoord),
}

/// Draggable point that can be snapped onto grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSlot {
    position: Vec2,
    extent: Vec2,
    state: SlotState,
}

impl PlacementSlot {
    /// Creates an idle slot at `position` using the default hit box.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self::with_extent(position, DEFAULT_EXTENT)
    }

    /// Creates an idle slot at `position` with a custom hit box size.
    #[must_use]
    pub const fn with_extent(position: Vec2, extent: Vec2) -> Self {
        Self {
            position,
            extent,
            state: SlotState::Idle,
        }
    }

    /// Reports whether `point` falls inside the hit box centred on the slot.
    ///
    /// The left and top edges are inclusive, the right and bottom edges exclusive.
    #[must_use]
    pub fn hit_test(&self, point: Vec2) -> bool {
        let min = self.position - self.extent / 2.0;
        let max = min + self.extent;
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }

    /// Starts following the pointer, forgetting any previous snap.
    pub fn begin_drag(&mut self) {
        self.state = SlotState::Dragging;
    }

    /// Moves the slot to `point` while a drag is in progress.
    pub fn update_drag(&mut self, point: Vec2) {
        if self.is_dragging() {
            self.position = point;
        }
    }

    /// Stops following the pointer, leaving the slot where it was dropped.
    pub fn end_drag(&mut self) {
        if self.is_dragging() {
            self.state = SlotState::Idle;
        }
    }

    /// Moves the slot to the centre of the cell under its position.
    ///
    /// Returns `false` when the position lies outside the grid. The slot then
    /// keeps its current position, forgets any previous snap and stays in a
    /// drag that is still in progress.
    pub fn snap_to_grid(&mut self, geometry: &GridGeometry) -> bool {
        match geometry.cell_at(self.position) {
            Some(cell) => {
                self.position = geometry.cell_center(cell).as_vec2();
                self.state = SlotState::Snapped(cell);
                true
            }
            None => {
                self.clear_snap();
                false
            }
        }
    }

    /// Forgets the snapped cell without moving the slot.
    pub fn clear_snap(&mut self) {
        if self.is_snapped() {
            self.state = SlotState::Idle;
        }
    }

    /// Current pixel position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Interaction state of the slot.
    #[must_use]
    pub const fn state(&self) -> SlotState {
        self.state
    }

    /// Reports whether the slot is following the pointer.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, SlotState::Dragging)
    }

    /// Reports whether the slot rests on a grid cell.
    #[must_use]
    pub const fn is_snapped(&self) -> bool {
        matches!(self.state, SlotState::Snapped(_))
    }

    /// Cell the slot is snapped to, if any.
    #[must_use]
    pub const fn snapped_cell(&self) -> Option<CellCoord> {
        match self.state {
            SlotState::Snapped(cell) => Some(cell),
            SlotState::Idle | SlotState::Dragging => None,
        }
    }
}
