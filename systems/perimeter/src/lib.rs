#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Perimeter slot enumeration for the city grid.
//!
//! Slots are numbered clockwise starting at the left-most top slot: the top
//! edge left to right, the right edge top to bottom, the bottom edge right to
//! left and finally the left edge bottom to top. Every slot maps to exactly one
//! linear index and one pixel coordinate.

use city_limits_core::{CellCoord, GridGeometry, PerimeterSide, PerimeterSlot};
use glam::IVec2;

/// Clockwise ordering of the slots around a grid of fixed dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerimeterLayout {
    rows: u32,
    columns: u32,
}

impl PerimeterLayout {
    /// Creates the layout for a grid with the provided dimensions.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Creates the layout matching the provided geometry.
    #[must_use]
    pub const fn for_geometry(geometry: &GridGeometry) -> Self {
        Self::new(geometry.rows(), geometry.columns())
    }

    /// Number of slots around the grid.
    #[must_use]
    pub const fn len(&self) -> u32 {
        2 * (self.rows + self.columns)
    }

    /// Reports whether the layout has no slots.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every slot in clockwise order.
    pub fn slots(&self) -> impl Iterator<Item = PerimeterSlot> + '_ {
        (0..self.len()).filter_map(move |index| self.slot_at(index))
    }

    /// Resolves the slot occupying the provided linear index.
    #[must_use]
    pub fn slot_at(&self, index: u32) -> Option<PerimeterSlot> {
        let (rows, columns) = (self.rows, self.columns);
        let slot = if index < columns {
            PerimeterSlot::new(PerimeterSide::Top, index)
        } else if index < columns + rows {
            PerimeterSlot::new(PerimeterSide::Right, index - columns)
        } else if index < 2 * columns + rows {
            let offset = index - columns - rows;
            PerimeterSlot::new(PerimeterSide::Bottom, columns - 1 - offset)
        } else if index < self.len() {
            let offset = index - 2 * columns - rows;
            PerimeterSlot::new(PerimeterSide::Left, rows - 1 - offset)
        } else {
            return None;
        };
        Some(slot)
    }

    /// Computes the linear index of the provided slot.
    #[must_use]
    pub fn index_of(&self, slot: PerimeterSlot) -> Option<u32> {
        let (rows, columns) = (self.rows, self.columns);
        let lane = slot.lane();
        match slot.side() {
            PerimeterSide::Top if lane < columns => Some(lane),
            PerimeterSide::Right if lane < rows => Some(columns + lane),
            PerimeterSide::Bottom if lane < columns => Some(columns + rows + (columns - 1 - lane)),
            PerimeterSide::Left if lane < rows => Some(2 * columns + rows + (rows - 1 - lane)),
            _ => None,
        }
    }
}

/// Enumerates the perimeter slots of a `rows` by `columns` grid in clockwise order.
#[must_use]
pub fn enumerate(rows: u32, columns: u32) -> Vec<PerimeterSlot> {
    PerimeterLayout::new(rows, columns).slots().collect()
}

/// Midpoint of the outward-facing edge of the cell bordered by the slot.
#[must_use]
pub fn pixel_of(slot: PerimeterSlot, geometry: &GridGeometry) -> IVec2 {
    let origin = geometry.origin();
    let size = geometry.cell_size() as i32;
    let along = slot.lane() as i32 * size + geometry.half_cell();
    match slot.side() {
        PerimeterSide::Top => IVec2::new(origin.x + along, origin.y),
        PerimeterSide::Right => IVec2::new(origin.x + geometry.width(), origin.y + along),
        PerimeterSide::Bottom => IVec2::new(origin.x + along, origin.y + geometry.height()),
        PerimeterSide::Left => IVec2::new(origin.x, origin.y + along),
    }
}

/// Grid cell whose outward-facing edge carries the slot.
#[must_use]
pub fn bordering_cell(slot: PerimeterSlot, geometry: &GridGeometry) -> CellCoord {
    let lane = slot.lane();
    match slot.side() {
        PerimeterSide::Top => CellCoord::new(lane, 0),
        PerimeterSide::Right => CellCoord::new(geometry.columns() - 1, lane),
        PerimeterSide::Bottom => CellCoord::new(lane, geometry.rows() - 1),
        PerimeterSide::Left => CellCoord::new(0, lane),
    }
}

/// Shortest distance between two perimeter indices walking either direction.
#[must_use]
pub fn circular_distance(first: u32, second: u32, total: u32) -> u32 {
    let direct = first.abs_diff(second);
    direct.min(total.saturating_sub(direct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_by_two_grid_orders_slots_clockwise() {
        let slots = enumerate(2, 3);
        let expected = vec![
            PerimeterSlot::new(PerimeterSide::Top, 0),
            PerimeterSlot::new(PerimeterSide::Top, 1),
            PerimeterSlot::new(PerimeterSide::Top, 2),
            PerimeterSlot::new(PerimeterSide::Right, 0),
            PerimeterSlot::new(PerimeterSide::Right, 1),
            PerimeterSlot::new(PerimeterSide::Bottom, 2),
            PerimeterSlot::new(PerimeterSide::Bottom, 1),
            PerimeterSlot::new(PerimeterSide::Bottom, 0),
            PerimeterSlot::new(PerimeterSide::Left, 1),
            PerimeterSlot::new(PerimeterSide::Left, 0),
        ];
        assert_eq!(slots, expected);
    }

    #[test]
    fn slot_at_rejects_indices_past_the_end() {
        let layout = PerimeterLayout::new(1, 1);
        assert_eq!(layout.len(), 4);
        assert!(layout.slot_at(3).is_some());
        assert_eq!(layout.slot_at(4), None);
    }

    #[test]
    fn index_of_rejects_lanes_outside_the_grid() {
        let layout = PerimeterLayout::new(2, 3);
        assert_eq!(layout.index_of(PerimeterSlot::new(PerimeterSide::Top, 3)), None);
        assert_eq!(layout.index_of(PerimeterSlot::new(PerimeterSide::Left, 2)), None);
    }

    #[test]
    fn circular_distance_wraps_around() {
        assert_eq!(circular_distance(0, 9, 10), 1);
        assert_eq!(circular_distance(2, 7, 10), 5);
        assert_eq!(circular_distance(4, 4, 10), 0);
    }
}
