//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Available in this crate's own tests and, through the `test-utils`
//! feature, to downstream crates.

use crate::catalog::{DeviceKind, ElementKind};
use crate::entity::{NewDevice, NewPipelineCell, NewPipelineElement};
use crate::geometry::{Direction, GridPosition, GridSize};
use crate::id::{DeviceId, ElementId, PipelineCellId, SegmentId};
use crate::store::EntityStore;

pub fn pos(col: i32, row: i32) -> GridPosition {
    GridPosition::new(col, row)
}

/// An empty store on a square grid.
pub fn empty_store(size: u32) -> EntityStore {
    EntityStore::new(GridSize::new(size, size))
}

pub fn put_device(store: &mut EntityStore, kind: DeviceKind, col: i32, row: i32) -> DeviceId {
    store.add_device(NewDevice::new(kind, pos(col, row)))
}

pub fn put_element(store: &mut EntityStore, kind: ElementKind, col: i32, row: i32) -> ElementId {
    store.add_pipeline_element(NewPipelineElement::new(kind, pos(col, row)))
}

/// Lay a straight segment through `cells`, directing each cell at its
/// successor. The last cell repeats the previous direction.
pub fn put_segment(
    store: &mut EntityStore,
    cells: &[GridPosition],
) -> (SegmentId, Vec<PipelineCellId>) {
    let segment = store.allocate_segment_id();
    let mut ids = Vec::with_capacity(cells.len());
    let mut direction = Direction::Right;
    for (i, &at) in cells.iter().enumerate() {
        if let Some(&next) = cells.get(i + 1) {
            direction = Direction::between(at, next);
        }
        ids.push(store.add_pipeline_cell(NewPipelineCell {
            position: at,
            direction,
            segment_id: segment.clone(),
        }));
    }
    (segment, ids)
}

/// Cells of a horizontal run from `(col, row)` of `len` cells.
pub fn row_run(col: i32, row: i32, len: i32) -> Vec<GridPosition> {
    (0..len).map(|dc| pos(col + dc, row)).collect()
}

/// Cells of a vertical run from `(col, row)` of `len` cells.
pub fn col_run(col: i32, row: i32, len: i32) -> Vec<GridPosition> {
    (0..len).map(|dr| pos(col, row + dr)).collect()
}
