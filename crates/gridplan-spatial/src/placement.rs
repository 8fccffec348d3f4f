//! Placement rules for devices and pipeline elements.
//!
//! All checks are total: any combination of occupancy and position yields an
//! answer, including positions far outside the grid.

use gridplan_core::catalog::DeviceKind;
use gridplan_core::geometry::{GridPosition, GridSize};
use gridplan_core::id::{DeviceId, ElementId};

use crate::occupancy::Occupancy;

/// Why a placement was refused. Checks run in declaration order, so the
/// variant names the first rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("placement at {},{} leaves the grid", .0.col, .0.row)]
    OutOfBounds(GridPosition),
    #[error("cell {},{} is covered by another device", .0.col, .0.row)]
    OverlapsDevice(GridPosition),
    #[error("cell {},{} holds a pipeline cell", .0.col, .0.row)]
    OverlapsPipeline(GridPosition),
    #[error("cell {},{} holds a pipeline element", .0.col, .0.row)]
    OverlapsElement(GridPosition),
}

/// Check that `kind` anchored at `anchor` fits the grid and touches nothing
/// but `exclude` (the device being moved).
pub fn check_device_placement(
    occ: &(impl Occupancy + ?Sized),
    grid: GridSize,
    kind: DeviceKind,
    anchor: GridPosition,
    exclude: Option<&DeviceId>,
) -> Result<(), PlacementError> {
    let footprint = kind.footprint();
    if !grid.contains_footprint(anchor, footprint) {
        return Err(PlacementError::OutOfBounds(anchor));
    }
    for pos in footprint.tiles(anchor) {
        if occ.is_cell_occupied_by_device(pos, exclude) {
            return Err(PlacementError::OverlapsDevice(pos));
        }
        if occ.has_pipeline_cell(pos) {
            return Err(PlacementError::OverlapsPipeline(pos));
        }
        if occ.element_at(pos, None).is_some() {
            return Err(PlacementError::OverlapsElement(pos));
        }
    }
    Ok(())
}

/// Check that a pipeline element fits on `pos`. `exclude` is the element
/// being moved.
pub fn check_element_placement(
    occ: &(impl Occupancy + ?Sized),
    grid: GridSize,
    pos: GridPosition,
    exclude: Option<&ElementId>,
) -> Result<(), PlacementError> {
    if !grid.contains(pos) {
        return Err(PlacementError::OutOfBounds(pos));
    }
    if occ.is_cell_occupied_by_device(pos, None) {
        return Err(PlacementError::OverlapsDevice(pos));
    }
    if occ.has_pipeline_cell(pos) {
        return Err(PlacementError::OverlapsPipeline(pos));
    }
    if occ.element_at(pos, exclude).is_some() {
        return Err(PlacementError::OverlapsElement(pos));
    }
    Ok(())
}

pub fn can_place_device(
    occ: &(impl Occupancy + ?Sized),
    grid: GridSize,
    kind: DeviceKind,
    anchor: GridPosition,
    exclude: Option<&DeviceId>,
) -> bool {
    check_device_placement(occ, grid, kind, anchor, exclude).is_ok()
}

pub fn can_place_pipeline_element(
    occ: &(impl Occupancy + ?Sized),
    grid: GridSize,
    pos: GridPosition,
    exclude: Option<&ElementId>,
) -> bool {
    check_element_placement(occ, grid, pos, exclude).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::OccupancyIndex;
    use gridplan_core::catalog::ElementKind;
    use gridplan_core::test_utils::*;

    #[test]
    fn overlapping_devices_are_refused() {
        let mut store = empty_store(20);
        put_device(&mut store, DeviceKind::Refinery, 0, 0);
        let grid = store.grid();

        assert_eq!(
            check_device_placement(&store, grid, DeviceKind::Crusher, pos(1, 1), None),
            Err(PlacementError::OverlapsDevice(pos(1, 1)))
        );
        assert!(can_place_device(&store, grid, DeviceKind::Crusher, pos(3, 0), None));
    }

    #[test]
    fn footprint_must_stay_inside_grid() {
        let store = empty_store(10);
        let grid = store.grid();
        assert!(can_place_device(&store, grid, DeviceKind::Reactor, pos(4, 4), None));
        assert_eq!(
            check_device_placement(&store, grid, DeviceKind::Reactor, pos(5, 4), None),
            Err(PlacementError::OutOfBounds(pos(5, 4)))
        );
        assert!(!can_place_device(&store, grid, DeviceKind::HeatPool, pos(-1, 0), None));
        assert!(!can_place_device(&store, grid, DeviceKind::HeatPool, pos(i32::MAX, 0), None));
    }

    #[test]
    fn device_may_stay_on_its_own_cells() {
        let mut store = empty_store(20);
        let id = put_device(&mut store, DeviceKind::Grinder, 2, 2);
        let grid = store.grid();
        assert!(!can_place_device(&store, grid, DeviceKind::Grinder, pos(2, 2), None));
        assert!(can_place_device(&store, grid, DeviceKind::Grinder, pos(2, 2), Some(&id)));
        assert!(can_place_device(&store, grid, DeviceKind::Grinder, pos(3, 3), Some(&id)));
    }

    #[test]
    fn devices_never_cover_pipeline_or_elements() {
        let mut store = empty_store(20);
        put_segment(&mut store, &row_run(0, 5, 3));
        put_element(&mut store, ElementKind::CrossBridge, 10, 10);
        let grid = store.grid();

        assert_eq!(
            check_device_placement(&store, grid, DeviceKind::PowerStation, pos(1, 4), None),
            Err(PlacementError::OverlapsPipeline(pos(1, 5)))
        );
        assert_eq!(
            check_device_placement(&store, grid, DeviceKind::PowerStation, pos(9, 9), None),
            Err(PlacementError::OverlapsElement(pos(10, 10)))
        );
    }

    #[test]
    fn element_rules() {
        let mut store = empty_store(20);
        put_device(&mut store, DeviceKind::HeatPool, 0, 0);
        put_segment(&mut store, &row_run(4, 4, 2));
        let other = put_element(&mut store, ElementKind::Splitter, 8, 8);
        let index = OccupancyIndex::from_store(&store);
        let grid = store.grid();

        assert_eq!(
            check_element_placement(&index, grid, pos(1, 1), None),
            Err(PlacementError::OverlapsDevice(pos(1, 1)))
        );
        assert_eq!(
            check_element_placement(&index, grid, pos(5, 4), None),
            Err(PlacementError::OverlapsPipeline(pos(5, 4)))
        );
        assert_eq!(
            check_element_placement(&index, grid, pos(8, 8), None),
            Err(PlacementError::OverlapsElement(pos(8, 8)))
        );
        assert!(can_place_pipeline_element(&index, grid, pos(8, 8), Some(&other)));
        assert!(!can_place_pipeline_element(&index, grid, pos(20, 0), None));
        assert!(can_place_pipeline_element(&index, grid, pos(19, 19), None));
    }

    #[test]
    fn error_messages_name_the_cell() {
        let err = PlacementError::OverlapsDevice(pos(3, 4));
        assert_eq!(err.to_string(), "cell 3,4 is covered by another device");
    }
}
