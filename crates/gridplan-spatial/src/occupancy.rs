//! Cell occupancy queries.
//!
//! [`Occupancy`] answers "what is on this cell" for the placement validator
//! and the draw state machine. Two implementations exist: a linear scan over
//! an [`EntityStore`] and the derived [`OccupancyIndex`], which maps each
//! occupied cell to its occupants and is kept current by
//! [`crate::layout::Layout`].

use std::collections::{BTreeMap, BTreeSet};

use gridplan_core::catalog::ElementKind;
use gridplan_core::entity::{Device, PipelineCell, PipelineElement};
use gridplan_core::geometry::GridPosition;
use gridplan_core::id::{DeviceId, ElementId, PipelineCellId, SegmentId};
use gridplan_core::store::EntityStore;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only per-cell queries over a layout.
pub trait Occupancy {
    /// Some device covering `pos`.
    fn device_at(&self, pos: GridPosition) -> Option<&DeviceId>;

    /// Whether a device other than `exclude` covers `pos`.
    fn is_cell_occupied_by_device(&self, pos: GridPosition, exclude: Option<&DeviceId>) -> bool;

    fn has_pipeline_cell(&self, pos: GridPosition) -> bool;

    /// The cell of `segment` at `pos`, if that segment passes through it.
    fn segment_cell_at(&self, pos: GridPosition, segment: &SegmentId) -> Option<&PipelineCellId>;

    /// Whether `pos` holds a pipeline cell of any segment other than `segment`.
    fn has_foreign_segment_cell(&self, pos: GridPosition, segment: &SegmentId) -> bool;

    /// Some element at `pos` other than `exclude`.
    fn element_at(
        &self,
        pos: GridPosition,
        exclude: Option<&ElementId>,
    ) -> Option<(&ElementId, ElementKind)>;

    fn has_cross_bridge(&self, pos: GridPosition) -> bool;

    fn is_cell_pipeline_or_element(&self, pos: GridPosition) -> bool {
        self.has_pipeline_cell(pos) || self.element_at(pos, None).is_some()
    }

    /// Whether `pos` holds a splitter or merger, which belts cannot enter.
    fn has_blocking_element(&self, pos: GridPosition) -> bool {
        self.element_at(pos, None)
            .is_some_and(|(_, kind)| !kind.shares_with_pipeline())
    }
}

// ---------------------------------------------------------------------------
// Linear scan over the store
// ---------------------------------------------------------------------------

impl Occupancy for EntityStore {
    fn device_at(&self, pos: GridPosition) -> Option<&DeviceId> {
        self.devices().iter().find(|d| d.covers(pos)).map(|d| &d.id)
    }

    fn is_cell_occupied_by_device(&self, pos: GridPosition, exclude: Option<&DeviceId>) -> bool {
        self.devices()
            .iter()
            .any(|d| Some(&d.id) != exclude && d.covers(pos))
    }

    fn has_pipeline_cell(&self, pos: GridPosition) -> bool {
        self.pipeline_cells().iter().any(|c| c.position() == pos)
    }

    fn segment_cell_at(&self, pos: GridPosition, segment: &SegmentId) -> Option<&PipelineCellId> {
        EntityStore::segment_cell_at(self, segment, pos).map(|c| &c.id)
    }

    fn has_foreign_segment_cell(&self, pos: GridPosition, segment: &SegmentId) -> bool {
        self.pipeline_cells()
            .iter()
            .any(|c| c.position() == pos && &c.segment_id != segment)
    }

    fn element_at(
        &self,
        pos: GridPosition,
        exclude: Option<&ElementId>,
    ) -> Option<(&ElementId, ElementKind)> {
        self.pipeline_elements()
            .iter()
            .find(|e| Some(&e.id) != exclude && e.position() == pos)
            .map(|e| (&e.id, e.kind))
    }

    fn has_cross_bridge(&self, pos: GridPosition) -> bool {
        self.pipeline_elements()
            .iter()
            .any(|e| e.kind == ElementKind::CrossBridge && e.position() == pos)
    }
}

// ---------------------------------------------------------------------------
// OccupancyIndex
// ---------------------------------------------------------------------------

/// Everything sitting on one cell.
///
/// A consistent layout has at most one device or element per cell, but a
/// loaded scene may not be consistent, so every slot is a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileOccupants {
    pub devices: BTreeSet<DeviceId>,
    pub cells: BTreeMap<PipelineCellId, SegmentId>,
    pub elements: BTreeMap<ElementId, ElementKind>,
}

impl TileOccupants {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.cells.is_empty() && self.elements.is_empty()
    }
}

/// Cell-keyed occupancy derived from an [`EntityStore`].
///
/// Only non-empty tiles are stored, so two indexes describing the same
/// entities compare equal regardless of the order they were built in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyIndex {
    tiles: BTreeMap<GridPosition, TileOccupants>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from scratch.
    pub fn from_store(store: &EntityStore) -> Self {
        let mut index = Self::new();
        for device in store.devices() {
            index.insert_device(device);
        }
        for cell in store.pipeline_cells() {
            index.insert_pipeline_cell(cell);
        }
        for element in store.pipeline_elements() {
            index.insert_pipeline_element(element);
        }
        index
    }

    pub fn tile(&self, pos: GridPosition) -> Option<&TileOccupants> {
        self.tiles.get(&pos)
    }

    /// Occupied tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (GridPosition, &TileOccupants)> {
        self.tiles.iter().map(|(&pos, tile)| (pos, tile))
    }

    /// Number of cells with at least one occupant.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    // -- Incremental maintenance --

    pub fn insert_device(&mut self, device: &Device) {
        for pos in device.occupied_cells() {
            self.tiles
                .entry(pos)
                .or_default()
                .devices
                .insert(device.id.clone());
        }
    }

    pub fn remove_device(&mut self, device: &Device) {
        for pos in device.occupied_cells() {
            self.update_tile(pos, |t| {
                t.devices.remove(&device.id);
            });
        }
    }

    pub fn insert_pipeline_cell(&mut self, cell: &PipelineCell) {
        self.tiles
            .entry(cell.position())
            .or_default()
            .cells
            .insert(cell.id.clone(), cell.segment_id.clone());
    }

    pub fn remove_pipeline_cell(&mut self, cell: &PipelineCell) {
        self.update_tile(cell.position(), |t| {
            t.cells.remove(&cell.id);
        });
    }

    pub fn insert_pipeline_element(&mut self, element: &PipelineElement) {
        self.tiles
            .entry(element.position())
            .or_default()
            .elements
            .insert(element.id.clone(), element.kind);
    }

    pub fn remove_pipeline_element(&mut self, element: &PipelineElement) {
        self.update_tile(element.position(), |t| {
            t.elements.remove(&element.id);
        });
    }

    fn update_tile(&mut self, pos: GridPosition, f: impl FnOnce(&mut TileOccupants)) {
        if let Some(tile) = self.tiles.get_mut(&pos) {
            f(tile);
            if tile.is_empty() {
                self.tiles.remove(&pos);
            }
        }
    }
}

impl Occupancy for OccupancyIndex {
    fn device_at(&self, pos: GridPosition) -> Option<&DeviceId> {
        self.tiles.get(&pos)?.devices.first()
    }

    fn is_cell_occupied_by_device(&self, pos: GridPosition, exclude: Option<&DeviceId>) -> bool {
        self.tiles
            .get(&pos)
            .is_some_and(|t| t.devices.iter().any(|id| Some(id) != exclude))
    }

    fn has_pipeline_cell(&self, pos: GridPosition) -> bool {
        self.tiles.get(&pos).is_some_and(|t| !t.cells.is_empty())
    }

    fn segment_cell_at(&self, pos: GridPosition, segment: &SegmentId) -> Option<&PipelineCellId> {
        self.tiles
            .get(&pos)?
            .cells
            .iter()
            .find(|(_, seg)| *seg == segment)
            .map(|(id, _)| id)
    }

    fn has_foreign_segment_cell(&self, pos: GridPosition, segment: &SegmentId) -> bool {
        self.tiles
            .get(&pos)
            .is_some_and(|t| t.cells.values().any(|seg| seg != segment))
    }

    fn element_at(
        &self,
        pos: GridPosition,
        exclude: Option<&ElementId>,
    ) -> Option<(&ElementId, ElementKind)> {
        self.tiles
            .get(&pos)?
            .elements
            .iter()
            .find(|(id, _)| Some(*id) != exclude)
            .map(|(id, kind)| (id, *kind))
    }

    fn has_cross_bridge(&self, pos: GridPosition) -> bool {
        self.tiles
            .get(&pos)
            .is_some_and(|t| t.elements.values().any(|k| *k == ElementKind::CrossBridge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridplan_core::catalog::DeviceKind;
    use gridplan_core::test_utils::*;

    fn sample_store() -> EntityStore {
        let mut store = empty_store(20);
        put_device(&mut store, DeviceKind::Refinery, 0, 0);
        put_segment(&mut store, &row_run(5, 5, 4));
        put_segment(&mut store, &col_run(6, 3, 5));
        put_element(&mut store, ElementKind::CrossBridge, 6, 5);
        put_element(&mut store, ElementKind::Splitter, 10, 10);
        store
    }

    /// Both implementations must agree on every cell of the grid.
    fn assert_agree(store: &EntityStore, index: &OccupancyIndex) {
        let seg = gridplan_core::id::SegmentId::new("seg-none");
        for row in -1..21 {
            for col in -1..21 {
                let p = pos(col, row);
                assert_eq!(store.device_at(p), index.device_at(p), "{p:?}");
                assert_eq!(
                    store.is_cell_occupied_by_device(p, None),
                    index.is_cell_occupied_by_device(p, None)
                );
                assert_eq!(store.has_pipeline_cell(p), index.has_pipeline_cell(p));
                assert_eq!(store.element_at(p, None), index.element_at(p, None));
                assert_eq!(store.has_cross_bridge(p), index.has_cross_bridge(p));
                assert_eq!(
                    store.has_foreign_segment_cell(p, &seg),
                    index.has_foreign_segment_cell(p, &seg)
                );
                assert_eq!(
                    store.is_cell_pipeline_or_element(p),
                    index.is_cell_pipeline_or_element(p)
                );
            }
        }
    }

    #[test]
    fn scan_and_index_agree() {
        let store = sample_store();
        let index = OccupancyIndex::from_store(&store);
        assert_agree(&store, &index);
    }

    #[test]
    fn device_exclusion() {
        let mut store = empty_store(20);
        let id = put_device(&mut store, DeviceKind::Crusher, 2, 2);
        let index = OccupancyIndex::from_store(&store);
        for occ in [&store as &dyn Occupancy, &index as &dyn Occupancy] {
            assert!(occ.is_cell_occupied_by_device(pos(3, 3), None));
            assert!(!occ.is_cell_occupied_by_device(pos(3, 3), Some(&id)));
            assert!(!occ.is_cell_occupied_by_device(pos(5, 2), None));
            assert_eq!(occ.device_at(pos(4, 4)), Some(&id));
        }
    }

    #[test]
    fn crossing_cell_holds_both_segments() {
        let store = sample_store();
        let index = OccupancyIndex::from_store(&store);
        let tile = index.tile(pos(6, 5)).unwrap();
        assert_eq!(tile.cells.len(), 2);
        assert_eq!(tile.elements.len(), 1);
        assert!(index.has_cross_bridge(pos(6, 5)));
        assert!(!index.has_blocking_element(pos(6, 5)));
        assert!(index.has_blocking_element(pos(10, 10)));
    }

    #[test]
    fn segment_queries() {
        let mut store = empty_store(20);
        let (seg_a, ids_a) = put_segment(&mut store, &row_run(0, 0, 3));
        let (seg_b, _) = put_segment(&mut store, &col_run(1, 0, 3));
        let index = OccupancyIndex::from_store(&store);

        assert_eq!(index.segment_cell_at(pos(1, 0), &seg_a), Some(&ids_a[1]));
        assert!(index.segment_cell_at(pos(1, 2), &seg_a).is_none());
        assert!(index.has_foreign_segment_cell(pos(1, 0), &seg_a));
        assert!(!index.has_foreign_segment_cell(pos(2, 0), &seg_a));
        assert!(!index.has_foreign_segment_cell(pos(1, 2), &seg_b));
        assert_eq!(
            Occupancy::segment_cell_at(&store, pos(1, 0), &seg_a),
            Some(&ids_a[1])
        );
    }

    #[test]
    fn removal_prunes_empty_tiles() {
        let mut store = empty_store(20);
        let id = put_device(&mut store, DeviceKind::PowerStation, 0, 0);
        let mut index = OccupancyIndex::from_store(&store);
        assert_eq!(index.tile_count(), 4);

        let device = store.remove_device(&id).unwrap();
        index.remove_device(&device);
        assert_eq!(index.tile_count(), 0);
        assert_eq!(index, OccupancyIndex::from_store(&store));
    }

    #[test]
    fn element_exclusion() {
        let mut store = empty_store(20);
        let id = put_element(&mut store, ElementKind::Merger, 4, 4);
        let index = OccupancyIndex::from_store(&store);
        assert_eq!(index.element_at(pos(4, 4), None), Some((&id, ElementKind::Merger)));
        assert!(index.element_at(pos(4, 4), Some(&id)).is_none());
        assert!(index.is_cell_pipeline_or_element(pos(4, 4)));
    }
}
