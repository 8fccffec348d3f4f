//! A store paired with its occupancy index.
//!
//! [`Layout`] exposes the store's mutation API and mirrors every change into
//! the [`OccupancyIndex`], so occupancy queries never scan. The `try_*`
//! operations run the placement rules first and leave the layout untouched
//! when they refuse.

use log::{debug, warn};

use gridplan_core::catalog::DeviceKind;
use gridplan_core::entity::{
    Device, DevicePatch, NewDevice, NewPipelineCell, NewPipelineElement, PipelineCell,
    PipelineCellPatch, PipelineElement, PipelineElementPatch,
};
use gridplan_core::geometry::{GridPosition, GridSize, Rotation};
use gridplan_core::id::{DeviceId, ElementId, PipelineCellId, SegmentId};
use gridplan_core::scene::SceneSnapshot;
use gridplan_core::store::{EntityStore, LoadReport};

use crate::audit::{LayoutViolation, audit};
use crate::occupancy::OccupancyIndex;
use crate::placement::{PlacementError, check_device_placement, check_element_placement};

/// Result of [`Layout::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub report: LoadReport,
    pub violations: Vec<LayoutViolation>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    store: EntityStore,
    index: OccupancyIndex,
}

impl Layout {
    pub fn new(grid: GridSize) -> Self {
        Self::from_store(EntityStore::new(grid))
    }

    pub fn from_store(store: EntityStore) -> Self {
        let index = OccupancyIndex::from_store(&store);
        Self { store, index }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn index(&self) -> &OccupancyIndex {
        &self.index
    }

    pub fn grid(&self) -> GridSize {
        self.store.grid()
    }

    pub fn set_grid_size(&mut self, grid: GridSize) {
        debug!("grid resized to {}x{}", grid.cols, grid.rows);
        self.store.set_grid_size(grid);
    }

    /// Whether the incremental index matches a fresh rebuild.
    pub fn is_index_current(&self) -> bool {
        self.index == OccupancyIndex::from_store(&self.store)
    }

    // -- Checks --

    pub fn check_device(
        &self,
        kind: DeviceKind,
        anchor: GridPosition,
        exclude: Option<&DeviceId>,
    ) -> Result<(), PlacementError> {
        check_device_placement(&self.index, self.grid(), kind, anchor, exclude)
    }

    pub fn check_element(
        &self,
        pos: GridPosition,
        exclude: Option<&ElementId>,
    ) -> Result<(), PlacementError> {
        check_element_placement(&self.index, self.grid(), pos, exclude)
    }

    // -- Checked mutations --

    pub fn try_add_device(&mut self, new: NewDevice) -> Result<DeviceId, PlacementError> {
        self.check_device(new.kind, new.position, None)?;
        Ok(self.add_device(new))
    }

    /// Move a device if its footprint fits at `to`. Returns `Ok(None)` when
    /// the id is unknown. Staying on the current anchor always succeeds.
    pub fn try_move_device(
        &mut self,
        id: &DeviceId,
        to: GridPosition,
    ) -> Result<Option<Device>, PlacementError> {
        let Some(device) = self.store.device(id) else {
            return Ok(None);
        };
        if device.anchor() == to {
            return Ok(Some(device.clone()));
        }
        self.check_device(device.kind, to, Some(id))?;
        Ok(self.move_device(id, to))
    }

    pub fn try_add_pipeline_element(
        &mut self,
        new: NewPipelineElement,
    ) -> Result<ElementId, PlacementError> {
        self.check_element(new.position, None)?;
        Ok(self.add_pipeline_element(new))
    }

    pub fn try_move_pipeline_element(
        &mut self,
        id: &ElementId,
        to: GridPosition,
    ) -> Result<Option<PipelineElement>, PlacementError> {
        let Some(element) = self.store.pipeline_element(id) else {
            return Ok(None);
        };
        if element.position() == to {
            return Ok(Some(element.clone()));
        }
        self.check_element(to, Some(id))?;
        Ok(self.move_pipeline_element(id, to))
    }

    // -- Devices --

    pub fn add_device(&mut self, new: NewDevice) -> DeviceId {
        let id = self.store.add_device(new);
        if let Some(device) = self.store.device(&id) {
            self.index.insert_device(device);
        }
        debug!(
            "placed {} {:?} at {},{}",
            id, new.kind, new.position.col, new.position.row
        );
        id
    }

    pub fn update_device(&mut self, id: &DeviceId, patch: DevicePatch) -> Option<Device> {
        let before = self.store.update_device(id, patch)?;
        if patch.touches_footprint() {
            self.reindex_device(&before);
        }
        Some(before)
    }

    pub fn remove_device(&mut self, id: &DeviceId) -> Option<Device> {
        let removed = self.store.remove_device(id)?;
        self.index.remove_device(&removed);
        debug!("removed {id}");
        Some(removed)
    }

    pub fn move_device(&mut self, id: &DeviceId, to: GridPosition) -> Option<Device> {
        let before = self.store.move_device(id, to)?;
        self.reindex_device(&before);
        debug!("moved {id} to {},{}", to.col, to.row);
        Some(before)
    }

    /// Rotation is cosmetic, so the index is unaffected.
    pub fn rotate_device(&mut self, id: &DeviceId) -> Option<Rotation> {
        let rotation = self.store.rotate_device(id)?;
        debug!("rotated {id} to {}", rotation.degrees());
        Some(rotation)
    }

    fn reindex_device(&mut self, before: &Device) {
        self.index.remove_device(before);
        if let Some(after) = self.store.device(&before.id) {
            self.index.insert_device(after);
        }
    }

    // -- Pipeline cells --

    pub fn allocate_segment_id(&mut self) -> SegmentId {
        self.store.allocate_segment_id()
    }

    pub fn add_pipeline_cell(&mut self, new: NewPipelineCell) -> PipelineCellId {
        let id = self.store.add_pipeline_cell(new);
        if let Some(cell) = self.store.pipeline_cell(&id) {
            self.index.insert_pipeline_cell(cell);
        }
        id
    }

    pub fn update_pipeline_cell(
        &mut self,
        id: &PipelineCellId,
        patch: &PipelineCellPatch,
    ) -> Option<PipelineCell> {
        let before = self.store.update_pipeline_cell(id, patch)?;
        self.index.remove_pipeline_cell(&before);
        if let Some(after) = self.store.pipeline_cell(id) {
            self.index.insert_pipeline_cell(after);
        }
        Some(before)
    }

    pub fn remove_pipeline_cell(&mut self, id: &PipelineCellId) -> Option<PipelineCell> {
        let removed = self.store.remove_pipeline_cell(id)?;
        self.index.remove_pipeline_cell(&removed);
        Some(removed)
    }

    pub fn remove_segment(&mut self, segment: &SegmentId) -> Vec<PipelineCell> {
        let removed = self.store.remove_segment(segment);
        for cell in &removed {
            self.index.remove_pipeline_cell(cell);
        }
        debug!("removed {segment} ({} cells)", removed.len());
        removed
    }

    // -- Pipeline elements --

    pub fn add_pipeline_element(&mut self, new: NewPipelineElement) -> ElementId {
        let id = self.store.add_pipeline_element(new);
        if let Some(element) = self.store.pipeline_element(&id) {
            self.index.insert_pipeline_element(element);
        }
        debug!(
            "placed {} {:?} at {},{}",
            id, new.kind, new.position.col, new.position.row
        );
        id
    }

    pub fn update_pipeline_element(
        &mut self,
        id: &ElementId,
        patch: PipelineElementPatch,
    ) -> Option<PipelineElement> {
        let before = self.store.update_pipeline_element(id, patch)?;
        self.reindex_element(&before);
        Some(before)
    }

    pub fn remove_pipeline_element(&mut self, id: &ElementId) -> Option<PipelineElement> {
        let removed = self.store.remove_pipeline_element(id)?;
        self.index.remove_pipeline_element(&removed);
        debug!("removed {id}");
        Some(removed)
    }

    pub fn move_pipeline_element(
        &mut self,
        id: &ElementId,
        to: GridPosition,
    ) -> Option<PipelineElement> {
        let before = self.store.move_pipeline_element(id, to)?;
        self.reindex_element(&before);
        debug!("moved {id} to {},{}", to.col, to.row);
        Some(before)
    }

    pub fn rotate_pipeline_element(&mut self, id: &ElementId) -> Option<Rotation> {
        let rotation = self.store.rotate_pipeline_element(id)?;
        debug!("rotated {id} to {}", rotation.degrees());
        Some(rotation)
    }

    fn reindex_element(&mut self, before: &PipelineElement) {
        self.index.remove_pipeline_element(before);
        if let Some(after) = self.store.pipeline_element(&before.id) {
            self.index.insert_pipeline_element(after);
        }
    }

    // -- Whole-scene operations --

    pub fn snapshot(&self) -> SceneSnapshot {
        self.store.snapshot()
    }

    /// Replace the whole layout, rebuild the index and audit the result.
    pub fn load(&mut self, snapshot: SceneSnapshot) -> LoadSummary {
        let report = self.store.load(snapshot);
        self.index = OccupancyIndex::from_store(&self.store);
        let violations = audit(&self.store);

        debug!(
            "loaded {} devices, {} pipeline cells, {} pipeline elements",
            report.devices, report.pipeline_cells, report.pipeline_elements
        );
        if report.regenerated_ids > 0 {
            warn!("assigned fresh ids to {} entities", report.regenerated_ids);
        }
        for violation in &violations {
            warn!("loaded scene is inconsistent: {violation}");
        }
        LoadSummary { report, violations }
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.index.clear();
    }
}
