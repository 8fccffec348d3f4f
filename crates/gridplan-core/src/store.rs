//! The authoritative collections of devices, pipeline cells and pipeline
//! elements.
//!
//! The store performs no placement validation: callers check the placement
//! predicates first and only then mutate. Every mutation addressed by id is a
//! no-op when the id is unknown, reported by a `None` return.

use crate::entity::{
    Device, DevicePatch, NewDevice, NewPipelineCell, NewPipelineElement, PipelineCell,
    PipelineCellPatch, PipelineElement, PipelineElementPatch,
};
use crate::geometry::{GridPosition, GridSize, Rotation};
use crate::id::{DeviceId, ElementId, PipelineCellId, SegmentId};
use crate::scene::{
    DeviceRecord, PipelineCellRecord, PipelineElementRecord, SCENE_VERSION, SceneSnapshot,
};

/// Outcome of [`EntityStore::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub devices: usize,
    pub pipeline_cells: usize,
    pub pipeline_elements: usize,
    /// Entities that arrived without an id and were given a fresh one.
    pub regenerated_ids: usize,
}

#[derive(Debug, Clone)]
pub struct EntityStore {
    grid: GridSize,
    devices: Vec<Device>,
    cells: Vec<PipelineCell>,
    elements: Vec<PipelineElement>,
    next_serial: u64,
}

/// Produce the next numbered id that nothing in the store is using yet.
fn fresh_id<T>(next_serial: &mut u64, make: impl Fn(u64) -> T, taken: impl Fn(&T) -> bool) -> T {
    loop {
        *next_serial += 1;
        let id = make(*next_serial);
        if !taken(&id) {
            return id;
        }
    }
}

impl EntityStore {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            devices: Vec::new(),
            cells: Vec::new(),
            elements: Vec::new(),
            next_serial: 0,
        }
    }

    // -- Grid --

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Resize the grid. Entities now outside it are left in place.
    pub fn set_grid_size(&mut self, grid: GridSize) {
        self.grid = grid;
    }

    // -- Read access --

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn pipeline_cells(&self) -> &[PipelineCell] {
        &self.cells
    }

    pub fn pipeline_elements(&self) -> &[PipelineElement] {
        &self.elements
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn pipeline_cell(&self, id: &PipelineCellId) -> Option<&PipelineCell> {
        self.cells.iter().find(|c| &c.id == id)
    }

    pub fn pipeline_element(&self, id: &ElementId) -> Option<&PipelineElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Cells belonging to one drawn segment, in drawing order.
    pub fn segment_cells<'a>(
        &'a self,
        segment: &'a SegmentId,
    ) -> impl Iterator<Item = &'a PipelineCell> + 'a {
        self.cells.iter().filter(move |c| &c.segment_id == segment)
    }

    /// The cell of `segment` at `pos`, if the segment passes through it.
    pub fn segment_cell_at(&self, segment: &SegmentId, pos: GridPosition) -> Option<&PipelineCell> {
        self.cells
            .iter()
            .find(|c| &c.segment_id == segment && c.position() == pos)
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.cells.is_empty() && self.elements.is_empty()
    }

    // -- Devices --

    pub fn add_device(&mut self, new: NewDevice) -> DeviceId {
        let id = fresh_id(&mut self.next_serial, DeviceId::numbered, |id| {
            self.devices.iter().any(|d| &d.id == id)
        });
        self.devices.push(Device {
            id: id.clone(),
            kind: new.kind,
            col: new.position.col,
            row: new.position.row,
            rotation: new.rotation,
        });
        id
    }

    /// Apply a partial update. Returns the device as it was before.
    pub fn update_device(&mut self, id: &DeviceId, patch: DevicePatch) -> Option<Device> {
        let device = self.devices.iter_mut().find(|d| &d.id == id)?;
        let before = device.clone();
        patch.apply(device);
        Some(before)
    }

    pub fn remove_device(&mut self, id: &DeviceId) -> Option<Device> {
        let idx = self.devices.iter().position(|d| &d.id == id)?;
        Some(self.devices.remove(idx))
    }

    /// Re-anchor a device. Returns the device as it was before.
    pub fn move_device(&mut self, id: &DeviceId, to: GridPosition) -> Option<Device> {
        self.update_device(
            id,
            DevicePatch {
                position: Some(to),
                ..DevicePatch::default()
            },
        )
    }

    /// Advance rotation by 90 degrees. Returns the new rotation.
    pub fn rotate_device(&mut self, id: &DeviceId) -> Option<Rotation> {
        let device = self.devices.iter_mut().find(|d| &d.id == id)?;
        device.rotation = device.rotation.rotate_cw();
        Some(device.rotation)
    }

    // -- Pipeline cells --

    /// Reserve an id for a new drawn segment.
    pub fn allocate_segment_id(&mut self) -> SegmentId {
        fresh_id(&mut self.next_serial, SegmentId::numbered, |id| {
            self.cells.iter().any(|c| &c.segment_id == id)
        })
    }

    pub fn add_pipeline_cell(&mut self, new: NewPipelineCell) -> PipelineCellId {
        let id = fresh_id(&mut self.next_serial, PipelineCellId::numbered, |id| {
            self.cells.iter().any(|c| &c.id == id)
        });
        self.cells.push(PipelineCell {
            id: id.clone(),
            col: new.position.col,
            row: new.position.row,
            direction: new.direction,
            segment_id: new.segment_id,
        });
        id
    }

    pub fn update_pipeline_cell(
        &mut self,
        id: &PipelineCellId,
        patch: &PipelineCellPatch,
    ) -> Option<PipelineCell> {
        let cell = self.cells.iter_mut().find(|c| &c.id == id)?;
        let before = cell.clone();
        patch.apply(cell);
        Some(before)
    }

    pub fn remove_pipeline_cell(&mut self, id: &PipelineCellId) -> Option<PipelineCell> {
        let idx = self.cells.iter().position(|c| &c.id == id)?;
        Some(self.cells.remove(idx))
    }

    /// Remove every cell of `segment`, returning them in drawing order.
    pub fn remove_segment(&mut self, segment: &SegmentId) -> Vec<PipelineCell> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.cells)
            .into_iter()
            .partition(|c| &c.segment_id == segment);
        self.cells = kept;
        removed
    }

    // -- Pipeline elements --

    pub fn add_pipeline_element(&mut self, new: NewPipelineElement) -> ElementId {
        let id = fresh_id(&mut self.next_serial, ElementId::numbered, |id| {
            self.elements.iter().any(|e| &e.id == id)
        });
        self.elements.push(PipelineElement {
            id: id.clone(),
            kind: new.kind,
            col: new.position.col,
            row: new.position.row,
            rotation: new.rotation,
        });
        id
    }

    pub fn update_pipeline_element(
        &mut self,
        id: &ElementId,
        patch: PipelineElementPatch,
    ) -> Option<PipelineElement> {
        let element = self.elements.iter_mut().find(|e| &e.id == id)?;
        let before = element.clone();
        patch.apply(element);
        Some(before)
    }

    pub fn remove_pipeline_element(&mut self, id: &ElementId) -> Option<PipelineElement> {
        let idx = self.elements.iter().position(|e| &e.id == id)?;
        Some(self.elements.remove(idx))
    }

    pub fn move_pipeline_element(
        &mut self,
        id: &ElementId,
        to: GridPosition,
    ) -> Option<PipelineElement> {
        self.update_pipeline_element(
            id,
            PipelineElementPatch {
                position: Some(to),
                ..PipelineElementPatch::default()
            },
        )
    }

    pub fn rotate_pipeline_element(&mut self, id: &ElementId) -> Option<Rotation> {
        let element = self.elements.iter_mut().find(|e| &e.id == id)?;
        element.rotation = element.rotation.rotate_cw();
        Some(element.rotation)
    }

    // -- Snapshots --

    /// Capture the full state in the persisted format.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            version: SCENE_VERSION,
            grid_cols: self.grid.cols,
            grid_rows: self.grid.rows,
            devices: self.devices.iter().map(DeviceRecord::from).collect(),
            pipeline_cells: self.cells.iter().map(PipelineCellRecord::from).collect(),
            pipeline_elements: self
                .elements
                .iter()
                .map(PipelineElementRecord::from)
                .collect(),
        }
    }

    /// Replace the grid size and all three collections wholesale.
    ///
    /// Records without an id (or with an empty one) get a fresh id that does
    /// not collide with any id in the loaded scene. Cross-entity invariants
    /// are not checked.
    pub fn load(&mut self, snapshot: SceneSnapshot) -> LoadReport {
        self.grid = GridSize::new(snapshot.grid_cols, snapshot.grid_rows);

        let mut missing_devices = Vec::new();
        self.devices = snapshot
            .devices
            .into_iter()
            .enumerate()
            .map(|(idx, rec)| {
                let id = rec.id.filter(|id| !id.is_empty()).unwrap_or_else(|| {
                    missing_devices.push(idx);
                    DeviceId::new("")
                });
                Device {
                    id,
                    kind: rec.kind,
                    col: rec.col,
                    row: rec.row,
                    rotation: rec.rotation,
                }
            })
            .collect();

        let mut missing_cells = Vec::new();
        self.cells = snapshot
            .pipeline_cells
            .into_iter()
            .enumerate()
            .map(|(idx, rec)| {
                let id = rec.id.filter(|id| !id.is_empty()).unwrap_or_else(|| {
                    missing_cells.push(idx);
                    PipelineCellId::new("")
                });
                PipelineCell {
                    id,
                    col: rec.col,
                    row: rec.row,
                    direction: rec.direction,
                    segment_id: rec.segment_id,
                }
            })
            .collect();

        let mut missing_elements = Vec::new();
        self.elements = snapshot
            .pipeline_elements
            .into_iter()
            .enumerate()
            .map(|(idx, rec)| {
                let id = rec.id.filter(|id| !id.is_empty()).unwrap_or_else(|| {
                    missing_elements.push(idx);
                    ElementId::new("")
                });
                PipelineElement {
                    id,
                    kind: rec.kind,
                    col: rec.col,
                    row: rec.row,
                    rotation: rec.rotation,
                }
            })
            .collect();

        // Fill placeholders only after every provided id is in place.
        for &idx in &missing_devices {
            let id = fresh_id(&mut self.next_serial, DeviceId::numbered, |id| {
                self.devices.iter().any(|d| &d.id == id)
            });
            self.devices[idx].id = id;
        }
        for &idx in &missing_cells {
            let id = fresh_id(&mut self.next_serial, PipelineCellId::numbered, |id| {
                self.cells.iter().any(|c| &c.id == id)
            });
            self.cells[idx].id = id;
        }
        for &idx in &missing_elements {
            let id = fresh_id(&mut self.next_serial, ElementId::numbered, |id| {
                self.elements.iter().any(|e| &e.id == id)
            });
            self.elements[idx].id = id;
        }

        LoadReport {
            devices: self.devices.len(),
            pipeline_cells: self.cells.len(),
            pipeline_elements: self.elements.len(),
            regenerated_ids: missing_devices.len() + missing_cells.len() + missing_elements.len(),
        }
    }

    /// Remove every entity, keeping the grid size.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.cells.clear();
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DeviceKind, ElementKind};
    use crate::geometry::Direction;
    use crate::scene::SceneSnapshot;

    fn pos(col: i32, row: i32) -> GridPosition {
        GridPosition::new(col, row)
    }

    fn store() -> EntityStore {
        EntityStore::new(GridSize::new(20, 20))
    }

    fn add_cell(store: &mut EntityStore, at: GridPosition, segment: &SegmentId) -> PipelineCellId {
        store.add_pipeline_cell(NewPipelineCell {
            position: at,
            direction: Direction::Right,
            segment_id: segment.clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Devices
    // -----------------------------------------------------------------------

    #[test]
    fn add_assigns_unique_ids() {
        let mut s = store();
        let a = s.add_device(NewDevice::new(DeviceKind::Refinery, pos(0, 0)));
        let b = s.add_device(NewDevice::new(DeviceKind::Refinery, pos(5, 0)));
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("dev-"));
        assert_eq!(s.devices().len(), 2);
        assert_eq!(s.device(&b).unwrap().anchor(), pos(5, 0));
    }

    #[test]
    fn rotate_wraps_after_four_turns() {
        let mut s = store();
        let id = s.add_device(NewDevice::new(DeviceKind::Crusher, pos(0, 0)));
        assert_eq!(s.rotate_device(&id), Some(Rotation::Cw90));
        assert_eq!(s.rotate_device(&id), Some(Rotation::Cw180));
        assert_eq!(s.rotate_device(&id), Some(Rotation::Cw270));
        assert_eq!(s.rotate_device(&id), Some(Rotation::None));
    }

    #[test]
    fn move_returns_previous_state() {
        let mut s = store();
        let id = s.add_device(NewDevice::new(DeviceKind::Crusher, pos(1, 1)));
        let before = s.move_device(&id, pos(4, 4)).unwrap();
        assert_eq!(before.anchor(), pos(1, 1));
        assert_eq!(s.device(&id).unwrap().anchor(), pos(4, 4));
    }

    #[test]
    fn stale_ids_are_no_ops() {
        let mut s = store();
        let id = s.add_device(NewDevice::new(DeviceKind::Crusher, pos(1, 1)));
        assert!(s.remove_device(&id).is_some());
        assert!(s.remove_device(&id).is_none());
        assert!(s.move_device(&id, pos(0, 0)).is_none());
        assert!(s.rotate_device(&id).is_none());
        assert!(s.update_device(&id, DevicePatch::default()).is_none());
        assert!(s.devices().is_empty());
    }

    // -----------------------------------------------------------------------
    // Pipeline cells and elements
    // -----------------------------------------------------------------------

    #[test]
    fn remove_segment_removes_all_and_only_its_cells() {
        let mut s = store();
        let seg_a = s.allocate_segment_id();
        let seg_b = s.allocate_segment_id();
        assert_ne!(seg_a, seg_b);
        for c in 0..4 {
            add_cell(&mut s, pos(c, 0), &seg_a);
        }
        let keep = add_cell(&mut s, pos(0, 5), &seg_b);

        let removed = s.remove_segment(&seg_a);
        assert_eq!(removed.len(), 4);
        assert!(removed.iter().all(|c| c.segment_id == seg_a));
        assert_eq!(s.pipeline_cells().len(), 1);
        assert_eq!(s.pipeline_cells()[0].id, keep);
    }

    #[test]
    fn update_cell_direction() {
        let mut s = store();
        let seg = s.allocate_segment_id();
        let id = add_cell(&mut s, pos(2, 2), &seg);
        s.update_pipeline_cell(&id, &PipelineCellPatch::direction(Direction::Down))
            .unwrap();
        assert_eq!(s.pipeline_cell(&id).unwrap().direction, Direction::Down);
        assert_eq!(s.segment_cell_at(&seg, pos(2, 2)).unwrap().id, id);
        assert!(s.segment_cell_at(&seg, pos(3, 2)).is_none());
    }

    #[test]
    fn element_move_and_rotate() {
        let mut s = store();
        let id = s.add_pipeline_element(NewPipelineElement::new(ElementKind::Splitter, pos(3, 3)));
        assert!(id.as_str().starts_with("pel-"));
        s.move_pipeline_element(&id, pos(4, 3)).unwrap();
        assert_eq!(s.rotate_pipeline_element(&id), Some(Rotation::Cw90));
        let el = s.pipeline_element(&id).unwrap();
        assert_eq!(el.position(), pos(4, 3));
        assert_eq!(el.rotation, Rotation::Cw90);
    }

    // -----------------------------------------------------------------------
    // Snapshot / load
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_then_load_is_identity() {
        let mut s = store();
        s.add_device(NewDevice::new(DeviceKind::PowerStation, pos(0, 0)));
        let seg = s.allocate_segment_id();
        add_cell(&mut s, pos(5, 5), &seg);
        s.add_pipeline_element(NewPipelineElement::new(ElementKind::Merger, pos(9, 9)));

        let snap = s.snapshot();
        let mut other = EntityStore::new(GridSize::new(1, 1));
        let report = other.load(snap.clone());
        assert_eq!(report.regenerated_ids, 0);
        assert_eq!(other.snapshot(), snap);
        assert_eq!(other.grid(), GridSize::new(20, 20));
    }

    #[test]
    fn load_fills_missing_ids_without_collisions() {
        let json = r#"{
            "version": 1, "gridCols": 30, "gridRows": 30,
            "devices": [
                { "kind": "crusher", "col": 0, "row": 0, "rotation": 0 },
                { "id": "dev-1", "kind": "crusher", "col": 5, "row": 0, "rotation": 0 }
            ],
            "pipelineCells": [ { "id": "", "col": 9, "row": 9, "direction": "left", "segmentId": "seg-1" } ],
            "pipelineElements": []
        }"#;
        let snap: SceneSnapshot = serde_json::from_str(json).unwrap();
        let mut s = store();
        let report = s.load(snap);

        assert_eq!(report.devices, 2);
        assert_eq!(report.regenerated_ids, 2);
        let ids: Vec<_> = s.devices().iter().map(|d| d.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
        assert!(!ids[0].is_empty());
        assert_eq!(ids[1].as_str(), "dev-1");
        assert!(!s.pipeline_cells()[0].id.is_empty());

        // New ids must also avoid loaded segment ids.
        let seg = s.allocate_segment_id();
        assert_ne!(seg.as_str(), "seg-1");
    }
}
