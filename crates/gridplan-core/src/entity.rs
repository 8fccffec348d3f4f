//! Entities placed on the grid and the partial updates applied to them.

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceKind, ElementKind};
use crate::geometry::{Direction, Footprint, GridPosition, Rotation};
use crate::id::{DeviceId, ElementId, PipelineCellId, SegmentId};

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// A machine anchored at its top-left cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub col: i32,
    pub row: i32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl Device {
    pub fn anchor(&self) -> GridPosition {
        GridPosition::new(self.col, self.row)
    }

    pub fn footprint(&self) -> Footprint {
        self.kind.footprint()
    }

    /// Absolute cells covered by this device. Independent of rotation.
    pub fn occupied_cells(&self) -> impl Iterator<Item = GridPosition> {
        self.footprint().tiles(self.anchor())
    }

    pub fn covers(&self, pos: GridPosition) -> bool {
        self.footprint().covers(self.anchor(), pos)
    }
}

/// A device before the store has assigned it an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewDevice {
    pub kind: DeviceKind,
    pub position: GridPosition,
    pub rotation: Rotation,
}

impl NewDevice {
    pub fn new(kind: DeviceKind, position: GridPosition) -> Self {
        Self {
            kind,
            position,
            rotation: Rotation::None,
        }
    }
}

/// Fields to overwrite on an existing device; `None` leaves a field as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevicePatch {
    pub kind: Option<DeviceKind>,
    pub position: Option<GridPosition>,
    pub rotation: Option<Rotation>,
}

impl DevicePatch {
    pub(crate) fn apply(&self, device: &mut Device) {
        if let Some(kind) = self.kind {
            device.kind = kind;
        }
        if let Some(pos) = self.position {
            device.col = pos.col;
            device.row = pos.row;
        }
        if let Some(rotation) = self.rotation {
            device.rotation = rotation;
        }
    }

    /// Whether applying this patch can change which cells are covered.
    pub fn touches_footprint(&self) -> bool {
        self.kind.is_some() || self.position.is_some()
    }
}

// ---------------------------------------------------------------------------
// Pipeline cells
// ---------------------------------------------------------------------------

/// One belt tile carrying flow in `direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineCell {
    pub id: PipelineCellId,
    pub col: i32,
    pub row: i32,
    pub direction: Direction,
    pub segment_id: SegmentId,
}

impl PipelineCell {
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.col, self.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPipelineCell {
    pub position: GridPosition,
    pub direction: Direction,
    pub segment_id: SegmentId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineCellPatch {
    pub position: Option<GridPosition>,
    pub direction: Option<Direction>,
    pub segment_id: Option<SegmentId>,
}

impl PipelineCellPatch {
    pub fn direction(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, cell: &mut PipelineCell) {
        if let Some(pos) = self.position {
            cell.col = pos.col;
            cell.row = pos.row;
        }
        if let Some(direction) = self.direction {
            cell.direction = direction;
        }
        if let Some(segment_id) = &self.segment_id {
            cell.segment_id = segment_id.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline elements
// ---------------------------------------------------------------------------

/// A single-cell connector: cross bridge, splitter or merger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub col: i32,
    pub row: i32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PipelineElement {
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.col, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPipelineElement {
    pub kind: ElementKind,
    pub position: GridPosition,
    pub rotation: Rotation,
}

impl NewPipelineElement {
    pub fn new(kind: ElementKind, position: GridPosition) -> Self {
        Self {
            kind,
            position,
            rotation: Rotation::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineElementPatch {
    pub kind: Option<ElementKind>,
    pub position: Option<GridPosition>,
    pub rotation: Option<Rotation>,
}

impl PipelineElementPatch {
    pub(crate) fn apply(&self, element: &mut PipelineElement) {
        if let Some(kind) = self.kind {
            element.kind = kind;
        }
        if let Some(pos) = self.position {
            element.col = pos.col;
            element.row = pos.row;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_cells_ignore_rotation() {
        let mut device = Device {
            id: DeviceId::new("dev-1"),
            kind: DeviceKind::Grinder,
            col: 2,
            row: 1,
            rotation: Rotation::None,
        };
        let unrotated: Vec<_> = device.occupied_cells().collect();
        device.rotation = Rotation::Cw90;
        let rotated: Vec<_> = device.occupied_cells().collect();
        assert_eq!(unrotated, rotated);
        assert_eq!(rotated.len(), 24);
        assert!(device.covers(GridPosition::new(5, 6)));
        assert!(!device.covers(GridPosition::new(6, 1)));
    }

    #[test]
    fn device_patch_applies_only_set_fields() {
        let mut device = Device {
            id: DeviceId::new("dev-1"),
            kind: DeviceKind::Crusher,
            col: 0,
            row: 0,
            rotation: Rotation::None,
        };
        let patch = DevicePatch {
            rotation: Some(Rotation::Cw180),
            ..DevicePatch::default()
        };
        assert!(!patch.touches_footprint());
        patch.apply(&mut device);
        assert_eq!(device.rotation, Rotation::Cw180);
        assert_eq!(device.kind, DeviceKind::Crusher);
        assert_eq!(device.anchor(), GridPosition::new(0, 0));
    }

    #[test]
    fn pipeline_cell_json_uses_camel_case() {
        let cell = PipelineCell {
            id: PipelineCellId::new("pipe-1"),
            col: 3,
            row: 4,
            direction: Direction::Down,
            segment_id: SegmentId::new("seg-1"),
        };
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["segmentId"], "seg-1");
        assert_eq!(json["direction"], "down");
    }

    #[test]
    fn element_rotation_defaults_to_zero() {
        let el: PipelineElement =
            serde_json::from_str(r#"{"id":"pel-1","kind":"splitter","col":1,"row":2}"#).unwrap();
        assert_eq!(el.rotation, Rotation::None);
        assert_eq!(el.position(), GridPosition::new(1, 2));
    }
}
