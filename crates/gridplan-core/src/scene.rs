//! Persisted scene snapshot.
//!
//! The wire format is the editor's JSON save file: camelCase keys, kinds in
//! snake_case, rotations in degrees. Entity ids are optional on input; the
//! store assigns fresh ones to records that lack them.

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceKind, ElementKind};
use crate::entity::{Device, PipelineCell, PipelineElement};
use crate::geometry::{Direction, Rotation};
use crate::id::{DeviceId, ElementId, PipelineCellId, SegmentId};

/// Version written by [`crate::store::EntityStore::snapshot`].
pub const SCENE_VERSION: u32 = 1;

/// The complete editable state of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub version: u32,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub devices: Vec<DeviceRecord>,
    pub pipeline_cells: Vec<PipelineCellRecord>,
    pub pipeline_elements: Vec<PipelineElementRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DeviceId>,
    pub kind: DeviceKind,
    pub col: i32,
    pub row: i32,
    #[serde(default)]
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineCellRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PipelineCellId>,
    pub col: i32,
    pub row: i32,
    pub direction: Direction,
    pub segment_id: SegmentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineElementRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,
    pub kind: ElementKind,
    pub col: i32,
    pub row: i32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl From<&Device> for DeviceRecord {
    fn from(d: &Device) -> Self {
        Self {
            id: Some(d.id.clone()),
            kind: d.kind,
            col: d.col,
            row: d.row,
            rotation: d.rotation,
        }
    }
}

impl From<&PipelineCell> for PipelineCellRecord {
    fn from(c: &PipelineCell) -> Self {
        Self {
            id: Some(c.id.clone()),
            col: c.col,
            row: c.row,
            direction: c.direction,
            segment_id: c.segment_id.clone(),
        }
    }
}

impl From<&PipelineElement> for PipelineElementRecord {
    fn from(e: &PipelineElement) -> Self {
        Self {
            id: Some(e.id.clone()),
            kind: e.kind,
            col: e.col,
            row: e.row,
            rotation: e.rotation,
        }
    }
}
