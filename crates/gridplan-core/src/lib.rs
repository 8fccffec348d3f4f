//! Gridplan Core -- the data model of a grid-based factory layout editor.
//!
//! A layout is a rectangular grid of cells holding three kinds of entity:
//!
//! - **Devices** -- multi-cell machines drawn from a fixed catalog. Each
//!   kind has a size class (2x2, 3x3, 4x6 or 6x6) that fixes its footprint.
//! - **Pipeline cells** -- single-cell belt tiles with a flow direction,
//!   grouped into segments by the drag gesture that drew them.
//! - **Pipeline elements** -- single-cell connectors (cross bridge,
//!   splitter, merger).
//!
//! # Key Types
//!
//! - [`geometry::GridPosition`], [`geometry::Footprint`] and
//!   [`geometry::CellRect`] -- integer cell geometry.
//! - [`catalog::DeviceKind`] -- the static device catalog.
//! - [`store::EntityStore`] -- the authoritative entity collections.
//! - [`scene::SceneSnapshot`] -- the persisted scene format.
//!
//! The store does not validate placement. Occupancy queries and placement
//! rules live in `gridplan-spatial`.

pub mod catalog;
pub mod entity;
pub mod geometry;
pub mod id;
pub mod scene;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::{DeviceDef, DeviceKind, ElementKind, SizeClass};
pub use entity::{
    Device, DevicePatch, NewDevice, NewPipelineCell, NewPipelineElement, PipelineCell,
    PipelineCellPatch, PipelineElement, PipelineElementPatch,
};
pub use geometry::{CellRect, Direction, Footprint, GridPosition, GridSize, Rotation};
pub use id::{DeviceId, ElementId, PipelineCellId, SegmentId};
pub use scene::{SCENE_VERSION, SceneSnapshot};
pub use store::{EntityStore, LoadReport};
