//! Layout audit.
//!
//! Mutations made through [`crate::layout::Layout`]'s checked operations
//! keep a layout consistent, but a loaded scene is taken as-is. The audit
//! walks a store and reports every rule a scene breaks.

use std::collections::BTreeSet;

use gridplan_core::geometry::GridPosition;
use gridplan_core::id::{DeviceId, ElementId, PipelineCellId, SegmentId};
use gridplan_core::store::EntityStore;

use crate::occupancy::OccupancyIndex;

/// One broken layout rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutViolation {
    #[error("device {device} leaves the grid")]
    DeviceOutOfBounds { device: DeviceId },
    #[error("devices {first} and {second} overlap at {},{}", at.col, at.row)]
    DevicesOverlap {
        first: DeviceId,
        second: DeviceId,
        at: GridPosition,
    },
    #[error("device {device} covers pipeline cell {cell}")]
    DeviceOnPipeline {
        device: DeviceId,
        cell: PipelineCellId,
        at: GridPosition,
    },
    #[error("device {device} covers pipeline element {element}")]
    DeviceOnElement {
        device: DeviceId,
        element: ElementId,
        at: GridPosition,
    },
    #[error("pipeline elements {first} and {second} share a cell")]
    ElementsShareCell {
        first: ElementId,
        second: ElementId,
        at: GridPosition,
    },
    #[error("pipeline element {element} sits on pipeline cell {cell}")]
    ElementOnPipeline {
        element: ElementId,
        cell: PipelineCellId,
        at: GridPosition,
    },
    #[error("segments {first} and {second} cross at {},{} without a bridge", at.col, at.row)]
    UnbridgedCrossing {
        first: SegmentId,
        second: SegmentId,
        at: GridPosition,
    },
    #[error("id {id} is used by more than one entity")]
    DuplicateId { id: String },
}

/// Report every violation in `store`, in a stable order: bounds, then
/// per-cell conflicts in row-major cell order, then duplicate ids.
pub fn audit(store: &EntityStore) -> Vec<LayoutViolation> {
    let mut violations = Vec::new();
    let grid = store.grid();

    for device in store.devices() {
        if !grid.contains_footprint(device.anchor(), device.footprint()) {
            violations.push(LayoutViolation::DeviceOutOfBounds {
                device: device.id.clone(),
            });
        }
    }

    let index = OccupancyIndex::from_store(store);
    let mut reported_pairs = BTreeSet::new();
    for (at, tile) in index.tiles() {
        let devices: Vec<_> = tile.devices.iter().collect();
        for (i, first) in devices.iter().enumerate() {
            for second in &devices[i + 1..] {
                // Overlapping devices share many cells; report each pair once.
                if reported_pairs.insert(((*first).clone(), (*second).clone())) {
                    violations.push(LayoutViolation::DevicesOverlap {
                        first: (*first).clone(),
                        second: (*second).clone(),
                        at,
                    });
                }
            }
        }

        if let Some(device) = tile.devices.first() {
            for cell in tile.cells.keys() {
                violations.push(LayoutViolation::DeviceOnPipeline {
                    device: device.clone(),
                    cell: cell.clone(),
                    at,
                });
            }
            for element in tile.elements.keys() {
                violations.push(LayoutViolation::DeviceOnElement {
                    device: device.clone(),
                    element: element.clone(),
                    at,
                });
            }
        }

        let elements: Vec<_> = tile.elements.iter().collect();
        for (i, (first, _)) in elements.iter().enumerate() {
            for (second, _) in &elements[i + 1..] {
                violations.push(LayoutViolation::ElementsShareCell {
                    first: (*first).clone(),
                    second: (*second).clone(),
                    at,
                });
            }
        }
        for (element, kind) in &tile.elements {
            if kind.shares_with_pipeline() {
                continue;
            }
            for cell in tile.cells.keys() {
                violations.push(LayoutViolation::ElementOnPipeline {
                    element: element.clone(),
                    cell: cell.clone(),
                    at,
                });
            }
        }

        let segments: BTreeSet<_> = tile.cells.values().collect();
        let bridged = tile.elements.values().any(|k| k.shares_with_pipeline());
        if segments.len() > 1 && !bridged {
            let mut iter = segments.into_iter();
            if let (Some(first), Some(second)) = (iter.next(), iter.next()) {
                violations.push(LayoutViolation::UnbridgedCrossing {
                    first: first.clone(),
                    second: second.clone(),
                    at,
                });
            }
        }
    }

    violations.extend(duplicate_ids(store));
    violations
}

/// Ids must be unique within each collection.
fn duplicate_ids(store: &EntityStore) -> Vec<LayoutViolation> {
    fn dupes<'a>(ids: impl Iterator<Item = &'a str>) -> BTreeSet<&'a str> {
        let mut seen = BTreeSet::new();
        ids.filter(|id| !seen.insert(*id)).collect()
    }

    let devices = dupes(store.devices().iter().map(|d| d.id.as_str()));
    let cells = dupes(store.pipeline_cells().iter().map(|c| c.id.as_str()));
    let elements = dupes(store.pipeline_elements().iter().map(|e| e.id.as_str()));
    devices
        .into_iter()
        .chain(cells)
        .chain(elements)
        .map(|id| LayoutViolation::DuplicateId { id: id.to_string() })
        .collect()
}
