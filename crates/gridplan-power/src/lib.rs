//! Power coverage for gridplan layouts.
//!
//! Power sources project a square field of influence around the centre of
//! their footprint. A cell is powered when it lies inside the field of at
//! least one source; a device is powered when any of its cells is.
//!
//! # Design
//!
//! - The field's half-extents come from [`PowerRules`], so the exact window
//!   is configuration rather than code.
//! - [`PowerCoverage`] borrows the current devices and recomputes on every
//!   query. Nothing is cached, so it can never go stale.
//! - Devices whose kind does not require power (2x2 kinds, including the
//!   sources themselves) always count as powered.

use std::collections::{BTreeMap, BTreeSet};

use gridplan_core::catalog::DeviceKind;
use gridplan_core::entity::Device;
use gridplan_core::geometry::{CellRect, GridPosition, GridSize};
use gridplan_core::store::EntityStore;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Shape of a source's field.
///
/// A source of range `r` centred on `c` covers `[c - (r + extra_low),
/// c + (r + extra_high)]` on both axes. The defaults give a range-5 station
/// a 12x12 window reaching six cells up and left of its centre and five
/// down and right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerRules {
    pub extra_low: u32,
    pub extra_high: u32,
    /// Per-kind replacement for the catalog range. Only applies to kinds
    /// that are power sources.
    pub range_overrides: BTreeMap<DeviceKind, u32>,
}

impl Default for PowerRules {
    fn default() -> Self {
        Self {
            extra_low: 1,
            extra_high: 0,
            range_overrides: BTreeMap::new(),
        }
    }
}

impl PowerRules {
    /// Effective range of `kind`, or `None` if it is not a power source.
    pub fn range_of(&self, kind: DeviceKind) -> Option<u32> {
        let base = kind.power_range()?;
        Some(self.range_overrides.get(&kind).copied().unwrap_or(base))
    }

    pub fn is_source(&self, kind: DeviceKind) -> bool {
        self.range_of(kind).is_some()
    }

    /// Unclipped field of `device`, or `None` if it is not a source.
    pub fn field(&self, device: &Device) -> Option<CellRect> {
        let range = self.range_of(device.kind)? as i64;
        let c = device.footprint().center(device.anchor());
        let low = range + self.extra_low as i64;
        let high = range + self.extra_high as i64;
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        Some(CellRect::new(
            GridPosition::new(clamp(c.col as i64 - low), clamp(c.row as i64 - low)),
            GridPosition::new(clamp(c.col as i64 + high), clamp(c.row as i64 + high)),
        ))
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

/// Power queries over a borrowed set of devices.
#[derive(Debug, Clone, Copy)]
pub struct PowerCoverage<'a> {
    rules: &'a PowerRules,
    grid: GridSize,
    devices: &'a [Device],
}

impl<'a> PowerCoverage<'a> {
    pub fn new(rules: &'a PowerRules, grid: GridSize, devices: &'a [Device]) -> Self {
        Self {
            rules,
            grid,
            devices,
        }
    }

    pub fn from_store(rules: &'a PowerRules, store: &'a EntityStore) -> Self {
        Self::new(rules, store.grid(), store.devices())
    }

    /// Devices projecting power.
    pub fn sources(&self) -> impl Iterator<Item = &'a Device> + 'a {
        let rules = self.rules;
        self.devices.iter().filter(move |d| rules.is_source(d.kind))
    }

    /// Field of `source` clipped to the grid. `None` for non-sources or a
    /// field lying wholly off the grid.
    pub fn coverage_rect(&self, source: &Device) -> Option<CellRect> {
        self.grid.clip(self.rules.field(source)?)
    }

    /// Cells powered by `source`, row-major. Used for range overlays.
    pub fn powered_cells(&self, source: &Device) -> Vec<GridPosition> {
        self.coverage_rect(source)
            .map(|rect| rect.cells().collect())
            .unwrap_or_default()
    }

    /// Union of every source's powered cells.
    pub fn all_powered_cells(&self) -> BTreeSet<GridPosition> {
        self.sources()
            .flat_map(|s| self.powered_cells(s))
            .collect()
    }

    pub fn is_cell_powered(&self, pos: GridPosition) -> bool {
        self.grid.contains(pos)
            && self
                .sources()
                .any(|s| self.rules.field(s).is_some_and(|f| f.contains(pos)))
    }

    /// Kinds that do not need power are always powered; otherwise any
    /// covered cell inside a field powers the device.
    pub fn is_device_powered(&self, device: &Device) -> bool {
        if !device.kind.requires_power() {
            return true;
        }
        device.occupied_cells().any(|pos| self.is_cell_powered(pos))
    }

    /// Devices that need power but receive none, in store order.
    pub fn unpowered_devices(&self) -> Vec<&'a Device> {
        self.devices
            .iter()
            .filter(|d| !self.is_device_powered(d))
            .collect()
    }
}
