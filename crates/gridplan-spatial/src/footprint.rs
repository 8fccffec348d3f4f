//! Footprint resolution: which cells a device kind or a placed device covers.

use gridplan_core::catalog::DeviceKind;
use gridplan_core::entity::Device;
use gridplan_core::geometry::GridPosition;

/// Offsets `(dc, dr)` from the anchor covered by `kind`, in row-major order.
pub fn footprint_cells(kind: DeviceKind) -> Vec<(i32, i32)> {
    kind.footprint().offsets().collect()
}

/// Absolute cells covered by `device`.
pub fn occupied_cells(device: &Device) -> Vec<GridPosition> {
    device.occupied_cells().collect()
}

/// Cells `kind` would cover if anchored at `anchor`.
pub fn cells_at(kind: DeviceKind, anchor: GridPosition) -> Vec<GridPosition> {
    kind.footprint().tiles(anchor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridplan_core::catalog::SizeClass;
    use gridplan_core::geometry::Rotation;
    use gridplan_core::id::DeviceId;

    #[test]
    fn offsets_match_size_class() {
        for size in SizeClass::all() {
            let fp = size.footprint();
            for kind in size.kinds() {
                let cells = footprint_cells(kind);
                assert_eq!(cells.len() as u32, fp.area(), "{kind:?}");
            }
        }
    }

    #[test]
    fn offsets_are_row_major() {
        let cells = footprint_cells(DeviceKind::PowerStation);
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn tall_footprint_is_four_wide_six_high() {
        let cells = footprint_cells(DeviceKind::Packager);
        assert!(cells.contains(&(3, 5)));
        assert!(!cells.contains(&(4, 0)));
        assert!(!cells.contains(&(0, 6)));
    }

    #[test]
    fn occupied_cells_are_anchor_plus_offsets() {
        let device = Device {
            id: DeviceId::new("dev-1"),
            kind: DeviceKind::Refinery,
            col: 4,
            row: 7,
            rotation: Rotation::Cw270,
        };
        let cells = occupied_cells(&device);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], GridPosition::new(4, 7));
        assert_eq!(cells[8], GridPosition::new(6, 9));
        assert_eq!(cells, cells_at(DeviceKind::Refinery, GridPosition::new(4, 7)));
    }
}
