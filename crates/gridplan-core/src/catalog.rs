//! Static catalog of device and pipeline-element kinds.
//!
//! Every attribute that varies by kind (footprint, display colour, whether
//! the kind projects or needs power) lives in one data table indexed by the
//! kind, never in per-kind conditionals.

use serde::{Deserialize, Serialize};

use crate::geometry::Footprint;

// ---------------------------------------------------------------------------
// Size classes
// ---------------------------------------------------------------------------

/// The fixed footprint sizes devices come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "2x2")]
    S2x2,
    #[serde(rename = "3x3")]
    S3x3,
    #[serde(rename = "4x6")]
    S4x6,
    #[serde(rename = "6x6")]
    S6x6,
}

impl SizeClass {
    pub fn all() -> [SizeClass; 4] {
        [SizeClass::S2x2, SizeClass::S3x3, SizeClass::S4x6, SizeClass::S6x6]
    }

    pub fn footprint(self) -> Footprint {
        match self {
            SizeClass::S2x2 => Footprint::new(2, 2),
            SizeClass::S3x3 => Footprint::new(3, 3),
            SizeClass::S4x6 => Footprint::new(4, 6),
            SizeClass::S6x6 => Footprint::new(6, 6),
        }
    }

    /// Device kinds of this size, in toolbar order.
    pub fn kinds(self) -> impl Iterator<Item = DeviceKind> {
        DeviceKind::ALL.into_iter().filter(move |k| k.size() == self)
    }
}

// ---------------------------------------------------------------------------
// Device kinds
// ---------------------------------------------------------------------------

/// Every placeable device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    PowerStation,
    HeatPool,
    Refinery,
    Crusher,
    PartsMachine,
    ShapingMachine,
    EquipmentOrigin,
    Filler,
    Packager,
    Grinder,
    Disassembler,
    SeedCollector,
    Planter,
    Reactor,
    Furnace,
}

/// Static attributes of a device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDef {
    pub kind: DeviceKind,
    pub size: SizeClass,
    /// Display name.
    pub name: &'static str,
    /// Fill colour as `#rrggbb`.
    pub color: &'static str,
    /// Influence radius in cells, for power sources only.
    pub power_range: Option<u32>,
    /// Production devices stop working outside every power rectangle.
    pub requires_power: bool,
}

impl DeviceDef {
    pub fn is_power_source(&self) -> bool {
        self.power_range.is_some()
    }
}

const fn def(
    kind: DeviceKind,
    size: SizeClass,
    name: &'static str,
    color: &'static str,
) -> DeviceDef {
    DeviceDef {
        kind,
        size,
        name,
        color,
        power_range: None,
        requires_power: !matches!(size, SizeClass::S2x2),
    }
}

/// Indexed by `DeviceKind as usize`; order must match the enum.
static DEVICE_DEFS: [DeviceDef; 15] = [
    DeviceDef {
        kind: DeviceKind::PowerStation,
        size: SizeClass::S2x2,
        name: "Power Station",
        color: "#87CEEB",
        power_range: Some(5),
        requires_power: false,
    },
    def(DeviceKind::HeatPool, SizeClass::S2x2, "Heat Pool", "#ADD8E6"),
    def(DeviceKind::Refinery, SizeClass::S3x3, "Refinery", "#FFB6C1"),
    def(DeviceKind::Crusher, SizeClass::S3x3, "Crusher", "#C0C0C0"),
    def(DeviceKind::PartsMachine, SizeClass::S3x3, "Parts Machine", "#FFD700"),
    def(DeviceKind::ShapingMachine, SizeClass::S3x3, "Shaping Machine", "#4169E1"),
    def(DeviceKind::EquipmentOrigin, SizeClass::S4x6, "Equipment Origin", "#DC143C"),
    def(DeviceKind::Filler, SizeClass::S4x6, "Filler", "#FFF44F"),
    def(DeviceKind::Packager, SizeClass::S4x6, "Packager", "#6B8E23"),
    def(DeviceKind::Grinder, SizeClass::S4x6, "Grinder", "#800080"),
    def(DeviceKind::Disassembler, SizeClass::S4x6, "Disassembler", "#FF8C00"),
    def(DeviceKind::SeedCollector, SizeClass::S6x6, "Seed Collector", "#00CED1"),
    def(DeviceKind::Planter, SizeClass::S6x6, "Planter", "#8B4513"),
    def(DeviceKind::Reactor, SizeClass::S6x6, "Reactor", "#FF00FF"),
    def(DeviceKind::Furnace, SizeClass::S6x6, "Furnace", "#6B8E23"),
];

impl DeviceKind {
    pub const ALL: [DeviceKind; 15] = [
        DeviceKind::PowerStation,
        DeviceKind::HeatPool,
        DeviceKind::Refinery,
        DeviceKind::Crusher,
        DeviceKind::PartsMachine,
        DeviceKind::ShapingMachine,
        DeviceKind::EquipmentOrigin,
        DeviceKind::Filler,
        DeviceKind::Packager,
        DeviceKind::Grinder,
        DeviceKind::Disassembler,
        DeviceKind::SeedCollector,
        DeviceKind::Planter,
        DeviceKind::Reactor,
        DeviceKind::Furnace,
    ];

    pub fn def(self) -> &'static DeviceDef {
        &DEVICE_DEFS[self as usize]
    }

    pub fn size(self) -> SizeClass {
        self.def().size
    }

    /// Unrotated footprint; rotation never changes it.
    pub fn footprint(self) -> Footprint {
        self.def().size.footprint()
    }

    pub fn power_range(self) -> Option<u32> {
        self.def().power_range
    }

    pub fn is_power_source(self) -> bool {
        self.def().is_power_source()
    }

    pub fn requires_power(self) -> bool {
        self.def().requires_power
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

// ---------------------------------------------------------------------------
// Pipeline element kinds
// ---------------------------------------------------------------------------

/// Single-cell pipeline connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    CrossBridge,
    Splitter,
    Merger,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [
        ElementKind::CrossBridge,
        ElementKind::Splitter,
        ElementKind::Merger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::CrossBridge => "Pipeline Cross Bridge",
            ElementKind::Splitter => "Pipeline Splitter",
            ElementKind::Merger => "Pipeline Merger",
        }
    }

    /// Only a cross bridge may sit on the same cell as pipeline belts.
    pub fn shares_with_pipeline(self) -> bool {
        matches!(self, ElementKind::CrossBridge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_enum() {
        for kind in DeviceKind::ALL {
            assert_eq!(kind.def().kind, kind);
        }
    }

    #[test]
    fn size_classes_partition_kinds() {
        let total: usize = SizeClass::all().iter().map(|s| s.kinds().count()).sum();
        assert_eq!(total, DeviceKind::ALL.len());
        assert_eq!(
            SizeClass::S2x2.kinds().collect::<Vec<_>>(),
            vec![DeviceKind::PowerStation, DeviceKind::HeatPool]
        );
        assert_eq!(SizeClass::S3x3.kinds().count(), 4);
        assert_eq!(SizeClass::S4x6.kinds().count(), 5);
        assert_eq!(SizeClass::S6x6.kinds().count(), 4);
    }

    #[test]
    fn footprints_follow_size_class() {
        assert_eq!(DeviceKind::PowerStation.footprint(), Footprint::new(2, 2));
        assert_eq!(DeviceKind::Refinery.footprint(), Footprint::new(3, 3));
        assert_eq!(DeviceKind::Grinder.footprint(), Footprint::new(4, 6));
        assert_eq!(DeviceKind::Furnace.footprint(), Footprint::new(6, 6));
    }

    #[test]
    fn only_power_station_projects_power() {
        let sources: Vec<_> = DeviceKind::ALL
            .into_iter()
            .filter(|k| k.is_power_source())
            .collect();
        assert_eq!(sources, vec![DeviceKind::PowerStation]);
        assert_eq!(DeviceKind::PowerStation.power_range(), Some(5));
    }

    #[test]
    fn production_kinds_require_power() {
        assert!(!DeviceKind::PowerStation.requires_power());
        assert!(!DeviceKind::HeatPool.requires_power());
        for kind in DeviceKind::ALL {
            if kind.size() != SizeClass::S2x2 {
                assert!(kind.requires_power(), "{kind:?} should require power");
            }
        }
    }

    #[test]
    fn kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&DeviceKind::EquipmentOrigin).unwrap(),
            "\"equipment_origin\""
        );
        assert_eq!(
            serde_json::to_string(&ElementKind::CrossBridge).unwrap(),
            "\"cross_bridge\""
        );
        let k: DeviceKind = serde_json::from_str("\"seed_collector\"").unwrap();
        assert_eq!(k, DeviceKind::SeedCollector);
    }

    #[test]
    fn only_cross_bridge_shares_with_pipeline() {
        assert!(ElementKind::CrossBridge.shares_with_pipeline());
        assert!(!ElementKind::Splitter.shares_with_pipeline());
        assert!(!ElementKind::Merger.shares_with_pipeline());
    }
}
