//! Spatial rules for gridplan layouts: footprint resolution, cell occupancy,
//! placement validation and consistency auditing.
//!
//! Occupancy is answered through the [`Occupancy`] trait, implemented both by
//! a linear scan over [`gridplan_core::EntityStore`] and by the cell-keyed
//! [`OccupancyIndex`]. [`Layout`] keeps an index in step with a store.

pub mod audit;
pub mod footprint;
pub mod layout;
pub mod occupancy;
pub mod placement;

pub use audit::{LayoutViolation, audit};
pub use footprint::{cells_at, footprint_cells, occupied_cells};
pub use layout::{Layout, LoadSummary};
pub use occupancy::{Occupancy, OccupancyIndex, TileOccupants};
pub use placement::{
    PlacementError, can_place_device, can_place_pipeline_element, check_device_placement,
    check_element_placement,
};
