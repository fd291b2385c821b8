//! Core data models for the agency locator.

pub mod agency;
pub mod point;

pub use agency::{Agency, AgencyId, RankedAgency};
pub use point::{GeoPoint, MapBounds};
