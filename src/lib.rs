//! VitaRenta - agency locator and shared rental domain logic
//!
//! This library provides the nearest-agency ranking pipeline used by the
//! `locator` binary, plus the typed roles, forms and listing helpers shared
//! with the rest of the platform.

pub mod auth;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod locate;
pub mod models;

pub use locate::{CityResolver, NearestAgencyRanker};
pub use models::{Agency, AgencyId, GeoPoint, MapBounds, RankedAgency};
