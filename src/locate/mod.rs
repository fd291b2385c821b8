//! Agency location: distance estimation, city resolution and ranking.

pub mod cities;
pub mod distance;
pub mod location;
pub mod ranker;
pub mod resolver;

pub use cities::{DEFAULT_REFERENCE, FALLBACK_POINT};
pub use distance::{distance_km, haversine_km, round_km, rounded_distance_km, EARTH_RADIUS_KM};
pub use location::{reference_point, GeolocationOptions, LocationFix, LocationOutcome};
pub use ranker::{fit_bounds, NearestAgencyRanker, DEFAULT_TOP_N};
pub use resolver::{CityResolver, MatchKind, DEFAULT_JITTER_DEGREES};
