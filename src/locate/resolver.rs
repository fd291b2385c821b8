//! City name to coordinate resolution.

use rand::Rng;
use tracing::debug;

use super::cities::{city_point, CITY_TABLE, CITY_VARIANTS, FALLBACK_POINT};
use crate::models::GeoPoint;

/// Default marker spread, in degrees, applied to both axes
pub const DEFAULT_JITTER_DEGREES: f64 = 0.025;

/// How a city name was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Partial,
    Variant,
    Fallback,
}

/// Maps free-text city names to approximate coordinates.
///
/// Precedence, first hit wins: exact key, substring either way in table
/// order, alternate spelling, country fallback. Every returned point is
/// jittered so agencies sharing a city do not stack on the map.
#[derive(Debug, Clone)]
pub struct CityResolver {
    jitter_degrees: f64,
    fallback: GeoPoint,
}

impl Default for CityResolver {
    fn default() -> Self {
        Self {
            jitter_degrees: DEFAULT_JITTER_DEGREES,
            fallback: FALLBACK_POINT,
        }
    }
}

impl CityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum jitter in degrees. `0.0` disables jitter, and so does
    /// a non-finite value.
    pub fn with_jitter(mut self, degrees: f64) -> Self {
        self.jitter_degrees = if degrees.is_finite() { degrees.abs() } else { 0.0 };
        self
    }

    pub fn with_fallback(mut self, fallback: GeoPoint) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn jitter_degrees(&self) -> f64 {
        self.jitter_degrees
    }

    pub fn fallback(&self) -> GeoPoint {
        self.fallback
    }

    /// Resolve a city name to a jittered point
    pub fn resolve<R: Rng + ?Sized>(&self, city: &str, rng: &mut R) -> GeoPoint {
        let (base, _) = self.lookup(city);
        self.jitter(base, rng)
    }

    /// Resolve with country and postal code. Both are accepted for callers that
    /// have them but do not take part in matching.
    pub fn resolve_address<R: Rng + ?Sized>(
        &self,
        city: &str,
        _country: Option<&str>,
        _postal_code: Option<&str>,
        rng: &mut R,
    ) -> GeoPoint {
        self.resolve(city, rng)
    }

    /// Base point before jitter
    pub fn resolve_base(&self, city: &str) -> GeoPoint {
        self.lookup(city).0
    }

    /// Base point and the rule that produced it
    pub fn lookup(&self, city: &str) -> (GeoPoint, MatchKind) {
        let query = city.trim().to_lowercase();
        if query.is_empty() {
            debug!("Empty city name, using fallback point");
            return (self.fallback, MatchKind::Fallback);
        }

        if let Some(point) = city_point(&query) {
            return (point, MatchKind::Exact);
        }

        if let Some((name, point)) = CITY_TABLE
            .iter()
            .find(|(name, _)| query.contains(name) || name.contains(query.as_str()))
        {
            debug!("City '{}' partially matched '{}'", city, name);
            return (*point, MatchKind::Partial);
        }

        if let Some(point) = CITY_VARIANTS
            .iter()
            .find(|(variant, _)| query.contains(variant))
            .and_then(|(_, canonical)| city_point(canonical))
        {
            debug!("City '{}' matched an alternate spelling", city);
            return (point, MatchKind::Variant);
        }

        debug!("Unknown city '{}', using fallback point", city);
        (self.fallback, MatchKind::Fallback)
    }

    fn jitter<R: Rng + ?Sized>(&self, base: GeoPoint, rng: &mut R) -> GeoPoint {
        if self.jitter_degrees == 0.0 {
            return base;
        }
        let j = self.jitter_degrees;
        base.offset(rng.gen_range(-j..=j), rng.gen_range(-j..=j))
    }
}
