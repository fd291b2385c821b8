//! Nearest-agency ranking and map bounds fitting.

use std::cmp::Ordering;

use geo::{BoundingRect, MultiPoint, Point};
use rand::Rng;
use tracing::debug;

use super::distance::{distance_km, round_km};
use super::resolver::CityResolver;
use crate::models::{Agency, GeoPoint, MapBounds, RankedAgency};

/// Number of agencies returned when no limit is configured
pub const DEFAULT_TOP_N: usize = 3;

/// Ranks agencies by great-circle distance to a reference point
#[derive(Debug, Clone)]
pub struct NearestAgencyRanker {
    resolver: CityResolver,
    top_n: usize,
}

impl Default for NearestAgencyRanker {
    fn default() -> Self {
        Self::new(CityResolver::default())
    }
}

impl NearestAgencyRanker {
    pub fn new(resolver: CityResolver) -> Self {
        Self {
            resolver,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn resolver(&self) -> &CityResolver {
        &self.resolver
    }

    /// Rank with the configured limit
    pub fn rank<R: Rng + ?Sized>(
        &self,
        reference: GeoPoint,
        agencies: &[Agency],
        rng: &mut R,
    ) -> Vec<RankedAgency> {
        self.rank_top(reference, agencies, self.top_n, rng)
    }

    /// Rank and keep the `limit` closest agencies.
    ///
    /// Agencies without a usable coordinate are resolved from their city name.
    /// Unknown distances (non-finite reference point) sort after known ones;
    /// equal distances keep input order. The input is not modified.
    pub fn rank_top<R: Rng + ?Sized>(
        &self,
        reference: GeoPoint,
        agencies: &[Agency],
        limit: usize,
        rng: &mut R,
    ) -> Vec<RankedAgency> {
        // Sort on the exact distance; rounding is for display only
        let mut scored: Vec<(Option<f64>, Agency, GeoPoint)> = agencies
            .iter()
            .map(|agency| {
                let coordinate = match agency.usable_coordinate() {
                    Some(c) => c,
                    None => self.resolver.resolve(&agency.city, rng),
                };
                let mut agency = agency.clone();
                agency.coordinate = Some(coordinate);
                (distance_km(reference, coordinate), agency, coordinate)
            })
            .collect();

        scored.sort_by(|a, b| compare_distance(a.0, b.0));
        scored.truncate(limit);

        let ranked: Vec<RankedAgency> = scored
            .into_iter()
            .map(|(distance, agency, coordinate)| RankedAgency {
                agency,
                coordinate,
                distance_km: distance.map(round_km),
            })
            .collect();

        debug!(
            "Ranked {} agencies, kept {} (limit {})",
            agencies.len(),
            ranked.len(),
            limit
        );
        ranked
    }
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Smallest envelope holding the reference point and every ranked agency,
/// grown by `padding` (a fraction of each side's span) on all sides.
///
/// Returns `None` when there is nothing finite to frame.
pub fn fit_bounds(
    reference: GeoPoint,
    ranked: &[RankedAgency],
    padding: f64,
) -> Option<MapBounds> {
    let points: MultiPoint<f64> = std::iter::once(reference)
        .chain(ranked.iter().map(|r| r.coordinate))
        .filter(GeoPoint::is_finite)
        .map(Point::from)
        .collect();

    let rect = points.bounding_rect()?;
    let pad_lat = rect.height() * padding.max(0.0);
    let pad_lon = rect.width() * padding.max(0.0);

    Some(MapBounds::new(
        GeoPoint::from(rect.min()).offset(-pad_lat, -pad_lon),
        GeoPoint::from(rect.max()).offset(pad_lat, pad_lon),
    ))
}
