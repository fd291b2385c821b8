//! Reference point selection.
//!
//! The user's position comes from a platform geolocation service that may be
//! denied, unsupported or slow. Whatever the outcome, ranking always gets a
//! reference point: a fresh fix when there is one, the default otherwise.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cities::DEFAULT_REFERENCE;
use crate::models::GeoPoint;

/// Options handed to the platform geolocation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    /// Give up on the request after this many seconds
    pub timeout_secs: u64,
    /// Accept a cached fix up to this old
    pub maximum_age_secs: u64,
    /// Used when no usable fix is available
    pub default_reference: GeoPoint,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_secs: 10,
            maximum_age_secs: 300,
            default_reference: DEFAULT_REFERENCE,
        }
    }
}

impl GeolocationOptions {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Saturates at [`Duration::MAX`] for ages chrono cannot represent
    pub fn maximum_age(&self) -> Duration {
        i64::try_from(self.maximum_age_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

/// A position reported by the geolocation service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub point: GeoPoint,
    pub acquired_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl LocationFix {
    pub fn new(point: GeoPoint, acquired_at: DateTime<Utc>) -> Self {
        Self {
            point,
            acquired_at,
            accuracy_m: None,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, maximum_age: Duration) -> bool {
        now.signed_duration_since(self.acquired_at) <= maximum_age
    }
}

/// Outcome of a geolocation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationOutcome {
    Located(LocationFix),
    Denied,
    Unavailable,
    TimedOut,
}

impl LocationOutcome {
    pub fn fix(&self) -> Option<LocationFix> {
        match self {
            LocationOutcome::Located(fix) => Some(*fix),
            _ => None,
        }
    }
}

/// Reference point for ranking: the fix when it is finite and fresh, else the
/// configured default.
pub fn reference_point(
    fix: Option<&LocationFix>,
    now: DateTime<Utc>,
    options: &GeolocationOptions,
) -> GeoPoint {
    match fix {
        Some(fix) if fix.point.is_finite() && fix.is_fresh(now, options.maximum_age()) => {
            fix.point
        }
        Some(_) => {
            debug!("Location fix is stale or invalid, using default reference point");
            options.default_reference
        }
        None => options.default_reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_fresh_fix_is_used() {
        let options = GeolocationOptions::default();
        let fix = LocationFix::new(GeoPoint::new(35.8, 10.6), at(0));
        assert_eq!(reference_point(Some(&fix), at(60), &options), fix.point);
    }

    #[test]
    fn test_stale_fix_falls_back() {
        let options = GeolocationOptions::default();
        let fix = LocationFix::new(GeoPoint::new(35.8, 10.6), at(0));
        assert_eq!(
            reference_point(Some(&fix), at(301), &options),
            DEFAULT_REFERENCE
        );
    }

    #[test]
    fn test_denied_falls_back() {
        let options = GeolocationOptions::default();
        let outcome = LocationOutcome::Denied;
        assert_eq!(
            reference_point(outcome.fix().as_ref(), at(0), &options),
            DEFAULT_REFERENCE
        );
    }

    #[test]
    fn test_invalid_fix_falls_back() {
        let options = GeolocationOptions::default();
        let fix = LocationFix::new(GeoPoint::new(f64::NAN, 10.6), at(0));
        assert_eq!(reference_point(Some(&fix), at(0), &options), DEFAULT_REFERENCE);
    }

    #[test]
    fn test_default_options() {
        let options = GeolocationOptions::default();
        assert_eq!(options.timeout(), std::time::Duration::from_secs(10));
        assert_eq!(options.maximum_age(), Duration::minutes(5));
    }

    #[test]
    fn test_huge_maximum_age_saturates() {
        let options = GeolocationOptions {
            maximum_age_secs: 10_000_000_000_000_000,
            ..Default::default()
        };
        assert_eq!(options.maximum_age(), Duration::MAX);

        let fix = LocationFix::new(GeoPoint::new(35.8, 10.6), at(0));
        assert_eq!(reference_point(Some(&fix), at(86_400), &options), fix.point);
    }
}
