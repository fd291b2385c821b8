//! Agency records as served by the backend listing endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::GeoPoint;

/// Opaque agency identifier. The backend sends integers, older fixtures strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AgencyId(pub String);

impl<'de> Deserialize<'de> for AgencyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_id(deserializer).map(AgencyId)
    }
}

/// Backend primary key as a string, whether sent as an integer or a string
pub(crate) fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

impl fmt::Display for AgencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgencyId {
    fn from(s: &str) -> Self {
        AgencyId(s.to_string())
    }
}

/// A rental agency.
///
/// Field names follow the backend (`nom`, `ville`, ...); the English names are
/// accepted as aliases. On the wire the coordinate is a flat
/// `latitude`/`longitude` pair, either of which may be missing, null, or a
/// decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AgencyRecord", into = "AgencyRecord")]
pub struct Agency {
    pub id: AgencyId,
    pub name: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub coordinate: Option<GeoPoint>,
}

impl Agency {
    pub fn new(id: impl Into<String>, name: &str, city: &str) -> Self {
        Self {
            id: AgencyId(id.into()),
            name: name.to_string(),
            city: city.to_string(),
            address: String::new(),
            phone: String::new(),
            coordinate: None,
        }
    }

    pub fn with_coordinate(mut self, coordinate: GeoPoint) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    /// Stored coordinate, if present and usable for distance computation
    pub fn usable_coordinate(&self) -> Option<GeoPoint> {
        self.coordinate.filter(GeoPoint::is_finite)
    }
}

#[derive(Serialize, Deserialize)]
struct AgencyRecord {
    id: AgencyId,
    #[serde(rename = "nom", alias = "name")]
    name: String,
    #[serde(rename = "ville", alias = "city", default)]
    city: String,
    #[serde(rename = "adresse", alias = "address", default)]
    address: String,
    #[serde(rename = "telephone", alias = "phone", default)]
    phone: String,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    latitude: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    longitude: Option<f64>,
}

impl From<AgencyRecord> for Agency {
    fn from(r: AgencyRecord) -> Self {
        let coordinate = match (r.latitude, r.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        Agency {
            id: r.id,
            name: r.name,
            city: r.city,
            address: r.address,
            phone: r.phone,
            coordinate,
        }
    }
}

impl From<Agency> for AgencyRecord {
    fn from(a: Agency) -> Self {
        AgencyRecord {
            id: a.id,
            name: a.name,
            city: a.city,
            address: a.address,
            phone: a.phone,
            latitude: a.coordinate.map(|c| c.latitude),
            longitude: a.coordinate.map(|c| c.longitude),
        }
    }
}

/// Accepts `36.8`, `"36.8"`, `""` and `null`.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    Ok(
        match Option::<NumOrStr>::deserialize(deserializer)? {
            Some(NumOrStr::Num(n)) => Some(n),
            Some(NumOrStr::Str(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        },
    )
}

/// An agency annotated with its resolved coordinate and distance to the
/// reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAgency {
    #[serde(flatten)]
    pub agency: Agency,
    pub coordinate: GeoPoint,
    /// Kilometres, one decimal. `None` when the distance cannot be computed.
    pub distance_km: Option<f64>,
}
