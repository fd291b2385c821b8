//! Static city coordinate tables.
//!
//! Keys are normalized (lower-case, trimmed). Order matters: partial matching
//! returns the first hit in table order, so no key may contain an earlier key.

use crate::models::GeoPoint;

/// Country centre, used when a city name cannot be matched
pub const FALLBACK_POINT: GeoPoint = GeoPoint::new(34.0, 9.0);

/// Reference point used when the user's location is unavailable (Tunis)
pub const DEFAULT_REFERENCE: GeoPoint = GeoPoint::new(36.8065, 10.1815);

/// Canonical city name -> reference point, in lookup order
pub static CITY_TABLE: &[(&str, GeoPoint)] = &[
    ("tunis", GeoPoint::new(36.8065, 10.1815)),
    ("ariana", GeoPoint::new(36.8625, 10.1956)),
    ("ben arous", GeoPoint::new(36.7531, 10.2189)),
    ("manouba", GeoPoint::new(36.8101, 10.0956)),
    ("la marsa", GeoPoint::new(36.8782, 10.3247)),
    ("bizerte", GeoPoint::new(37.2744, 9.8739)),
    ("nabeul", GeoPoint::new(36.4561, 10.7376)),
    ("hammamet", GeoPoint::new(36.4000, 10.6167)),
    ("kelibia", GeoPoint::new(36.8475, 11.0939)),
    ("zaghouan", GeoPoint::new(36.4029, 10.1429)),
    ("beja", GeoPoint::new(36.7256, 9.1817)),
    ("jendouba", GeoPoint::new(36.5011, 8.7802)),
    ("le kef", GeoPoint::new(36.1822, 8.7148)),
    ("siliana", GeoPoint::new(36.0849, 9.3708)),
    ("sousse", GeoPoint::new(35.8256, 10.6084)),
    ("monastir", GeoPoint::new(35.7643, 10.8113)),
    ("mahdia", GeoPoint::new(35.5047, 11.0622)),
    ("kairouan", GeoPoint::new(35.6781, 10.0963)),
    ("kasserine", GeoPoint::new(35.1676, 8.8365)),
    ("sidi bouzid", GeoPoint::new(35.0382, 9.4849)),
    ("sfax", GeoPoint::new(34.7406, 10.7603)),
    ("gafsa", GeoPoint::new(34.4250, 8.7842)),
    ("tozeur", GeoPoint::new(33.9197, 8.1335)),
    ("kebili", GeoPoint::new(33.7044, 8.9690)),
    ("gabes", GeoPoint::new(33.8815, 10.0982)),
    ("medenine", GeoPoint::new(33.3549, 10.5055)),
    ("djerba", GeoPoint::new(33.8076, 10.8451)),
    ("zarzis", GeoPoint::new(33.5036, 11.1122)),
    ("tataouine", GeoPoint::new(32.9297, 10.4518)),
];

/// Alternate spellings and transliterations -> canonical key in [`CITY_TABLE`]
pub static CITY_VARIANTS: &[(&str, &str)] = &[
    ("bizerta", "bizerte"),
    ("binzart", "bizerte"),
    ("sfaks", "sfax"),
    ("safaqis", "sfax"),
    ("soussa", "sousse"),
    ("susa", "sousse"),
    ("gabès", "gabes"),
    ("qabis", "gabes"),
    ("béja", "beja"),
    ("bajah", "beja"),
    ("el kef", "le kef"),
    ("nabul", "nabeul"),
    ("qairouan", "kairouan"),
    ("kairwan", "kairouan"),
    ("médenine", "medenine"),
    ("mednine", "medenine"),
    ("jerba", "djerba"),
    ("houmt souk", "djerba"),
    ("kébili", "kebili"),
    ("qafsah", "gafsa"),
    ("tawzar", "tozeur"),
    ("mannouba", "manouba"),
    ("sidi bou zid", "sidi bouzid"),
    ("kasrine", "kasserine"),
    ("tatouine", "tataouine"),
    ("zaghwan", "zaghouan"),
];

/// Reference point for a canonical key
pub fn city_point(key: &str) -> Option<GeoPoint> {
    CITY_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, point)| *point)
}
