//! Typed agency and vehicle forms with field-level validation.

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::ValidationError;

pub const MAX_TEXT_LEN: usize = 255;
pub const MIN_VEHICLE_YEAR: i32 = 1990;
pub const MAX_DAILY_PRICE: u32 = 10_000;
pub const MAX_SEATS: u8 = 9;

/// Validation failures keyed by field name, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<(&'static str, ValidationError)>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, e)| e)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|(name, _)| *name)
    }

    fn check(&mut self, field: &'static str, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.push((field, e));
        }
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, e)| format!("{field}: {e}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern"))
}

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong { max: MAX_TEXT_LEN });
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached_regex(&RE, r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$");
    if re.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// 8 to 15 digits, optional leading `+`, spaces and dashes allowed
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    if !body.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
        return Err(ValidationError::InvalidPhone);
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    if (8..=15).contains(&digits) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

pub fn validate_postal_code(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if (4..=5).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPostalCode)
    }
}

pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(ValidationError::InvalidUrl),
    }
}

/// Model year between [`MIN_VEHICLE_YEAR`] and next year
pub fn validate_year(year: i32, current_year: i32) -> Result<(), ValidationError> {
    let max = current_year + 1;
    if (MIN_VEHICLE_YEAR..=max).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::YearOutOfRange {
            min: MIN_VEHICLE_YEAR,
            max,
        })
    }
}

pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price > 0.0 && price <= MAX_DAILY_PRICE as f64 {
        Ok(())
    } else {
        Err(ValidationError::InvalidPrice {
            max: MAX_DAILY_PRICE,
        })
    }
}

pub fn validate_seats(seats: u8) -> Result<(), ValidationError> {
    if (1..=MAX_SEATS).contains(&seats) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSeats { max: MAX_SEATS })
    }
}

/// Tunisian plates (`123 TU 4567`, `45 RS 12`) or a generic alphanumeric plate
pub fn validate_registration(value: &str) -> Result<(), ValidationError> {
    static TUNISIAN: OnceLock<Regex> = OnceLock::new();
    static GENERIC: OnceLock<Regex> = OnceLock::new();
    let value = value.trim().to_uppercase();
    if cached_regex(&TUNISIAN, r"^[0-9]{1,3} ?(TU|TN|RS) ?[0-9]{1,4}$").is_match(&value)
        || cached_regex(&GENERIC, r"^[A-Z0-9-]{4,12}$").is_match(&value)
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidRegistration)
    }
}

fn optional(
    value: &Option<String>,
    check: fn(&str) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => check(v),
        _ => Ok(()),
    }
}

/// Agency create/edit form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgencyFormData {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "adresse")]
    pub address: String,
    #[serde(rename = "ville")]
    pub city: String,
    #[serde(rename = "code_postal", default)]
    pub postal_code: Option<String>,
    #[serde(rename = "pays", default)]
    pub country: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "site_web", default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AgencyFormData {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check("nom", validate_required(&self.name));
        errors.check("adresse", validate_required(&self.address));
        errors.check("ville", validate_required(&self.city));
        errors.check("code_postal", optional(&self.postal_code, validate_postal_code));
        errors.check("telephone", validate_phone(&self.phone));
        errors.check("email", optional(&self.email, validate_email));
        errors.check("site_web", optional(&self.website, validate_url));
        errors.into_result()
    }
}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ValidationError::UnknownChoice(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum!(
    /// Fuel type
    Fuel {
        Petrol => "essence",
        Diesel => "diesel",
        Electric => "electrique",
        Hybrid => "hybride",
    }
);

choice_enum!(
    Transmission {
        Manual => "manuelle",
        Automatic => "automatique",
    }
);

choice_enum!(
    /// Fleet status of a vehicle
    VehicleStatus {
        Available => "disponible",
        Rented => "loue",
        Maintenance => "maintenance",
        OutOfService => "hors_service",
    }
);

/// Vehicle create/edit form.
///
/// Choice fields stay as strings so that unknown values surface as field
/// errors instead of deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleFormData {
    #[serde(rename = "marque")]
    pub brand: String,
    #[serde(rename = "modele")]
    pub model: String,
    #[serde(rename = "annee")]
    pub year: i32,
    #[serde(rename = "carburant")]
    pub fuel: String,
    pub transmission: String,
    #[serde(rename = "nombre_places")]
    pub seats: u8,
    #[serde(rename = "prix_par_jour")]
    pub daily_price: f64,
    #[serde(rename = "statut")]
    pub status: String,
    #[serde(rename = "immatriculation")]
    pub registration: String,
    #[serde(rename = "kilometrage", default)]
    pub mileage: Option<i64>,
    #[serde(rename = "agence_id", default)]
    pub agency_id: Option<String>,
}

impl VehicleFormData {
    /// Validate against the current calendar year
    pub fn validate(&self) -> Result<(), FormErrors> {
        self.validate_for_year(chrono::Utc::now().year())
    }

    pub fn validate_for_year(&self, current_year: i32) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check("marque", validate_required(&self.brand));
        errors.check("modele", validate_required(&self.model));
        errors.check("annee", validate_year(self.year, current_year));
        errors.check("carburant", self.fuel.parse::<Fuel>().map(|_| ()));
        errors.check(
            "transmission",
            self.transmission.parse::<Transmission>().map(|_| ()),
        );
        errors.check("nombre_places", validate_seats(self.seats));
        errors.check("prix_par_jour", validate_price(self.daily_price));
        errors.check("statut", self.status.parse::<VehicleStatus>().map(|_| ()));
        errors.check("immatriculation", validate_registration(&self.registration));
        if self.mileage.is_some_and(|km| km < 0) {
            errors.check("kilometrage", Err(ValidationError::Negative));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agency_form() -> AgencyFormData {
        AgencyFormData {
            name: "VitaRenta Sousse".into(),
            address: "Avenue Habib Bourguiba".into(),
            city: "Sousse".into(),
            postal_code: Some("4000".into()),
            country: Some("Tunisie".into()),
            phone: "+216 73 123 456".into(),
            email: Some("sousse@vitarenta.tn".into()),
            website: None,
            description: None,
        }
    }

    fn vehicle_form() -> VehicleFormData {
        VehicleFormData {
            brand: "Peugeot".into(),
            model: "208".into(),
            year: 2022,
            fuel: "essence".into(),
            transmission: "manuelle".into(),
            seats: 5,
            daily_price: 95.0,
            status: "disponible".into(),
            registration: "215 TU 4821".into(),
            mileage: Some(32_000),
            agency_id: Some("7".into()),
        }
    }

    #[test]
    fn test_valid_agency_form() {
        assert_eq!(agency_form().validate(), Ok(()));
    }

    #[test]
    fn test_agency_form_collects_errors_in_field_order() {
        let form = AgencyFormData {
            name: "  ".into(),
            phone: "12ab".into(),
            email: Some("not-an-email".into()),
            website: Some("ftp://example".into()),
            ..agency_form()
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["nom", "telephone", "email", "site_web"]);
        assert_eq!(errors.get("nom"), Some(&ValidationError::Required));
        assert_eq!(errors.get("ville"), None);
    }

    #[test]
    fn test_blank_optional_fields_are_skipped() {
        let form = AgencyFormData {
            email: Some("   ".into()),
            postal_code: Some(String::new()),
            ..agency_form()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("71 234 567").is_ok());
        assert!(validate_phone("+216-71-234-567").is_ok());
        assert_eq!(validate_phone("1234"), Err(ValidationError::InvalidPhone));
        assert_eq!(validate_phone("+216 71 234 5x7"), Err(ValidationError::InvalidPhone));
    }

    #[test]
    fn test_too_long_text() {
        let long = "a".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(
            validate_required(&long),
            Err(ValidationError::TooLong { max: MAX_TEXT_LEN })
        );
    }

    #[test]
    fn test_valid_vehicle_form() {
        assert_eq!(vehicle_form().validate_for_year(2026), Ok(()));
    }

    #[test]
    fn test_vehicle_form_errors() {
        let form = VehicleFormData {
            year: 2030,
            fuel: "kerosene".into(),
            seats: 0,
            daily_price: -1.0,
            mileage: Some(-5),
            ..vehicle_form()
        };
        let errors = form.validate_for_year(2026).unwrap_err();
        assert_eq!(
            errors.get("annee"),
            Some(&ValidationError::YearOutOfRange { min: 1990, max: 2027 })
        );
        assert_eq!(
            errors.get("carburant"),
            Some(&ValidationError::UnknownChoice("kerosene".into()))
        );
        assert!(errors.get("nombre_places").is_some());
        assert!(errors.get("prix_par_jour").is_some());
        assert_eq!(errors.get("kilometrage"), Some(&ValidationError::Negative));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_registration_formats() {
        assert!(validate_registration("215 TU 4821").is_ok());
        assert!(validate_registration("12rs345").is_ok());
        assert!(validate_registration("AB-123-CD").is_ok());
        assert!(validate_registration("?!").is_err());
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!("Diesel".parse::<Fuel>(), Ok(Fuel::Diesel));
        assert_eq!(VehicleStatus::OutOfService.to_string(), "hors_service");
        assert_eq!(
            serde_json::to_string(&Transmission::Automatic).unwrap(),
            "\"automatique\""
        );
    }

    #[test]
    fn test_form_errors_display() {
        let errors = VehicleFormData {
            brand: String::new(),
            ..vehicle_form()
        }
        .validate_for_year(2026)
        .unwrap_err();
        assert_eq!(errors.to_string(), "marque: this field is required");
    }
}
