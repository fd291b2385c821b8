//! In-memory listing helpers: pagination, vehicle filtering and sorting.

use serde::{Deserialize, Serialize};

use crate::forms::{Fuel, Transmission, VehicleStatus};
use crate::models::AgencyId;

/// A vehicle as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(deserialize_with = "crate::models::agency::lenient_id")]
    pub id: String,
    #[serde(rename = "marque")]
    pub brand: String,
    #[serde(rename = "modele")]
    pub model: String,
    #[serde(rename = "annee")]
    pub year: i32,
    #[serde(rename = "carburant")]
    pub fuel: Fuel,
    pub transmission: Transmission,
    #[serde(rename = "nombre_places")]
    pub seats: u8,
    #[serde(rename = "prix_par_jour")]
    pub daily_price: f64,
    #[serde(rename = "statut")]
    pub status: VehicleStatus,
    #[serde(rename = "agence_id", default)]
    pub agency_id: Option<AgencyId>,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Cut a 1-based page out of `items`. Page 0 reads as page 1, `per_page` 0 as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page);
    let slice = items
        .get(start..)
        .map(|rest| &rest[..rest.len().min(per_page)])
        .unwrap_or(&[]);

    Page {
        items: slice.to_vec(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Conjunctive vehicle filter; `None` fields do not constrain
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleFilter {
    /// Case-insensitive match on brand or model
    pub search: Option<String>,
    pub fuel: Option<Fuel>,
    pub transmission: Option<Transmission>,
    pub status: Option<VehicleStatus>,
    pub max_daily_price: Option<f64>,
    pub min_seats: Option<u8>,
    pub agency_id: Option<AgencyId>,
}

impl VehicleFilter {
    pub fn matches(&self, v: &Vehicle) -> bool {
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !v.brand.to_lowercase().contains(&q) && !v.model.to_lowercase().contains(&q) {
                return false;
            }
        }
        self.fuel.map_or(true, |f| v.fuel == f)
            && self.transmission.map_or(true, |t| v.transmission == t)
            && self.status.map_or(true, |s| v.status == s)
            && self.max_daily_price.map_or(true, |p| v.daily_price <= p)
            && self.min_seats.map_or(true, |n| v.seats >= n)
            && self
                .agency_id
                .as_ref()
                .map_or(true, |id| v.agency_id.as_ref() == Some(id))
    }

    pub fn apply<'a>(&self, vehicles: &'a [Vehicle]) -> Vec<&'a Vehicle> {
        vehicles.iter().filter(|v| self.matches(v)).collect()
    }
}

/// Listing order. All orders are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleSort {
    #[default]
    PriceAsc,
    PriceDesc,
    Newest,
    Brand,
}

impl VehicleSort {
    pub fn sort(&self, vehicles: &mut [&Vehicle]) {
        match self {
            VehicleSort::PriceAsc => vehicles.sort_by(|a, b| a.daily_price.total_cmp(&b.daily_price)),
            VehicleSort::PriceDesc => vehicles.sort_by(|a, b| b.daily_price.total_cmp(&a.daily_price)),
            VehicleSort::Newest => vehicles.sort_by(|a, b| b.year.cmp(&a.year)),
            VehicleSort::Brand => vehicles.sort_by(|a, b| {
                a.brand
                    .to_lowercase()
                    .cmp(&b.brand.to_lowercase())
                    .then_with(|| a.model.to_lowercase().cmp(&b.model.to_lowercase()))
            }),
        }
    }
}
