use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type LocationId = String;
pub type PostingId = String;

/// Healthcare site able to host job postings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_verified: bool,
}

impl Location {
    /// WGS84 range check; NaN and infinities are rejected
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Contract type, serialized with the labels stored in the `offers` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "CDI")]
    Permanent,
    #[serde(rename = "CDD")]
    FixedTerm,
    #[serde(rename = "Stage")]
    Internship,
    #[serde(rename = "Remplacement")]
    TemporaryCover,
    #[serde(rename = "Remplacement ponctuel")]
    OneOffCover,
    #[serde(rename = "Libéral")]
    IndependentPractice,
}

/// Offer row as returned by the store, with its structure embedded
///
/// The embedded structure is optional at the type level so a broken join
/// still decodes and can be reported by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: PostingId,
    pub title: String,
    pub specialty: String,
    pub contract_type: ContractType,
    #[serde(default)]
    pub is_full_time: bool,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "structure", default)]
    pub location: Option<Location>,
}

impl OfferRecord {
    /// Split the row into its posting and embedded location
    pub fn into_parts(self) -> (Posting, Option<Location>) {
        let location_id = self
            .location
            .as_ref()
            .map(|l| l.id.clone())
            .unwrap_or_default();

        let posting = Posting {
            id: self.id,
            title: self.title,
            specialty: self.specialty,
            contract_type: self.contract_type,
            is_full_time: self.is_full_time,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            description: self.description.unwrap_or_default(),
            location_id,
            created_at: self.created_at,
        };

        (posting, self.location)
    }
}

/// Job opening tied to exactly one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PostingId,
    pub title: String,
    pub specialty: String,
    #[serde(rename = "contractType")]
    pub contract_type: ContractType,
    #[serde(rename = "isFullTime")]
    pub is_full_time: bool,
    #[serde(rename = "salaryMin")]
    pub salary_min: Option<i64>,
    #[serde(rename = "salaryMax")]
    pub salary_max: Option<i64>,
    pub description: String,
    #[serde(rename = "locationId")]
    pub location_id: LocationId,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Posting {
    pub fn has_inverted_compensation(&self) -> bool {
        matches!((self.salary_min, self.salary_max), (Some(min), Some(max)) if min > max)
    }
}

/// A location with its active postings, newest first
///
/// Built once per aggregation pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup {
    pub location: Location,
    pub postings: Vec<Posting>,
    /// Input position of the group's first posting
    pub rank: usize,
}

impl LocationGroup {
    pub fn first_posting(&self) -> Option<&Posting> {
        self.postings.first()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn contains(&self, posting_id: &str) -> bool {
        self.postings.iter().any(|p| p.id == posting_id)
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "minLat")]
    pub min_lat: f64,
    #[serde(rename = "maxLat")]
    pub max_lat: f64,
    #[serde(rename = "minLon")]
    pub min_lon: f64,
    #[serde(rename = "maxLon")]
    pub max_lon: f64,
}

/// Camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

/// Relative camera movement requested by a pan or zoom gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraDelta {
    #[serde(rename = "deltaLat", default)]
    pub delta_lat: f64,
    #[serde(rename = "deltaLon", default)]
    pub delta_lon: f64,
    #[serde(rename = "deltaZoom", default)]
    pub delta_zoom: f64,
}

/// Timed camera transition for the map renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraCommand {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerClass {
    Verified,
    Unverified,
}

impl From<&Location> for MarkerClass {
    fn from(location: &Location) -> Self {
        if location.is_verified {
            MarkerClass::Verified
        } else {
            MarkerClass::Unverified
        }
    }
}

/// One map marker per location group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPlacement {
    #[serde(rename = "locationId")]
    pub location_id: LocationId,
    pub latitude: f64,
    pub longitude: f64,
    pub badge: Option<String>,
    pub class: MarkerClass,
    pub hovered: bool,
    pub selected: bool,
}

/// Posting line in the list panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelPosting {
    pub id: PostingId,
    pub title: String,
    pub specialty: String,
    pub contract: String,
    #[serde(rename = "fullTime")]
    pub full_time: Option<String>,
    pub compensation: String,
    pub selected: bool,
}

/// List panel card: a location and its postings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub location: Location,
    pub postings: Vec<PanelPosting>,
    pub badge: Option<String>,
    pub highlighted: bool,
}

/// Selected posting resolved for the detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingDetail {
    pub posting: Posting,
    pub location: Location,
    pub contract: String,
    #[serde(rename = "fullTime")]
    pub full_time: Option<String>,
    pub compensation: String,
}

/// Outcome of the most recent store fetches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchStatus {
    #[serde(rename = "lastSuccess")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(rename = "lastFailure")]
    pub last_failure: Option<DateTime<Utc>>,
    #[serde(rename = "lastError")]
    pub last_error: Option<String>,
    #[serde(rename = "consecutiveFailures")]
    pub consecutive_failures: u32,
}

impl FetchStatus {
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_success = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self, at: DateTime<Utc>, error: impl Into<String>) {
        self.last_failure = Some(at);
        self.last_error = Some(error.into());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// True when the latest fetch attempt failed
    pub fn is_degraded(&self) -> bool {
        self.consecutive_failures > 0
    }
}
