use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geolocation attached to a visit.
///
/// Every field is optional and omitted from JSON when absent, so a visit whose
/// IP could not be located serialises its location as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO code of the first subdivision (state, province).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// IANA time zone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// `[latitude, longitude]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ll: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metro: Option<u16>,
    /// Accuracy radius in kilometres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eu: Option<bool>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A visit as handed to the store by the `/track` route.
///
/// `timestamp` is left `None` by callers that want the store to stamp the
/// record at write time.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub ip: String,
    pub location: Location,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A persisted visit. Records are written once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(rename = "_id")]
    pub id: String,
    pub ip: String,
    pub location: Location,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub timestamp: DateTime<Utc>,
}
