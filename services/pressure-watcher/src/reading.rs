//! Reading and upload response types shared by the service, dashboard and harness

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Name of the collection readings are stored in
pub const READINGS_COLLECTION: &str = "readings";

/// An observation instant as found in a stored document.
///
/// Accepts epoch milliseconds (integer or fractional) or an ISO-8601 string.
/// Any other JSON value still deserializes and renders as `Invalid Date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Largest epoch offset, in milliseconds, a date may have
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

impl Timestamp {
    pub fn now() -> Self {
        Timestamp::Text(Utc::now().to_rfc3339())
    }

    /// Resolve to an instant, `None` when the value is not a valid date
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms),
            // Fractions are dropped toward zero
            Timestamp::FractionalMillis(ms) if ms.is_finite() && ms.abs() <= MAX_EPOCH_MILLIS => {
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            Timestamp::FractionalMillis(_) | Timestamp::Other(_) => None,
            Timestamp::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Some(dt.with_timezone(&Utc));
                }
                // Offset-less ISO strings are taken as UTC
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }
        }
    }
}

/// Numeric field that tolerates values of the wrong type, reading them as absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_f64))
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Text(dt.to_rfc3339())
    }
}

/// One gauge observation as stored in the `readings` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Base64-encoded JPEG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Reading {
    pub fn new(pressure: f64, timestamp: Timestamp) -> Self {
        Self {
            id: None,
            pressure: Some(pressure),
            timestamp: Some(timestamp),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Instant used for newest-first ordering
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(Timestamp::to_datetime)
    }
}

/// JSON body answered by `POST /upload-image`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
