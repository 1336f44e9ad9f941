//! Wire shape of a tour as exchanged with HTTP clients.
//!
//! ```json
//! {
//!   "creator": "zoltan",
//!   "sport": "hike",
//!   "geometry": [
//!     { "time": "2009-07-10T14:56:10+02:00", "x": 10.275514, "y": 47.514749, "z": 756.587 }
//!   ]
//! }
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TourError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourRepresentation {
    pub creator: String,
    pub sport: String,
    pub geometry: Vec<PointRepresentation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRepresentation {
    #[serde(with = "timestamp")]
    pub time: DateTime<FixedOffset>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TourRepresentation {
    /// Reads a creation payload. A JSON array is accepted as long as it is
    /// not empty; its first element is used.
    pub fn from_json(json: Value) -> Result<TourRepresentation> {
        let json = match json {
            Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| TourError::MalformedInput("Empty JSON array".to_string()))?,
            other => other,
        };

        let tour: TourRepresentation = serde_json::from_value(json)
            .map_err(|err| TourError::MalformedInput(err.to_string()))?;

        if tour.geometry.is_empty() {
            return Err(TourError::MalformedInput(
                "Tour geometry must contain at least one point".to_string(),
            ));
        }

        Ok(tour)
    }

    pub fn from_slice(body: &[u8]) -> Result<TourRepresentation> {
        let json: Value =
            serde_json::from_slice(body).map_err(|err| TourError::MalformedInput(err.to_string()))?;
        TourRepresentation::from_json(json)
    }
}

/// Timestamps go out as RFC 3339 and come in as either RFC 3339 or
/// `yyyy-MM-dd HH:mm:ss Z`.
pub mod timestamp {
    use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

    pub fn parse(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).or_else(|_| DateTime::parse_from_str(value, LEGACY_FORMAT))
    }

    pub fn format(time: &DateTime<FixedOffset>) -> String {
        time.with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    pub fn serialize<S>(time: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(|err| de::Error::custom(format!("invalid time {:?}: {}", value, err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zoltan() -> Value {
        json!({
            "creator": "zoltan",
            "sport": "hike",
            "geometry": [
                { "time": "2009-07-10 14:56:10 +0200", "x": 10.275514, "y": 47.514749, "z": 756.587 },
                { "time": "2009-07-10T14:56:19+02:00", "x": 10.275563, "y": 47.514797, "z": 757.417 }
            ]
        })
    }

    #[test]
    fn reads_both_time_formats() {
        let tour = TourRepresentation::from_json(zoltan()).unwrap();
        assert_eq!(tour.creator, "zoltan");
        assert_eq!(tour.geometry.len(), 2);

        let first = timestamp::parse("2009-07-10T12:56:10Z").unwrap();
        assert_eq!(tour.geometry[0].time, first);
        let delta = tour.geometry[1].time - tour.geometry[0].time;
        assert_eq!(delta.num_seconds(), 9);
    }

    #[test]
    fn writes_utc_rfc3339() {
        let tour = TourRepresentation::from_json(zoltan()).unwrap();
        let json = serde_json::to_value(&tour).unwrap();
        assert_eq!(json["geometry"][0]["time"], "2009-07-10T12:56:10+00:00");
        assert_eq!(json["geometry"][1]["z"], 757.417);
    }

    #[test]
    fn takes_first_element_of_array() {
        let tour = TourRepresentation::from_json(json!([zoltan(), {"creator": "x"}])).unwrap();
        assert_eq!(tour.sport, "hike");
    }

    #[test]
    fn rejects_empty_array() {
        let err = TourRepresentation::from_json(json!([])).unwrap_err();
        assert_eq!(err.to_string(), "Empty JSON array");
    }

    #[test]
    fn rejects_missing_fields_and_empty_geometry() {
        let err = TourRepresentation::from_json(json!({"creator": "zoltan", "geometry": []})).unwrap_err();
        assert!(err.to_string().contains("sport"));

        let err = TourRepresentation::from_json(json!({"creator": "zoltan", "sport": "hike", "geometry": []}))
            .unwrap_err();
        assert!(matches!(err, TourError::MalformedInput(_)));
    }

    #[test]
    fn rejects_bad_time() {
        let mut json = zoltan();
        json["geometry"][0]["time"] = json!("yesterday");
        let err = TourRepresentation::from_json(json).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn ignores_unknown_fields() {
        let mut json = zoltan();
        json["comment"] = json!("nice weather");
        assert!(TourRepresentation::from_json(json).is_ok());
    }

    #[test]
    fn from_slice_reports_syntax_errors() {
        let err = TourRepresentation::from_slice(b"{ not json").unwrap_err();
        assert!(matches!(err, TourError::MalformedInput(_)));
    }
}
