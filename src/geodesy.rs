use std::fmt;
use std::str::FromStr;

use geo::{HaversineDistance, Point};

use crate::models::Coordinate;

/// How the vertical component takes part in a radius search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltitudeMode {
    /// Surface great-circle distance only.
    #[default]
    Ignored,
    /// Straight-line combination of surface distance and altitude
    /// difference, when the search supplied an altitude.
    Included,
}

impl FromStr for AltitudeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<AltitudeMode, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignored" => Ok(AltitudeMode::Ignored),
            "included" => Ok(AltitudeMode::Included),
            other => Err(format!("unknown altitude mode {:?}", other)),
        }
    }
}

impl fmt::Display for AltitudeMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AltitudeMode::Ignored => write!(f, "ignored"),
            AltitudeMode::Included => write!(f, "included"),
        }
    }
}

/// Great-circle distance in metres between two lon/lat positions.
pub fn surface_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    Point::new(lon1, lat1).haversine_distance(&Point::new(lon2, lat2))
}

pub fn distance(
    start: &Coordinate,
    lon: f64,
    lat: f64,
    altitude: Option<f64>,
    mode: AltitudeMode,
) -> f64 {
    let surface = surface_distance(start.x, start.y, lon, lat);
    match (mode, altitude) {
        (AltitudeMode::Included, Some(alt)) => surface.hypot(start.z - alt),
        _ => surface,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_distance_of_small_offset() {
        // Roughly 5.5 m between these two positions in the Alps.
        let d = surface_distance(10.275514, 47.514749, 10.2755, 47.5147);
        assert!(d > 5.0 && d < 6.0, "distance was {}", d);
    }

    #[test]
    fn altitude_only_counts_when_included_and_supplied() {
        let start = Coordinate::new(10.0, 47.0, 1000.0);

        assert_eq!(distance(&start, 10.0, 47.0, Some(0.0), AltitudeMode::Ignored), 0.0);
        assert_eq!(distance(&start, 10.0, 47.0, None, AltitudeMode::Included), 0.0);
        assert_eq!(distance(&start, 10.0, 47.0, Some(0.0), AltitudeMode::Included), 1000.0);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("Included".parse::<AltitudeMode>(), Ok(AltitudeMode::Included));
        assert_eq!(" ignored ".parse::<AltitudeMode>(), Ok(AltitudeMode::Ignored));
        assert!("sideways".parse::<AltitudeMode>().is_err());
        assert_eq!(AltitudeMode::default().to_string(), "ignored");
    }
}
