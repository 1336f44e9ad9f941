#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};

use tourstore::geodesy::AltitudeMode;
use tourstore::models::TimestampedPoint;
use tourstore::repository::MemoryTourRepository;
use tourstore::representation::TourRepresentation;
use tourstore::TourService;

pub fn zoltan_json() -> Value {
    json!({
        "creator": "zoltan",
        "sport": "hike",
        "geometry": [
            { "time": "2009-07-10T14:56:10+02:00", "x": 10.275514, "y": 47.514749, "z": 756.587 },
            { "time": "2009-07-10T14:56:19+02:00", "x": 10.275563, "y": 47.514797, "z": 757.417 }
        ]
    })
}

pub fn zoltan() -> TourRepresentation {
    TourRepresentation::from_json(zoltan_json()).unwrap()
}

/// A service over an in-memory store that knows user "zoltan" and the
/// sports "hike" and "bike".
pub fn service(mode: AltitudeMode) -> TourService<MemoryTourRepository> {
    let repository = MemoryTourRepository::new();
    repository.create_user("zoltan").unwrap();
    repository.create_sport("hike").unwrap();
    repository.create_sport("bike").unwrap();
    TourService::new(Arc::new(repository), mode)
}

/// Compares point collections by time and coordinate.
pub fn assert_same_points(actual: &[TimestampedPoint], expected: &[TimestampedPoint]) {
    assert_eq!(actual.len(), expected.len(), "point counts differ");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a.time, e.time, "time of point {}", i);
        assert_eq!(a.coordinate, e.coordinate, "coordinate of point {}", i);
    }
}
