//! Conversion between the wire representation and the tour aggregate.

use chrono::Utc;

use crate::error::{Result, TourError};
use crate::models::{Coordinate, TimestampedPoint, Tour};
use crate::representation::{PointRepresentation, TourRepresentation};
use crate::repository::ReferenceLookup;

/// Resolves creator and sport and builds the tour. Points keep the input
/// order; the start point is the earliest of them.
pub fn to_entity<L>(representation: &TourRepresentation, lookup: &L) -> Result<Tour>
where
    L: ReferenceLookup + ?Sized,
{
    let user = lookup
        .find_user(&representation.creator)?
        .ok_or_else(|| TourError::user_not_found(&representation.creator))?;
    let sport = lookup
        .find_sport(&representation.sport)?
        .ok_or_else(|| TourError::sport_not_found(&representation.sport))?;

    let points = representation
        .geometry
        .iter()
        .map(|p| TimestampedPoint::new(p.time.with_timezone(&Utc), Coordinate::new(p.x, p.y, p.z)))
        .collect();

    Tour::new(user, sport, points)
}

pub fn to_representation(tour: &Tour) -> TourRepresentation {
    let geometry = tour
        .points_by_time()
        .into_iter()
        .map(|point| PointRepresentation {
            time: point.time.fixed_offset(),
            x: point.coordinate.x,
            y: point.coordinate.y,
            z: point.coordinate.z,
        })
        .collect();

    TourRepresentation {
        creator: tour.user().username.clone(),
        sport: tour.sport().name.clone(),
        geometry,
    }
}

pub fn many_to_representation(tours: &[Tour]) -> Vec<TourRepresentation> {
    tours.iter().map(to_representation).collect()
}
