use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError, TourError};

pub type TourId = i32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sport {
    pub id: i32,
    pub name: String,
}

/// x/y are WGS84 longitude/latitude in degrees, z is altitude in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Coordinate {
        Coordinate { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedPoint {
    pub time: DateTime<Utc>,
    pub coordinate: Coordinate,
}

impl TimestampedPoint {
    pub fn new(time: DateTime<Utc>, coordinate: Coordinate) -> TimestampedPoint {
        TimestampedPoint { time, coordinate }
    }
}

/// A recorded activity. The start point is always the earliest point; on a
/// timestamp tie the first one in construction order wins.
#[derive(Debug, Clone)]
pub struct Tour {
    id: Option<TourId>,
    user: User,
    sport: Sport,
    points: Vec<TimestampedPoint>,
    start: usize,
}

impl Tour {
    /// Builds an unsaved tour, keeping the points in the given order.
    pub fn new(user: User, sport: Sport, points: Vec<TimestampedPoint>) -> Result<Tour> {
        let start = earliest(&points)
            .ok_or_else(|| TourError::MalformedInput("Tour has no points".to_string()))?;

        Ok(Tour {
            id: None,
            user,
            sport,
            points,
            start,
        })
    }

    /// Rebuilds a stored tour. Points are put in time order and `start`
    /// selects the persisted start point; when it does not match any
    /// point the earliest one is used.
    pub fn restore(
        id: TourId,
        user: User,
        sport: Sport,
        mut points: Vec<TimestampedPoint>,
        start: Option<TimestampedPoint>,
    ) -> Result<Tour> {
        points.sort_by_key(|p| p.time);
        let start = start
            .and_then(|s| points.iter().position(|p| *p == s))
            .or_else(|| earliest(&points))
            .ok_or(StoreError::Corrupt(id))?;

        Ok(Tour {
            id: Some(id),
            user,
            sport,
            points,
            start,
        })
    }

    pub fn with_id(mut self, id: TourId) -> Tour {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<TourId> {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn sport(&self) -> &Sport {
        &self.sport
    }

    pub fn points(&self) -> &[TimestampedPoint] {
        &self.points
    }

    pub fn start_point(&self) -> &TimestampedPoint {
        &self.points[self.start]
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    /// Points in ascending time order, ties kept in construction order.
    pub fn points_by_time(&self) -> Vec<TimestampedPoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.time);
        points
    }
}

/// Tours compare by identity and references only; points are left out.
impl PartialEq for Tour {
    fn eq(&self, other: &Tour) -> bool {
        self.id == other.id && self.user == other.user && self.sport == other.sport
    }
}

fn earliest(points: &[TimestampedPoint]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.time)
        .map(|(i, _)| i)
}
