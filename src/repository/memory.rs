//! A tour store held in process memory, used by tests and local demos.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, StoreError, TourError};
use crate::geodesy::{self, AltitudeMode};
use crate::models::{Sport, Tour, TourId, User};

use super::{RadiusQuery, ReferenceLookup, TourRepository};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    sports: Vec<Sport>,
    tours: BTreeMap<TourId, Tour>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryTourRepository {
    state: Mutex<State>,
}

impl MemoryTourRepository {
    pub fn new() -> MemoryTourRepository {
        MemoryTourRepository::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| TourError::from(StoreError::Poisoned))
    }

    /// Returns the existing user when the name is already taken.
    pub fn create_user(&self, username: &str) -> Result<User> {
        let mut state = self.lock()?;
        if let Some(user) = state.users.iter().find(|u| same_name(&u.username, username)) {
            return Ok(user.clone());
        }
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    /// Returns the existing sport when the name is already taken.
    pub fn create_sport(&self, name: &str) -> Result<Sport> {
        let mut state = self.lock()?;
        if let Some(sport) = state.sports.iter().find(|s| same_name(&s.name, name)) {
            return Ok(sport.clone());
        }
        let sport = Sport {
            id: state.next_id(),
            name: name.to_string(),
        };
        state.sports.push(sport.clone());
        Ok(sport)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.tours.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn select<F>(&self, mut predicate: F) -> Result<Vec<Tour>>
    where
        F: FnMut(&Tour) -> bool,
    {
        let state = self.lock()?;
        state
            .tours
            .values()
            .filter(|tour| predicate(tour))
            .map(read_back)
            .collect()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Stored tours come back with their points in time order.
fn read_back(tour: &Tour) -> Result<Tour> {
    let id = tour.id().ok_or(StoreError::Corrupt(0))?;
    Tour::restore(
        id,
        tour.user().clone(),
        tour.sport().clone(),
        tour.points().to_vec(),
        Some(*tour.start_point()),
    )
}

impl ReferenceLookup for MemoryTourRepository {
    fn find_user(&self, username: &str) -> Result<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| same_name(&u.username, username)).cloned())
    }

    fn find_sport(&self, name: &str) -> Result<Option<Sport>> {
        let state = self.lock()?;
        Ok(state.sports.iter().find(|s| same_name(&s.name, name)).cloned())
    }
}

impl TourRepository for MemoryTourRepository {
    fn create(&self, tour: &Tour) -> Result<TourId> {
        let mut state = self.lock()?;

        if !state.users.iter().any(|u| u.id == tour.user().id) {
            return Err(TourError::user_not_found(&tour.user().username));
        }
        if !state.sports.iter().any(|s| s.id == tour.sport().id) {
            return Err(TourError::sport_not_found(&tour.sport().name));
        }

        let id = state.next_id();
        state.tours.insert(id, tour.clone().with_id(id));
        Ok(id)
    }

    fn find_by_id(&self, id: TourId) -> Result<Option<Tour>> {
        let state = self.lock()?;
        state.tours.get(&id).map(read_back).transpose()
    }

    fn find_by_username(&self, username: &str) -> Result<Vec<Tour>> {
        self.select(|tour| same_name(&tour.user().username, username))
    }

    fn find_by_sport(&self, sport: &str) -> Result<Vec<Tour>> {
        self.select(|tour| same_name(&tour.sport().name, sport))
    }

    fn find_by_radius(&self, query: &RadiusQuery, mode: AltitudeMode) -> Result<Vec<Tour>> {
        self.select(|tour| {
            if let Some(sport) = &query.sport {
                if tour.sport().name != *sport {
                    return false;
                }
            }
            let start = &tour.start_point().coordinate;
            geodesy::distance(start, query.lon, query.lat, query.altitude, mode) < query.radius
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, TimestampedPoint};
    use chrono::{TimeZone, Utc};

    fn tour_at(repo: &MemoryTourRepository, user: &str, sport: &str, x: f64, y: f64) -> Tour {
        let user = repo.create_user(user).unwrap();
        let sport = repo.create_sport(sport).unwrap();
        let time = Utc.with_ymd_and_hms(2014, 1, 4, 12, 0, 0).unwrap();
        let points = vec![TimestampedPoint::new(time, Coordinate::new(x, y, 0.0))];
        Tour::new(user, sport, points).unwrap()
    }

    #[test]
    fn names_are_case_insensitive() {
        let repo = MemoryTourRepository::new();
        let user = repo.create_user("Zoltan").unwrap();
        assert_eq!(repo.create_user("zoltan").unwrap(), user);
        assert_eq!(repo.find_user("ZOLTAN").unwrap(), Some(user));
        assert_eq!(repo.find_sport("hike").unwrap(), None);
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let repo = MemoryTourRepository::new();
        let a = repo.create(&tour_at(&repo, "a", "hike", 1.0, 1.0)).unwrap();
        let b = repo.create(&tour_at(&repo, "b", "hike", 1.0, 1.0)).unwrap();
        assert!(b > a);
        assert_eq!(repo.find_by_id(a).unwrap().unwrap().id(), Some(a));
        assert_eq!(repo.find_by_id(b + 100).unwrap(), None);
    }

    #[test]
    fn create_rejects_unregistered_sport() {
        let repo = MemoryTourRepository::new();
        let user = repo.create_user("zoltan").unwrap();
        let sport = Sport { id: 999, name: "curling".to_string() };
        let time = Utc.with_ymd_and_hms(2014, 1, 4, 12, 0, 0).unwrap();
        let tour = Tour::new(user, sport, vec![TimestampedPoint::new(time, Coordinate::new(0.0, 0.0, 0.0))])
            .unwrap();

        let err = repo.create(&tour).unwrap_err();
        assert_eq!(err.to_string(), "Sport curling not found");
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn radius_filter_on_sport_is_exact() {
        let repo = MemoryTourRepository::new();
        repo.create(&tour_at(&repo, "a", "hike", 10.0, 47.0)).unwrap();
        let query = RadiusQuery {
            lat: 47.0,
            lon: 10.0,
            altitude: None,
            radius: 10.0,
            sport: Some("Hike".to_string()),
        };
        assert!(repo.find_by_radius(&query, AltitudeMode::Ignored).unwrap().is_empty());

        let query = RadiusQuery { sport: Some("hike".to_string()), ..query };
        assert_eq!(repo.find_by_radius(&query, AltitudeMode::Ignored).unwrap().len(), 1);
    }
}
