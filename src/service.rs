use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::criteria::{Criteria, QueryParams};
use crate::error::Result;
use crate::geodesy::AltitudeMode;
use crate::mapper;
use crate::models::{Tour, TourId};
use crate::representation::TourRepresentation;
use crate::repository::{RadiusQuery, TourRepository};

/// The operations offered to the transport layer.
pub struct TourService<R> {
    repository: Arc<R>,
    altitude_mode: AltitudeMode,
}

impl<R> Clone for TourService<R> {
    fn clone(&self) -> Self {
        TourService {
            repository: Arc::clone(&self.repository),
            altitude_mode: self.altitude_mode,
        }
    }
}

impl<R: TourRepository> TourService<R> {
    pub fn new(repository: Arc<R>, altitude_mode: AltitudeMode) -> TourService<R> {
        TourService {
            repository,
            altitude_mode,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn create_tour(&self, representation: &TourRepresentation) -> Result<TourId> {
        let tour = mapper::to_entity(representation, self.repository.as_ref())?;
        let id = self.repository.create(&tour)?;
        info!(
            "Created tour {} for {} ({}) with {} points",
            id,
            tour.user().username,
            tour.sport().name,
            tour.points().len()
        );
        Ok(id)
    }

    pub fn get_tour(&self, id: TourId) -> Result<Option<TourRepresentation>> {
        let tour = self.repository.find_by_id(id)?;
        debug!("tour {}: found={}", id, tour.is_some());
        Ok(tour.as_ref().map(mapper::to_representation))
    }

    pub fn resolve_criteria(&self, params: &QueryParams) -> Result<Vec<TourRepresentation>> {
        let tours = match Criteria::from_params(params)? {
            Criteria::ByUsername(username) => self.find_by_username(&username)?,
            Criteria::BySport(sport) => self.find_by_sport(&sport)?,
            Criteria::ByRadius(query) => self.find_by_radius(&query)?,
        };
        Ok(mapper::many_to_representation(&tours))
    }

    pub fn find_by_username(&self, username: &str) -> Result<Vec<Tour>> {
        debug!("Fetching tours for username: {}", username);
        timed(|| self.repository.find_by_username(username))
    }

    pub fn find_by_sport(&self, sport: &str) -> Result<Vec<Tour>> {
        debug!("Fetching tours for sport: {}", sport);
        timed(|| self.repository.find_by_sport(sport))
    }

    pub fn find_by_radius(&self, query: &RadiusQuery) -> Result<Vec<Tour>> {
        debug!(
            "Fetching tours for criteria: lat={} lon={} alt={:?} radius={} sport={:?} altitude={}",
            query.lat, query.lon, query.altitude, query.radius, query.sport, self.altitude_mode
        );
        timed(|| self.repository.find_by_radius(query, self.altitude_mode))
    }
}

fn timed<F>(fetch: F) -> Result<Vec<Tour>>
where
    F: FnOnce() -> Result<Vec<Tour>>,
{
    let start = Instant::now();
    let tours = fetch()?;
    debug!(
        "Fetched {} tours in {} ms.",
        tours.len(),
        start.elapsed().as_millis()
    );
    Ok(tours)
}
