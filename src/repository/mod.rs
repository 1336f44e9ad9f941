use crate::error::Result;
use crate::geodesy::AltitudeMode;
use crate::models::{Sport, Tour, TourId, User};

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryTourRepository;
pub use self::postgres::PgTourRepository;

/// Case-insensitive lookup of the records a tour refers to.
pub trait ReferenceLookup {
    fn find_user(&self, username: &str) -> Result<Option<User>>;
    fn find_sport(&self, name: &str) -> Result<Option<Sport>>;
}

/// Search around a point. `altitude` stays `None` when the caller did not
/// supply one, which is not the same as supplying zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusQuery {
    pub lat: f64,
    pub lon: f64,
    pub altitude: Option<f64>,
    pub radius: f64,
    pub sport: Option<String>,
}

pub trait TourRepository: ReferenceLookup + Send + Sync {
    /// Persists the tour, its points and its start point in one transaction.
    fn create(&self, tour: &Tour) -> Result<TourId>;

    fn find_by_id(&self, id: TourId) -> Result<Option<Tour>>;

    fn find_by_username(&self, username: &str) -> Result<Vec<Tour>>;

    fn find_by_sport(&self, sport: &str) -> Result<Vec<Tour>>;

    /// Tours whose start point lies strictly within `query.radius` metres,
    /// ordered by id.
    fn find_by_radius(&self, query: &RadiusQuery, mode: AltitudeMode) -> Result<Vec<Tour>>;
}
