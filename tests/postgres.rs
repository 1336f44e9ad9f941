//! Runs against a PostGIS database named by `TOURS_TEST_DATABASE_URL`; the
//! tests pass trivially when it is not set.

mod common;

use std::env;
use std::sync::Arc;

use tourstore::geodesy::AltitudeMode;
use tourstore::repository::postgres::create_pool;
use tourstore::repository::{PgTourRepository, RadiusQuery, TourRepository};
use tourstore::schema::{create_db, empty_db};
use tourstore::{establish_connection, TourError, TourService};

use common::zoltan;

fn database() -> Option<TourService<PgTourRepository>> {
    let url = env::var("TOURS_TEST_DATABASE_URL").ok()?;
    let mut db = establish_connection(&url).unwrap();
    empty_db(&mut db).unwrap();
    create_db(&mut db).unwrap();

    let repository = PgTourRepository::new(create_pool(&url, 2).unwrap());
    repository.create_user("zoltan").unwrap();
    repository.create_sport("hike").unwrap();
    Some(TourService::new(Arc::new(repository), AltitudeMode::Ignored))
}

// Everything shares one schema, so the scenarios run in sequence.
#[test]
fn postgis_round_trip_and_search() {
    let service = match database() {
        Some(service) => service,
        None => return,
    };

    let id = service.create_tour(&zoltan()).unwrap();
    assert_eq!(service.get_tour(id).unwrap(), Some(zoltan()));

    let stored = service.repository().find_by_id(id).unwrap().unwrap();
    assert_eq!(stored.start_point().coordinate.x, 10.275514);
    assert_eq!(stored.start_point().coordinate.z, 756.587);

    let mut query = RadiusQuery {
        lat: 47.5147,
        lon: 10.2755,
        altitude: None,
        radius: 100.0,
        sport: Some("hike".to_string()),
    };
    assert_eq!(service.find_by_radius(&query).unwrap().len(), 1);
    query.radius = 1.0;
    assert!(service.find_by_radius(&query).unwrap().is_empty());

    let repository = service.repository();
    query.radius = 100.0;
    query.altitude = Some(5000.0);
    assert_eq!(repository.find_by_radius(&query, AltitudeMode::Ignored).unwrap().len(), 1);
    assert!(repository.find_by_radius(&query, AltitudeMode::Included).unwrap().is_empty());

    let mut curling = zoltan();
    curling.sport = "curling".to_string();
    let err = service.create_tour(&curling).unwrap_err();
    assert!(matches!(err, TourError::ReferenceNotFound { .. }));
    assert_eq!(service.find_by_username("zoltan").unwrap().len(), 1);
}
