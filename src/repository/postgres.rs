//! PostGIS-backed tour store.

use std::collections::HashMap;

use postgis::ewkb;
use postgres::error::SqlState;
use postgres::types::ToSql;
use postgres::{NoTls, Row};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use tracing::error;

use crate::error::{Result, TourError};
use crate::geodesy::AltitudeMode;
use crate::models::{Coordinate, Sport, TimestampedPoint, Tour, TourId, User};
use crate::schema::{SPORT_FK, SRID, USER_FK};

use super::{RadiusQuery, ReferenceLookup, TourRepository};

pub type PgPool = Pool<PostgresConnectionManager<NoTls>>;

const TOUR_SELECT: &str = "SELECT
        tours.id,
        tours.start_point_id,
        users.id AS user_id,
        users.username,
        sports.id AS sport_id,
        sports.name AS sport_name
    FROM tours
    JOIN users ON users.id = tours.user_id
    JOIN sports ON sports.id = tours.sport_id";

const POINTS_SELECT: &str = "SELECT id, tour_id, ts, geom
    FROM points
    WHERE tour_id = ANY($1)
    ORDER BY tour_id, ts, id";

pub fn create_pool(database_url: &str, max_size: u32) -> Result<PgPool> {
    let config: postgres::Config = database_url.parse()?;
    let manager = PostgresConnectionManager::new(config, NoTls);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

#[derive(Clone)]
pub struct PgTourRepository {
    pool: PgPool,
}

impl PgTourRepository {
    pub fn new(pool: PgPool) -> PgTourRepository {
        PgTourRepository { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the existing user when the name is already taken.
    pub fn create_user(&self, username: &str) -> Result<User> {
        let mut db = self.pool.get()?;
        db.execute(
            "INSERT INTO users (username) VALUES ($1) ON CONFLICT DO NOTHING",
            &[&username],
        )?;
        drop(db);
        self.find_user(username)?
            .ok_or_else(|| TourError::user_not_found(username))
    }

    /// Returns the existing sport when the name is already taken.
    pub fn create_sport(&self, name: &str) -> Result<Sport> {
        let mut db = self.pool.get()?;
        db.execute(
            "INSERT INTO sports (name) VALUES ($1) ON CONFLICT DO NOTHING",
            &[&name],
        )?;
        drop(db);
        self.find_sport(name)?
            .ok_or_else(|| TourError::sport_not_found(name))
    }

    fn load(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Tour>> {
        let mut db = self.pool.get()?;
        let tour_rows = db.query(sql, params)?;
        if tour_rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids = tour_rows
            .iter()
            .map(|row| row.try_get::<_, i32>("id"))
            .collect::<std::result::Result<Vec<i32>, _>>()?;

        let mut points: HashMap<i32, Vec<(i32, TimestampedPoint)>> = HashMap::new();
        for row in db.query(POINTS_SELECT, &[&ids])? {
            let tour_id: i32 = row.try_get("tour_id")?;
            let point_id: i32 = row.try_get("id")?;
            points
                .entry(tour_id)
                .or_default()
                .push((point_id, point_from_row(&row)?));
        }

        tour_rows
            .iter()
            .map(|row| -> Result<Tour> {
                let id: i32 = row.try_get("id")?;
                let start_id: Option<i32> = row.try_get("start_point_id")?;
                let owned = points.remove(&id).unwrap_or_default();
                let start = owned
                    .iter()
                    .find(|(point_id, _)| Some(*point_id) == start_id)
                    .map(|(_, point)| *point);
                let user = User {
                    id: row.try_get("user_id")?,
                    username: row.try_get("username")?,
                };
                let sport = Sport {
                    id: row.try_get("sport_id")?,
                    name: row.try_get("sport_name")?,
                };
                Tour::restore(id, user, sport, owned.into_iter().map(|(_, p)| p).collect(), start)
            })
            .collect()
    }
}

fn point_from_row(row: &Row) -> Result<TimestampedPoint> {
    let geom: ewkb::PointZ = row.try_get("geom")?;
    Ok(TimestampedPoint::new(
        row.try_get("ts")?,
        Coordinate::new(geom.x, geom.y, geom.z),
    ))
}

fn to_geometry(coordinate: &Coordinate) -> ewkb::PointZ {
    ewkb::PointZ {
        x: coordinate.x,
        y: coordinate.y,
        z: coordinate.z,
        srid: Some(SRID),
    }
}

/// Foreign key violations on the tour row mean the user or sport vanished
/// between lookup and insert.
fn insert_error(tour: &Tour, err: postgres::Error) -> TourError {
    if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
        let constraint = err.as_db_error().and_then(|db| db.constraint());
        match constraint {
            Some(USER_FK) => return TourError::user_not_found(&tour.user().username),
            Some(SPORT_FK) => return TourError::sport_not_found(&tour.sport().name),
            _ => (),
        }
    }
    error!("Failed to store tour: {}", err);
    TourError::from(err)
}

/// Builds the start point search. The distance is the sphere distance
/// between start point and `$1`, optionally combined with the altitude
/// difference; `$2` is the radius and `$3` the optional sport name.
fn radius_sql(altitude_included: bool, sport_filtered: bool) -> String {
    let distance = if altitude_included {
        "sqrt(power(ST_DistanceSphere(start.geom, $1), 2) + power(ST_Z(start.geom) - ST_Z($1), 2))"
    } else {
        "ST_DistanceSphere(start.geom, $1)"
    };
    let sport = if sport_filtered {
        " AND sports.name = $3"
    } else {
        ""
    };
    format!(
        "{} JOIN points start ON start.id = tours.start_point_id WHERE {} < $2{} ORDER BY tours.id",
        TOUR_SELECT, distance, sport
    )
}

impl ReferenceLookup for PgTourRepository {
    fn find_user(&self, username: &str) -> Result<Option<User>> {
        let mut db = self.pool.get()?;
        let row = db.query_opt(
            "SELECT id, username FROM users WHERE lower(username) = lower($1)",
            &[&username],
        )?;
        match row {
            Some(row) => Ok(Some(User {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
            })),
            None => Ok(None),
        }
    }

    fn find_sport(&self, name: &str) -> Result<Option<Sport>> {
        let mut db = self.pool.get()?;
        let row = db.query_opt(
            "SELECT id, name FROM sports WHERE lower(name) = lower($1)",
            &[&name],
        )?;
        match row {
            Some(row) => Ok(Some(Sport {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })),
            None => Ok(None),
        }
    }
}

impl TourRepository for PgTourRepository {
    fn create(&self, tour: &Tour) -> Result<TourId> {
        let mut db = self.pool.get()?;
        let mut tx = db.transaction()?;

        let row = tx
            .query_one(
                "INSERT INTO tours (user_id, sport_id) VALUES ($1, $2) RETURNING id",
                &[&tour.user().id, &tour.sport().id],
            )
            .map_err(|err| insert_error(tour, err))?;
        let id: i32 = row.try_get(0)?;

        let mut start_point_id: Option<i32> = None;
        for (i, point) in tour.points().iter().enumerate() {
            let geom = to_geometry(&point.coordinate);
            let row = tx.query_one(
                "INSERT INTO points (tour_id, ts, geom) VALUES ($1, $2, $3) RETURNING id",
                &[&id, &point.time, &geom],
            )?;
            if i == tour.start_index() {
                start_point_id = Some(row.try_get(0)?);
            }
        }

        tx.execute(
            "UPDATE tours SET start_point_id = $1 WHERE id = $2",
            &[&start_point_id, &id],
        )?;
        tx.commit()?;

        Ok(id)
    }

    fn find_by_id(&self, id: TourId) -> Result<Option<Tour>> {
        let sql = format!("{} WHERE tours.id = $1", TOUR_SELECT);
        Ok(self.load(&sql, &[&id])?.into_iter().next())
    }

    fn find_by_username(&self, username: &str) -> Result<Vec<Tour>> {
        let sql = format!(
            "{} WHERE lower(users.username) = lower($1) ORDER BY tours.id",
            TOUR_SELECT
        );
        self.load(&sql, &[&username])
    }

    fn find_by_sport(&self, sport: &str) -> Result<Vec<Tour>> {
        let sql = format!(
            "{} WHERE lower(sports.name) = lower($1) ORDER BY tours.id",
            TOUR_SELECT
        );
        self.load(&sql, &[&sport])
    }

    fn find_by_radius(&self, query: &RadiusQuery, mode: AltitudeMode) -> Result<Vec<Tour>> {
        let altitude_included = mode == AltitudeMode::Included && query.altitude.is_some();
        let center = to_geometry(&Coordinate::new(
            query.lon,
            query.lat,
            query.altitude.unwrap_or(0.0),
        ));
        let sql = radius_sql(altitude_included, query.sport.is_some());

        match &query.sport {
            Some(sport) => self.load(&sql, &[&center, &query.radius, sport]),
            None => self.load(&sql, &[&center, &query.radius]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_sql_variants() {
        let plain = radius_sql(false, false);
        assert!(plain.contains("ST_DistanceSphere(start.geom, $1) < $2 ORDER BY tours.id"));
        assert!(!plain.contains("$3"));

        let filtered = radius_sql(false, true);
        assert!(filtered.contains("AND sports.name = $3"));

        let vertical = radius_sql(true, false);
        assert!(vertical.contains("ST_Z(start.geom) - ST_Z($1)"));
    }
}
