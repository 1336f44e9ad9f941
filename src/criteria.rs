//! Query parameter sets understood by the tour search.
//!
//! Three sets are recognised, checked in this order:
//!
//! * `startlat`, `startlon`, `radius` and optionally `startalt` and `sport`:
//!   tours starting within `radius` metres of the given position, optionally
//!   of one sport only;
//! * `username`: tours created by that user;
//! * `sport`: tours of that sport.
//!
//! `sport` alone is a set of its own, so the position set has to be tested
//! first.

use std::collections::HashMap;

use crate::error::{Result, TourError};
use crate::repository::RadiusQuery;

pub const USERNAME: &str = "username";
pub const SPORT: &str = "sport";
pub const START_LAT: &str = "startlat";
pub const START_LON: &str = "startlon";
pub const START_ALT: &str = "startalt";
pub const RADIUS: &str = "radius";

pub const ILLEGAL_PARAMETERS: &str = "Illegal set of query parameters received.";

/// Every value received for each query key, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(HashMap<String, Vec<String>>);

impl QueryParams {
    pub fn new() -> QueryParams {
        QueryParams::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> QueryParams {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key.as_ref(), value.as_ref());
        }
        params
    }
}

impl From<HashMap<String, Vec<String>>> for QueryParams {
    fn from(map: HashMap<String, Vec<String>>) -> QueryParams {
        QueryParams(map)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    ByUsername(String),
    BySport(String),
    ByRadius(RadiusQuery),
}

impl Criteria {
    pub fn from_params(params: &QueryParams) -> Result<Criteria> {
        if [START_LAT, START_LON, RADIUS].iter().all(|key| params.contains(key)) {
            let altitude = match params.first(START_ALT) {
                Some(_) => Some(number(params, START_ALT)?),
                None => None,
            };
            return Ok(Criteria::ByRadius(RadiusQuery {
                lat: number(params, START_LAT)?,
                lon: number(params, START_LON)?,
                altitude,
                radius: number(params, RADIUS)?,
                sport: params.first(SPORT).map(str::to_string),
            }));
        }

        if let Some(username) = params.first(USERNAME) {
            return Ok(Criteria::ByUsername(username.to_string()));
        }

        if let Some(sport) = params.first(SPORT) {
            return Ok(Criteria::BySport(sport.to_string()));
        }

        Err(TourError::InvalidCriteria(ILLEGAL_PARAMETERS.to_string()))
    }
}

fn number(params: &QueryParams, key: &str) -> Result<f64> {
    let value = params
        .first(key)
        .ok_or_else(|| TourError::InvalidCriteria(format!("Missing value for {}", key)))?;
    value
        .trim()
        .parse()
        .map_err(|_| TourError::InvalidCriteria(format!("Invalid number for {}: {:?}", key, value)))
}
