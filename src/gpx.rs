use elementtree::Element;

use std::fs::File;
use std::io;
use std::io::prelude::*;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::representation::{timestamp, PointRepresentation, TourRepresentation};

const NS: &str = "http://www.topografix.com/GPX/1/1";

#[derive(Debug, Error)]
pub enum GpxError {
    #[error("could not read GPX file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid GPX document: {0}")]
    Xml(#[from] elementtree::Error),

    #[error("GPX document has no <{0}> element")]
    MissingElement(&'static str),

    #[error("track point {index}: {reason}")]
    BadPoint { index: usize, reason: String },
}

pub fn read_whole_file(filename: &str) -> Result<String, GpxError> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Reads every track point of every segment of the first track. Elevation
/// defaults to 0 when missing; a missing time is an error.
pub fn parse_gpx(gpx_data: &str) -> Result<Vec<PointRepresentation>, GpxError> {
    let gpx = Element::from_reader(&mut gpx_data.as_bytes())?;
    let trk = gpx.find((NS, "trk")).ok_or(GpxError::MissingElement("trk"))?;

    let mut points = Vec::new();
    for trkseg in trk.find_all((NS, "trkseg")) {
        for trkpt in trkseg.find_all((NS, "trkpt")) {
            let index = points.len();
            let bad = |reason: String| GpxError::BadPoint { index, reason };

            let lat = number(trkpt.get_attr("lat"), "lat").map_err(bad)?;
            let lon = number(trkpt.get_attr("lon"), "lon").map_err(bad)?;
            let ele = match trkpt.find((NS, "ele")) {
                Some(ele) => number(Some(ele.text()), "ele").map_err(bad)?,
                None => 0.0,
            };
            let time = match trkpt.find((NS, "time")) {
                Some(time) => parse_time(time.text()).map_err(bad)?,
                None => return Err(bad("missing <time>".to_string())),
            };

            points.push(PointRepresentation {
                time,
                x: lon,
                y: lat,
                z: ele,
            });
        }
    }

    if points.is_empty() {
        return Err(GpxError::MissingElement("trkpt"));
    }
    Ok(points)
}

pub fn to_representation(creator: &str, sport: &str, gpx_data: &str) -> Result<TourRepresentation, GpxError> {
    Ok(TourRepresentation {
        creator: creator.to_string(),
        sport: sport.to_string(),
        geometry: parse_gpx(gpx_data)?,
    })
}

fn number(value: Option<&str>, name: &str) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("missing {}", name))?;
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {} {:?}", name, value))
}

fn parse_time(value: &str) -> Result<DateTime<FixedOffset>, String> {
    timestamp::parse(value.trim()).map_err(|err| format!("invalid time {:?}: {}", value, err))
}
