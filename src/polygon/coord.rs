use serde::{Deserialize, Serialize};

/// A polygon vertex stored as (latitude, longitude).
///
/// Source rings are written as `lon,lat`; the order is swapped on parse and kept swapped in the
/// exported document, where each vertex is a `[lat, lon]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Coordinate {
    pub lat: f32,
    pub lon: f32,
}

impl Coordinate {
    pub fn new(lat: f32, lon: f32) -> Self { Self { lat, lon } }
}

impl From<[f32; 2]> for Coordinate {
    fn from([lat, lon]: [f32; 2]) -> Self { Self { lat, lon } }
}

impl From<Coordinate> for [f32; 2] {
    fn from(c: Coordinate) -> Self { [c.lat, c.lon] }
}
