mod coord;
mod ring;

pub use coord::Coordinate;
pub use ring::{parse_coordinate, parse_ring, ParsedRing};
