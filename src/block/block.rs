use serde::{Deserialize, Serialize};

use crate::polygon::Coordinate;

/// Administrative path of a block. Any level may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub region: String,
    pub province: String,
    pub municipality: String,
    pub district: String,
}

impl Location {
    pub fn new(
        region: impl Into<String>,
        province: impl Into<String>,
        municipality: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            province: province.into(),
            municipality: municipality.into(),
            district: district.into(),
        }
    }
}

/// A drawn census block ("manzana") with its geometry and counts.
///
/// Built once by the resolver and never mutated afterwards. The location is not exported: in the
/// report it is implied by the block's place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "i")]
    id: u32,
    /// Draw positions at which this block came out, in draw order.
    #[serde(rename = "s")]
    positions: Vec<u32>,
    #[serde(rename = "p")]
    polygon: Vec<Coordinate>,
    #[serde(rename = "v")]
    housing: u32,
    #[serde(rename = "h")]
    population: u32,
    #[serde(skip)]
    location: Location,
}

impl Block {
    pub fn new(
        id: u32,
        location: Location,
        housing: u32,
        population: u32,
        positions: Vec<u32>,
        polygon: Vec<Coordinate>,
    ) -> Self {
        Self { id, positions, polygon, housing, population, location }
    }

    pub fn id(&self) -> u32 { self.id }
    pub fn positions(&self) -> &[u32] { &self.positions }
    pub fn polygon(&self) -> &[Coordinate] { &self.polygon }
    pub fn housing(&self) -> u32 { self.housing }
    pub fn population(&self) -> u32 { self.population }
    pub fn location(&self) -> &Location { &self.location }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_short_keys_and_without_location() {
        let block = Block::new(
            5,
            Location::new("R1", "P1", "C1", "D1"),
            10,
            31,
            vec![1, 3],
            vec![Coordinate::new(-33.5, -70.25), Coordinate::new(-33.75, -70.5)],
        );
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json, serde_json::json!({
            "i": 5,
            "s": [1, 3],
            "p": [[-33.5, -70.25], [-33.75, -70.5]],
            "v": 10,
            "h": 31,
        }));

        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), 5);
        assert_eq!(back.polygon(), block.polygon());
        assert_eq!(back.location(), &Location::default());
    }
}
