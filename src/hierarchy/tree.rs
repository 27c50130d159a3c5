//! Region → province → municipality → district → blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::{Block, Location};

/// District name → blocks, in insertion order.
pub type Districts = BTreeMap<String, Vec<Block>>;
/// Municipality name → districts.
pub type Municipalities = BTreeMap<String, Districts>;
/// Province name → municipalities.
pub type Provinces = BTreeMap<String, Municipalities>;

/// Nested administrative tree of drawn blocks.
///
/// Levels are created the first time a name is seen and never removed. Maps are ordered so the
/// exported document is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hierarchy {
    regions: BTreeMap<String, Provinces>,
}

impl Hierarchy {
    pub fn new() -> Self { Self::default() }

    /// Append `block` to the district at `location`, creating missing levels.
    pub fn insert_path(&mut self, location: &Location, block: Block) {
        self.regions
            .entry(location.region.clone()).or_default()
            .entry(location.province.clone()).or_default()
            .entry(location.municipality.clone()).or_default()
            .entry(location.district.clone()).or_default()
            .push(block);
    }

    /// Append `block` under its own location.
    pub fn insert(&mut self, block: Block) {
        let location = block.location().clone();
        self.insert_path(&location, block);
    }

    pub fn regions(&self) -> &BTreeMap<String, Provinces> { &self.regions }

    /// Blocks of one district, if that path exists.
    pub fn district(&self, location: &Location) -> Option<&[Block]> {
        self.regions.get(&location.region)?
            .get(&location.province)?
            .get(&location.municipality)?
            .get(&location.district)
            .map(Vec::as_slice)
    }

    /// Every block with the path it is filed under.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &Block)> + '_ {
        self.regions.iter().flat_map(|(region, provinces)| {
            provinces.iter().flat_map(move |(province, municipalities)| {
                municipalities.iter().flat_map(move |(municipality, districts)| {
                    districts.iter().flat_map(move |(district, blocks)| {
                        blocks.iter().map(move |block| {
                            (Location::new(region.as_str(), province.as_str(), municipality.as_str(), district.as_str()), block)
                        })
                    })
                })
            })
        })
    }

    /// Number of blocks in the tree.
    pub fn len(&self) -> usize {
        self.regions.values()
            .flat_map(|provinces| provinces.values())
            .flat_map(|municipalities| municipalities.values())
            .flat_map(|districts| districts.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool { self.regions.is_empty() }
}
