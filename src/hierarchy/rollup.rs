use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Region name → total housing units over every parsed cartography record, drawn or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HousingRollup {
    totals: BTreeMap<String, u64>,
}

impl HousingRollup {
    pub fn accumulate(&mut self, region: &str, count: u32) {
        match self.totals.get_mut(region) {
            Some(total) => *total += u64::from(count),
            None => { self.totals.insert(region.to_string(), u64::from(count)); }
        }
    }

    pub fn get(&self, region: &str) -> Option<u64> { self.totals.get(region).copied() }

    pub fn totals(&self) -> &BTreeMap<String, u64> { &self.totals }

    /// Housing units over all regions.
    pub fn total(&self) -> u64 { self.totals.values().sum() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_per_region() {
        let mut rollup = HousingRollup::default();
        rollup.accumulate("R1", 10);
        rollup.accumulate("R2", 5);
        rollup.accumulate("R1", 20);
        rollup.accumulate("", 0);
        assert_eq!(rollup.get("R1"), Some(30));
        assert_eq!(rollup.get("R2"), Some(5));
        assert_eq!(rollup.get(""), Some(0));
        assert_eq!(rollup.get("R3"), None);
        assert_eq!(rollup.total(), 35);
    }

    #[test]
    fn does_not_wrap_at_u32() {
        let mut rollup = HousingRollup::default();
        rollup.accumulate("R", u32::MAX);
        rollup.accumulate("R", 1);
        assert_eq!(rollup.get("R"), Some(u64::from(u32::MAX) + 1));
    }
}
