use ahash::AHashSet;

use crate::block::Block;
use crate::error::RecordError;
use super::{Hierarchy, HousingRollup};

/// Single owner of the hierarchy and the housing rollup while records stream in.
#[derive(Debug, Default)]
pub struct HierarchyAggregator {
    hierarchy: Hierarchy,
    rollup: HousingRollup,
    ids: AHashSet<u32>,
}

impl HierarchyAggregator {
    pub fn new() -> Self { Self::default() }

    /// File a drawn block under its location. A block id can be filed only once.
    pub fn insert(&mut self, block: Block) -> Result<(), RecordError> {
        if !self.ids.insert(block.id()) {
            return Err(RecordError::DuplicateBlock { id: block.id() });
        }
        self.hierarchy.insert(block);
        Ok(())
    }

    /// Add a record's housing units to its region. Called for every parsed record, drawn or not.
    pub fn accumulate_housing(&mut self, region: &str, count: u32) {
        self.rollup.accumulate(region, count);
    }

    pub fn contains(&self, id: u32) -> bool { self.ids.contains(&id) }

    /// Number of filed blocks.
    pub fn len(&self) -> usize { self.ids.len() }

    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    pub fn hierarchy(&self) -> &Hierarchy { &self.hierarchy }

    pub fn rollup(&self) -> &HousingRollup { &self.rollup }

    pub fn into_parts(self) -> (Hierarchy, HousingRollup) { (self.hierarchy, self.rollup) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Location;

    #[test]
    fn rejects_duplicate_ids() {
        let mut agg = HierarchyAggregator::new();
        let block = |district: &str| Block::new(7, Location::new("R", "P", "C", district), 1, 1, vec![1], vec![[1.0, 2.0].into()]);

        agg.insert(block("D1")).unwrap();
        assert_eq!(agg.insert(block("D2")), Err(RecordError::DuplicateBlock { id: 7 }));
        assert_eq!(agg.len(), 1);
        assert!(agg.contains(7));

        let (tree, _) = agg.into_parts();
        assert_eq!(tree.len(), 1);
        assert!(tree.district(&Location::new("R", "P", "C", "D2")).is_none());
    }

    #[test]
    fn rollup_is_independent_of_tree() {
        let mut agg = HierarchyAggregator::new();
        agg.accumulate_housing("R1", 10);
        agg.accumulate_housing("R1", 5);
        assert!(agg.hierarchy().is_empty());
        assert_eq!(agg.rollup().get("R1"), Some(15));
    }
}
