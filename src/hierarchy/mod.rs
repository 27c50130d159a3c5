mod aggregator;
mod rollup;
mod tree;

pub use aggregator::HierarchyAggregator;
pub use rollup::HousingRollup;
pub use tree::{Districts, Hierarchy, Municipalities, Provinces};
