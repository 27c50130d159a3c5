mod index;
mod layout;

pub use index::SelectionIndex;
pub use layout::SelectionLayout;
