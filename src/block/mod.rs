mod block;
mod fields;
mod resolve;

pub use block::{Block, Location};
pub use fields::{extract_fields, BlockFields};
pub(crate) use fields::parse_block_id;
pub use resolve::{BlockResolver, Resolution};
