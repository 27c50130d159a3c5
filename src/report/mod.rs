mod manifest;
mod report;
mod write;

pub use manifest::{sha256_file, FileHash, Manifest};
pub use report::{Report, RunMetadata};
pub use write::{write_json, PendingWrite};
