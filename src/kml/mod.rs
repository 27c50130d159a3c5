mod reader;
mod record;
mod source;

pub use reader::{PlacemarkReader, ReaderPhase, Termination};
pub use record::{DataField, RawRecord};
pub use source::{open_cartography, CartographyFormat};
