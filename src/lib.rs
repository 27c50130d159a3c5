#![doc = "drawmap: census block lottery audit documents"]
//!
//! Matches the blocks drawn in a census sampling lottery against the census cartography (KML)
//! and folds them into a region → province → municipality → district hierarchy, together with a
//! per-region housing rollup of the whole cartography.

mod beacon;
mod block;
mod config;
mod error;
mod hierarchy;
mod kml;
mod pipeline;
mod polygon;
mod report;
mod run;
mod selection;

#[doc(inline)]
pub use beacon::{parse_pulse_time, PulseBody, PulseRef, PulseResponse, DEFAULT_BEACON_URL};
#[cfg(feature = "beacon")]
#[doc(inline)]
pub use beacon::BeaconClient;

#[doc(inline)]
pub use block::{extract_fields, Block, BlockFields, BlockResolver, Location, Resolution};

#[doc(inline)]
pub use config::PipelineConfig;

#[doc(inline)]
pub use error::{Axis, FieldParseError, GeometryError, ReaderError, RecordError, SelectionError};

#[doc(inline)]
pub use hierarchy::{Districts, Hierarchy, HierarchyAggregator, HousingRollup, Municipalities, Provinces};

#[doc(inline)]
pub use kml::{open_cartography, CartographyFormat, DataField, PlacemarkReader, RawRecord, ReaderPhase, Termination};

#[doc(inline)]
pub use pipeline::{build_report, Pipeline, RunStats, Stage};

#[doc(inline)]
pub use polygon::{parse_coordinate, parse_ring, Coordinate, ParsedRing};

#[doc(inline)]
pub use report::{sha256_file, write_json, FileHash, Manifest, PendingWrite, Report, RunMetadata};

#[doc(inline)]
pub use run::{manifest_path, run, RunMode, RunOptions};

#[doc(inline)]
pub use selection::{SelectionIndex, SelectionLayout};
