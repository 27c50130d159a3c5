//! Error taxonomy for the matching-and-aggregation pipeline.
//!
//! Every error here describes a single row, record or ring. None of them is fatal on its own:
//! the pipeline logs them, counts them and moves on. Fatal conditions (file open/create,
//! positioning inside the cartography document) surface as `anyhow` errors from [`crate::run`].

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Errors produced while reading the selection CSV.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("row {row} has {found} columns, expected {expected}")]
    MalformedRow { row: u64, expected: usize, found: usize },

    #[error("row {row}: cannot read block id {value:?} as an unsigned 32-bit integer: {source}")]
    InvalidIdentifier {
        row: u64,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("row {row}: {source}")]
    Csv {
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("io error while reading selection file: {0}")]
    Io(#[from] std::io::Error),
}

/// Which half of a coordinate token failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// First value of the token (longitude in source order).
    First,
    /// Second value of the token (latitude in source order).
    Second,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::First => f.write_str("first"),
            Axis::Second => f.write_str("second"),
        }
    }
}

/// Errors produced while parsing a coordinate ring.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("ring has no coordinates")]
    EmptyRing,

    #[error("malformed coordinate {token:?}, expected exactly two comma separated values")]
    MalformedCoordinate { token: String },

    #[error("cannot parse {axis} coordinate {value:?} as a float: {source}")]
    NumericParseError {
        axis: Axis,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("{axis} coordinate {value:?} is not a finite 32-bit float")]
    NonFinite { axis: Axis, value: String },
}

/// Errors produced while converting the named data fields of a placemark.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldParseError {
    #[error("field {field}: cannot read {value:?} as an unsigned 32-bit integer: {source}")]
    InvalidInteger {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("record carries no FID/MANZENT field")]
    MissingIdentifier,
}

/// Reasons a cartography record does not end up in the hierarchy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error(transparent)]
    Field(#[from] FieldParseError),

    #[error("polygon error in block {id}: {source}")]
    Polygon {
        id: u32,
        #[source]
        source: GeometryError,
    },

    #[error("block {id} already present in the hierarchy")]
    DuplicateBlock { id: u32 },
}

/// Errors produced by the cartography document reader.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("xml error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("no placemark container found before the end of the document")]
    ContainerNotFound,

    #[error("document ended inside a placemark")]
    UnexpectedEof,
}
