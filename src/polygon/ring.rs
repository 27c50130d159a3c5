//! Parsing of KML coordinate rings.

use crate::error::{Axis, GeometryError};
use super::Coordinate;

/// Outcome of a ring parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRing {
    /// Parsed vertices in source order, never empty.
    pub coordinates: Vec<Coordinate>,
    /// Tokens dropped in lenient mode. Always empty in strict mode.
    pub skipped: Vec<GeometryError>,
}

/// Parse a single `lon,lat` token into a [`Coordinate`].
pub fn parse_coordinate(token: &str) -> Result<Coordinate, GeometryError> {
    let mut parts = token.split(',');
    let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeometryError::MalformedCoordinate { token: token.to_string() });
    };

    let x = parse_axis(first, Axis::First)?;
    let y = parse_axis(second, Axis::Second)?;
    Ok(Coordinate::new(y, x))
}

/// `NaN`, infinities and values overflowing `f32` are rejected; JSON has no encoding for them.
fn parse_axis(value: &str, axis: Axis) -> Result<f32, GeometryError> {
    let parsed = value.parse::<f32>()
        .map_err(|source| GeometryError::NumericParseError { axis, value: value.to_string(), source })?;
    if !parsed.is_finite() {
        return Err(GeometryError::NonFinite { axis, value: value.to_string() });
    }
    Ok(parsed)
}

/// Parse a whitespace separated ring of `lon,lat` tokens.
///
/// In strict mode the first bad token fails the whole ring. Otherwise bad tokens are collected in
/// [`ParsedRing::skipped`] and parsing continues; a ring left with no vertex is still `EmptyRing`.
pub fn parse_ring(text: &str, strict: bool) -> Result<ParsedRing, GeometryError> {
    let mut coordinates = Vec::new();
    let mut skipped = Vec::new();

    for token in text.split_whitespace() {
        match parse_coordinate(token) {
            Ok(coord) => coordinates.push(coord),
            Err(err) if strict => return Err(err),
            Err(err) => skipped.push(err),
        }
    }

    if coordinates.is_empty() {
        return Err(GeometryError::EmptyRing);
    }

    Ok(ParsedRing { coordinates, skipped })
}
