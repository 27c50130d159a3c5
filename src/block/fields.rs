//! Typed conversion of placemark data fields.

use std::num::ParseIntError;

use crate::error::FieldParseError;
use crate::kml::RawRecord;
use super::Location;

const FID: &str = "FID";
const MANZENT: &str = "MANZENT";
const REGION: &str = "REGION";
const PROVINCE: &str = "PROVINCIA";
const MUNICIPALITY: &str = "COMUNA";
const DISTRICT: &str = "NOMBRE_DISTRITO";
const HOUSING: &str = "TOTAL_VIVIENDAS";
const POPULATION: &str = "TOTAL_PERSONAS";

/// Attributes of a cartography record, before the selection check.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFields {
    pub id: u32,
    pub location: Location,
    pub housing: u32,
    pub population: u32,
    /// Counts that could not be read and were zeroed (permissive mode only).
    pub warnings: Vec<FieldParseError>,
}

/// Convert the named fields of `record`.
///
/// The block id (`FID` or `MANZENT`) is required and must be a `u32`. Unknown fields are ignored
/// and a repeated field keeps its last value. With `strict_counts` an unreadable count rejects
/// the record, otherwise it is zeroed and listed in [`BlockFields::warnings`].
pub fn extract_fields(record: &RawRecord, strict_counts: bool) -> Result<BlockFields, FieldParseError> {
    let mut id = None;
    let mut location = Location::default();
    let mut housing = 0;
    let mut population = 0;
    let mut warnings = Vec::new();

    let mut count = |field: &'static str, value: &str| -> Result<u32, FieldParseError> {
        match parse_u32(field, value) {
            Ok(n) => Ok(n),
            Err(err) if strict_counts => Err(err),
            Err(err) => {
                warnings.push(err);
                Ok(0)
            }
        }
    };

    for data in &record.fields {
        let value = data.value.as_str();
        match data.name.as_str() {
            FID => id = Some(parse_id(FID, value)?),
            MANZENT => id = Some(parse_id(MANZENT, value)?),
            REGION => location.region = value.to_string(),
            PROVINCE => location.province = value.to_string(),
            MUNICIPALITY => location.municipality = value.to_string(),
            DISTRICT => location.district = value.to_string(),
            HOUSING => housing = count(HOUSING, value)?,
            POPULATION => population = count(POPULATION, value)?,
            _ => {}
        }
    }

    let id = id.ok_or(FieldParseError::MissingIdentifier)?;
    Ok(BlockFields { id, location, housing, population, warnings })
}

fn parse_u32(field: &'static str, value: &str) -> Result<u32, FieldParseError> {
    value.trim().parse::<u32>()
        .map_err(|source| FieldParseError::InvalidInteger { field, value: value.to_string(), source })
}

fn parse_id(field: &'static str, value: &str) -> Result<u32, FieldParseError> {
    parse_block_id(value)
        .map_err(|source| FieldParseError::InvalidInteger { field, value: value.to_string(), source })
}

/// Block id as plain decimal digits, surrounding whitespace ignored.
///
/// `str::parse` accepts a leading `+`; ids never carry a sign, so it is rejected like any other
/// stray character.
pub(crate) fn parse_block_id(text: &str) -> Result<u32, ParseIntError> {
    let digits = text.trim();
    if digits.starts_with('+') {
        // A lone sign fails with the same `InvalidDigit` kind.
        return "+".parse::<u32>();
    }
    digits.parse::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kml::DataField;

    fn record(fields: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            fields: fields.iter().map(|(n, v)| DataField::new(*n, *v)).collect(),
            ring: String::new(),
        }
    }

    #[test]
    fn reads_every_known_field() {
        let r = record(&[
            ("FID", "12"),
            ("REGION", "R"),
            ("PROVINCIA", "P"),
            ("COMUNA", "C"),
            ("NOMBRE_DISTRITO", "D"),
            ("TOTAL_VIVIENDAS", "40"),
            ("TOTAL_PERSONAS", "101"),
            ("SHAPE_AREA", "0.0001"),
        ]);
        let f = extract_fields(&r, true).unwrap();
        assert_eq!(f.id, 12);
        assert_eq!(f.location, Location::new("R", "P", "C", "D"));
        assert_eq!((f.housing, f.population), (40, 101));
        assert!(f.warnings.is_empty());
    }

    #[test]
    fn manzent_is_an_identifier() {
        let f = extract_fields(&record(&[("MANZENT", "13101011001001")]), false);
        // Full MANZENT codes do not fit in 32 bits.
        assert!(matches!(f, Err(FieldParseError::InvalidInteger { field: "MANZENT", .. })));

        let f = extract_fields(&record(&[("MANZENT", "77")]), false).unwrap();
        assert_eq!(f.id, 77);
    }

    #[test]
    fn bad_identifier_rejects_record() {
        let err = extract_fields(&record(&[("FID", "1.5"), ("REGION", "R")]), false).unwrap_err();
        assert!(matches!(err, FieldParseError::InvalidInteger { field: "FID", .. }));
    }

    #[test]
    fn signed_identifier_rejects_record() {
        for id in ["+5", " +5", "-5", "+"] {
            let err = extract_fields(&record(&[("FID", id)]), false).unwrap_err();
            assert!(matches!(err, FieldParseError::InvalidInteger { field: "FID", .. }), "{id}");
        }
        assert_eq!(extract_fields(&record(&[("FID", " 5 ")]), false).unwrap().id, 5);
    }

    #[test]
    fn missing_identifier_rejects_record() {
        let err = extract_fields(&record(&[("REGION", "R")]), false).unwrap_err();
        assert_eq!(err, FieldParseError::MissingIdentifier);
    }

    #[test]
    fn permissive_counts_are_zeroed() {
        let r = record(&[("FID", "1"), ("TOTAL_VIVIENDAS", "n/a"), ("TOTAL_PERSONAS", "-3")]);
        let f = extract_fields(&r, false).unwrap();
        assert_eq!((f.housing, f.population), (0, 0));
        assert_eq!(f.warnings.len(), 2);
        assert!(matches!(f.warnings[0], FieldParseError::InvalidInteger { field: "TOTAL_VIVIENDAS", .. }));
    }

    #[test]
    fn strict_counts_reject_record() {
        let r = record(&[("FID", "1"), ("TOTAL_PERSONAS", "")]);
        let err = extract_fields(&r, true).unwrap_err();
        assert!(matches!(err, FieldParseError::InvalidInteger { field: "TOTAL_PERSONAS", .. }));
    }

    #[test]
    fn missing_fields_default_to_empty_and_zero() {
        let f = extract_fields(&record(&[("FID", "3")]), true).unwrap();
        assert_eq!(f.location, Location::default());
        assert_eq!((f.housing, f.population), (0, 0));
    }
}
