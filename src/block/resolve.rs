use crate::config::PipelineConfig;
use crate::error::{FieldParseError, GeometryError, RecordError};
use crate::kml::RawRecord;
use crate::polygon::parse_ring;
use crate::selection::SelectionIndex;
use super::{extract_fields, Block, BlockFields};

/// Outcome of resolving a record against the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The block was drawn. `skipped` lists ring tokens dropped in lenient mode.
    Selected { block: Block, skipped: Vec<GeometryError> },
    /// The block was never drawn. Expected for the vast majority of records.
    Unselected { id: u32 },
}

/// Turns raw placemarks into [`Block`]s for the drawn ids.
pub struct BlockResolver<'a> {
    index: &'a SelectionIndex,
    strict_geometry: bool,
    strict_counts: bool,
}

impl<'a> BlockResolver<'a> {
    pub fn new(index: &'a SelectionIndex, config: &PipelineConfig) -> Self {
        Self {
            index,
            strict_geometry: config.strict_geometry,
            strict_counts: config.strict_counts,
        }
    }

    /// Typed field conversion, the first half of [`Self::resolve`].
    ///
    /// Split out so the caller can account for every parsed record (housing rollup) before
    /// unselected ones are dropped.
    pub fn extract(&self, record: &RawRecord) -> Result<BlockFields, FieldParseError> {
        extract_fields(record, self.strict_counts)
    }

    /// Selection check and ring parse, the second half of [`Self::resolve`].
    ///
    /// The ring is only parsed for drawn blocks.
    pub fn select(&self, fields: BlockFields, ring: &str) -> Result<Resolution, RecordError> {
        let Some(positions) = self.index.positions(fields.id) else {
            return Ok(Resolution::Unselected { id: fields.id });
        };

        let parsed = parse_ring(ring, self.strict_geometry)
            .map_err(|source| RecordError::Polygon { id: fields.id, source })?;

        let block = Block::new(
            fields.id,
            fields.location,
            fields.housing,
            fields.population,
            positions.to_vec(),
            parsed.coordinates,
        );
        Ok(Resolution::Selected { block, skipped: parsed.skipped })
    }

    /// Resolve a record in one step. Count warnings are dropped.
    pub fn resolve(&self, record: &RawRecord) -> Result<Resolution, RecordError> {
        let fields = self.extract(record)?;
        self.select(fields, &record.ring)
    }
}
