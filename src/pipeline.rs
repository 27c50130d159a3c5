//! Record-at-a-time matching and aggregation.
//!
//! `Init → IndexBuilt → Positioned → Streaming → Exhausted → Assembled`. The selection index is
//! built once, the cartography is streamed one placemark at a time, and every drawn block that
//! survives field and geometry checks is filed into the hierarchy. Per-row and per-record
//! failures are logged and counted here; only positioning failures are returned.

use std::{collections::BTreeMap, io::{BufRead, Read}};

use ahash::AHashSet;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::block::{BlockResolver, Resolution};
use crate::config::PipelineConfig;
use crate::error::{ReaderError, RecordError, SelectionError};
use crate::hierarchy::HierarchyAggregator;
use crate::kml::{PlacemarkReader, RawRecord, Termination};
use crate::report::{Report, RunMetadata};
use crate::selection::SelectionIndex;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    IndexBuilt,
    Positioned,
    Streaming,
    Exhausted,
    Assembled,
}

/// Counters of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Successfully parsed selection rows.
    pub draws: u64,
    /// Distinct drawn block ids.
    pub drawn_blocks: u64,
    /// Selection rows skipped as malformed.
    pub rejected_rows: u64,
    /// Placemarks read from the cartography.
    pub records: u64,
    /// Records whose fields parsed (and so count towards the housing rollup).
    pub parsed_records: u64,
    pub unselected: u64,
    /// Blocks filed in the hierarchy.
    pub inserted: u64,
    pub field_errors: u64,
    /// Counts zeroed in permissive mode.
    pub zeroed_counts: u64,
    pub geometry_errors: u64,
    /// Coordinates dropped in lenient geometry mode.
    pub skipped_coordinates: u64,
    pub duplicates: u64,
    /// Drawn ids that never appeared in the cartography, ascending.
    pub missing: Vec<u32>,
    /// Set when the cartography stream ended on a decode error.
    pub truncated: Option<String>,
}

impl RunStats {
    /// Numeric counters keyed by name, for the digest manifest.
    pub fn counts(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("draws", self.draws),
            ("drawn_blocks", self.drawn_blocks),
            ("rejected_rows", self.rejected_rows),
            ("records", self.records),
            ("parsed_records", self.parsed_records),
            ("unselected", self.unselected),
            ("inserted", self.inserted),
            ("field_errors", self.field_errors),
            ("zeroed_counts", self.zeroed_counts),
            ("geometry_errors", self.geometry_errors),
            ("skipped_coordinates", self.skipped_coordinates),
            ("duplicates", self.duplicates),
            ("missing", self.missing.len() as u64),
        ])
    }
}

/// Owns the selection index and the aggregator for the duration of a run.
pub struct Pipeline {
    config: PipelineConfig,
    stage: Stage,
    index: SelectionIndex,
    aggregator: HierarchyAggregator,
    /// Drawn ids met in the cartography, whatever became of them.
    seen: AHashSet<u32>,
    stats: RunStats,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            stage: Stage::Init,
            index: SelectionIndex::default(),
            aggregator: HierarchyAggregator::new(),
            seen: AHashSet::new(),
            stats: RunStats::default(),
        }
    }

    /// Start from an already built index.
    pub fn with_index(config: PipelineConfig, index: SelectionIndex) -> Self {
        let mut pipeline = Self::new(config);
        pipeline.set_index(index);
        pipeline
    }

    pub fn stage(&self) -> Stage { self.stage }

    pub fn stats(&self) -> &RunStats { &self.stats }

    pub fn index(&self) -> &SelectionIndex { &self.index }

    pub fn aggregator(&self) -> &HierarchyAggregator { &self.aggregator }

    fn set_index(&mut self, index: SelectionIndex) {
        self.stats.draws = u64::from(index.draws());
        self.stats.drawn_blocks = index.len() as u64;
        self.index = index;
        self.stage = Stage::IndexBuilt;
    }

    /// Build the selection index from CSV. Rejected rows are logged and skipped.
    pub fn load_selection<R: Read>(&mut self, reader: R) -> Result<(), SelectionError> {
        let (index, rejected) = SelectionIndex::read(reader, self.config.selection)?;
        for err in &rejected {
            warn!(error = %err, "skipped selection row");
        }
        self.stats.rejected_rows = rejected.len() as u64;
        self.set_index(index);
        info!(draws = self.stats.draws, blocks = self.stats.drawn_blocks, rejected = self.stats.rejected_rows, "selection loaded");
        Ok(())
    }

    /// Move the reader past the document preamble.
    pub fn position<R: BufRead>(&mut self, reader: &mut PlacemarkReader<R>) -> Result<(), ReaderError> {
        reader.seek_container()?;
        self.stage = self.stage.max(Stage::Positioned);
        debug!(offset = reader.byte_offset(), "positioned at placemark container");
        Ok(())
    }

    /// Resolve one record and fold it into the aggregate.
    pub fn process(&mut self, record: &RawRecord) {
        self.stage = self.stage.max(Stage::Streaming);
        self.stats.records += 1;

        let resolver = BlockResolver::new(&self.index, &self.config);

        let fields = match resolver.extract(record) {
            Ok(fields) => fields,
            Err(err) => {
                self.stats.field_errors += 1;
                warn!(record = self.stats.records, error = %err, "rejected record");
                return;
            }
        };
        for w in &fields.warnings {
            warn!(id = fields.id, error = %w, "count zeroed");
        }
        self.stats.zeroed_counts += fields.warnings.len() as u64;
        self.stats.parsed_records += 1;

        // Housing is rolled up over the whole cartography, before unselected records drop out.
        self.aggregator.accumulate_housing(&fields.location.region, fields.housing);

        let id = fields.id;
        if self.index.contains(id) {
            self.seen.insert(id);
        }

        match resolver.select(fields, &record.ring) {
            Ok(Resolution::Unselected { .. }) => self.stats.unselected += 1,
            Ok(Resolution::Selected { block, skipped }) => {
                if !skipped.is_empty() {
                    self.stats.skipped_coordinates += skipped.len() as u64;
                    warn!(id, skipped = skipped.len(), first = %skipped[0], "dropped malformed coordinates");
                }
                match self.aggregator.insert(block) {
                    Ok(()) => {
                        self.stats.inserted += 1;
                        if self.config.progress_every > 0 && self.stats.inserted % self.config.progress_every == 0 {
                            debug!(inserted = self.stats.inserted, records = self.stats.records, "blocks processed");
                        }
                    }
                    Err(err) => {
                        self.stats.duplicates += 1;
                        warn!(id, error = %err, "rejected record");
                    }
                }
            }
            Err(err @ RecordError::Polygon { .. }) => {
                self.stats.geometry_errors += 1;
                warn!(id, error = %err, "dropped block");
            }
            Err(err) => {
                self.stats.field_errors += 1;
                warn!(id, error = %err, "rejected record");
            }
        }
    }

    /// Position the reader if needed, then consume every record it yields.
    ///
    /// Only a positioning failure is an error. A decode failure after that ends the stream and
    /// is recorded in [`RunStats::truncated`].
    pub fn stream<R: BufRead>(&mut self, reader: &mut PlacemarkReader<R>) -> Result<(), ReaderError> {
        self.position(reader)?;

        while let Some(record) = reader.next_record() {
            self.process(&record);
        }
        self.stage = Stage::Exhausted;

        match reader.take_termination() {
            Some(Termination::Truncated(err)) => {
                warn!(records = self.stats.records, error = %err, "cartography ended on a decode error, treating as end of input");
                self.stats.truncated = Some(err.to_string());
            }
            Some(Termination::EndOfDocument) | None => {
                debug!(records = self.stats.records, "cartography exhausted");
            }
        }

        let mut missing: Vec<u32> = self.index.ids().filter(|id| !self.seen.contains(id)).collect();
        missing.sort_unstable();
        if !missing.is_empty() {
            warn!(count = missing.len(), ids = ?missing, "drawn blocks not found in cartography");
        }
        self.stats.missing = missing;
        Ok(())
    }

    /// Compose the report from the aggregate.
    pub fn assemble(mut self, metadata: Option<RunMetadata>) -> (Report, RunStats) {
        self.stage = Stage::Assembled;
        let (regions, housing) = self.aggregator.into_parts();
        info!(
            records = self.stats.records,
            inserted = self.stats.inserted,
            unselected = self.stats.unselected,
            field_errors = self.stats.field_errors,
            geometry_errors = self.stats.geometry_errors,
            "report assembled"
        );
        (Report::assemble(metadata, regions, housing), self.stats)
    }
}

/// Run the whole pipeline over in-memory or already opened sources.
pub fn build_report<S: Read, C: BufRead>(
    config: PipelineConfig,
    selection: S,
    cartography: C,
    metadata: Option<RunMetadata>,
) -> Result<(Report, RunStats)> {
    let mut pipeline = Pipeline::new(config);
    pipeline.load_selection(selection).context("[pipeline] Failed to read selection")?;

    let mut reader = PlacemarkReader::new(cartography);
    pipeline.stream(&mut reader).context("[pipeline] Failed to position in cartography document")?;

    Ok(pipeline.assemble(metadata))
}
