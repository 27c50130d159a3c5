//! Index from block id to the draw positions at which it was selected.

use std::io::Read;

use ahash::AHashMap;
use csv::ReaderBuilder;

use crate::block::parse_block_id;
use crate::error::SelectionError;
use super::SelectionLayout;

/// Read-only index of drawn blocks, built once from the selection CSV.
///
/// Positions are 1-based and count successfully parsed rows only, so a malformed row never
/// consumes a draw number. A block drawn several times keeps every position in row order.
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    positions: AHashMap<u32, Vec<u32>>,
    draws: u32,
}

impl SelectionIndex {
    /// Build the index from a CSV stream. The header row is skipped unconditionally.
    ///
    /// Returns the index together with the rows that were rejected. Only an I/O failure of the
    /// underlying stream aborts the read.
    pub fn read<R: Read>(reader: R, layout: SelectionLayout) -> Result<(Self, Vec<SelectionError>), SelectionError> {
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut index = Self::default();
        let mut rejected = Vec::new();

        for (offset, record) in csv.records().enumerate() {
            // 1-based data row number, header excluded.
            let row = offset as u64 + 1;
            let record = match record {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(SelectionError::Io(err.into())),
                Err(source) => {
                    rejected.push(SelectionError::Csv { row, source });
                    continue;
                }
            };

            if record.len() != layout.columns {
                rejected.push(SelectionError::MalformedRow { row, expected: layout.columns, found: record.len() });
                continue;
            }

            let value = &record[layout.id_column];
            match parse_block_id(value) {
                Ok(id) => index.push(id),
                Err(source) => rejected.push(SelectionError::InvalidIdentifier { row, value: value.to_string(), source }),
            }
        }

        Ok((index, rejected))
    }

    /// Record the next draw for `id`.
    pub fn push(&mut self, id: u32) {
        self.draws += 1;
        self.positions.entry(id).or_default().push(self.draws);
    }

    /// Draw positions of `id`, or `None` if the block was never drawn.
    pub fn positions(&self, id: u32) -> Option<&[u32]> {
        self.positions.get(&id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: u32) -> bool { self.positions.contains_key(&id) }

    /// Number of successfully parsed draws.
    pub fn draws(&self) -> u32 { self.draws }

    /// Number of distinct drawn blocks.
    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    /// Iterate over drawn block ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ { self.positions.keys().copied() }
}
