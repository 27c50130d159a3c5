/// Column layout of the selection CSV.
///
/// The canonical layout has two columns with the block id at index 1 (draw number, block id).
/// Older draws were published as a single column of bare ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLayout {
    /// Exact number of columns a data row must have.
    pub columns: usize,
    /// Index of the column holding the block id.
    pub id_column: usize,
}

impl SelectionLayout {
    /// Two columns, block id in the second one.
    pub const TWO_COLUMN: Self = Self { columns: 2, id_column: 1 };

    /// One column of bare block ids.
    pub const SINGLE_COLUMN: Self = Self { columns: 1, id_column: 0 };
}

impl Default for SelectionLayout {
    fn default() -> Self { Self::TWO_COLUMN }
}
