use crate::selection::SelectionLayout;

/// Tolerance settings for one run of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Reject a selected block when any token of its ring is malformed. When off, bad tokens are
    /// dropped and the rest of the ring is kept.
    pub strict_geometry: bool,
    /// Reject a record whose `TOTAL_VIVIENDAS`/`TOTAL_PERSONAS` cannot be read. When off, the
    /// count is zeroed and reported.
    pub strict_counts: bool,
    /// Column layout of the selection CSV.
    pub selection: SelectionLayout,
    /// Log progress every this many inserted blocks (0 disables).
    pub progress_every: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strict_geometry: true,
            strict_counts: false,
            selection: SelectionLayout::default(),
            progress_every: 1000,
        }
    }
}
