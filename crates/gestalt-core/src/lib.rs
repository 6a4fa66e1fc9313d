//! Reassembly engine for bulk_extractor feature files.
//!
//! Features arrive in address order. Each one is merged into the previous
//! entry when their context windows overlap with matching bytes, yielding
//! longer fragments than the extractor reported. Lines whose fragment occurs
//! more than once in its own context are parked and resolved against the
//! merged entries at the end of the run.

pub mod database;
pub mod geometry;
pub mod merge;
pub mod reconstruct;
pub mod sort;

pub use database::{Absorption, ReconstructionDatabase, ResolutionStats};
pub use geometry::{distance_to_feature, distance_to_window_left_edges, overlap};
pub use merge::merge_features;
pub use reconstruct::{
    ISOLATED_HEADING, Reconstruction, ReconstructionSummary, Reconstructor, reconstruct_file,
    reconstruct_reader,
};
pub use sort::{
    SORTED_PREFIX, SortStats, default_output_path, sort_feature_file, sort_feature_lines,
};
