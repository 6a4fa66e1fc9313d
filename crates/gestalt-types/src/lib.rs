//! Core value types for reassembling bulk_extractor features: hierarchical
//! byte addresses, the feature-file escaping codec, feature records and the
//! per-kind record-boundary capability.

pub mod address;
pub mod boundary;
pub mod escape;
pub mod feature;
pub mod line;

pub use address::{ByteAddress, SEGMENT_DELIMITER, Segment};
pub use boundary::{FeatureKind, GenericFeature, HttpHeaderFeature, RecordBoundary};
pub use escape::{escape_for_output, passes_through, unescape};
pub use feature::Feature;
pub use line::{
    COMMENT_MARKER, FIELD_SEPARATOR, is_blank, is_comment, parse_address_field,
    parse_feature_line, strip_line_terminator,
};
