use std::fmt;

use crate::address::ByteAddress;
use crate::escape::escape_for_output;

/// One fragment of a record, anchored at a byte address, with the bytes
/// seen on either side of it.
///
/// `left_context + fragment + right_context` is the context window exactly
/// as the extractor reported it. Features are never mutated; merging two of
/// them builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    address: ByteAddress,
    fragment: Vec<u8>,
    left_context: Vec<u8>,
    right_context: Vec<u8>,
    ambiguous: bool,
    origin_line: Option<Vec<u8>>,
}

impl Feature {
    #[must_use]
    pub fn new(
        address: ByteAddress,
        fragment: Vec<u8>,
        left_context: Vec<u8>,
        right_context: Vec<u8>,
    ) -> Self {
        Self {
            address,
            fragment,
            left_context,
            right_context,
            ambiguous: false,
            origin_line: None,
        }
    }

    /// Mark this feature as one of several legal splits of its input line.
    #[must_use]
    pub fn with_ambiguous(mut self, ambiguous: bool) -> Self {
        self.ambiguous = ambiguous;
        self
    }

    /// Attach the input line this feature was parsed from.
    #[must_use]
    pub fn with_origin_line(mut self, line: Vec<u8>) -> Self {
        self.origin_line = Some(line);
        self
    }

    #[must_use]
    pub fn address(&self) -> &ByteAddress {
        &self.address
    }

    #[must_use]
    pub fn fragment(&self) -> &[u8] {
        &self.fragment
    }

    #[must_use]
    pub fn left_context(&self) -> &[u8] {
        &self.left_context
    }

    #[must_use]
    pub fn right_context(&self) -> &[u8] {
        &self.right_context
    }

    /// Whether the fragment occurred more than once in its own window.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    /// Raw input line (diagnostics only). Merged features have none.
    #[must_use]
    pub fn origin_line(&self) -> Option<&[u8]> {
        self.origin_line.as_deref()
    }

    /// Full context window: left context, fragment, right context.
    #[must_use]
    pub fn window(&self) -> Vec<u8> {
        let mut window = Vec::with_capacity(self.window_len());
        window.extend_from_slice(&self.left_context);
        window.extend_from_slice(&self.fragment);
        window.extend_from_slice(&self.right_context);
        window
    }

    #[must_use]
    pub fn window_len(&self) -> usize {
        self.left_context.len() + self.fragment.len() + self.right_context.len()
    }

    /// Render as a feature-file line (without the trailing newline):
    /// address, escaped fragment, escaped window.
    #[must_use]
    pub fn to_feature_file_line(&self) -> String {
        format!(
            "{}\t{}\t{}",
            self.address,
            escape_for_output(&self.fragment),
            escape_for_output(&self.window())
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Feature at {}, '{}' | '{}' | '{}' >",
            self.address,
            escape_for_output(&self.left_context),
            escape_for_output(&self.fragment),
            escape_for_output(&self.right_context)
        )
    }
}
