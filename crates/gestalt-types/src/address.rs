//! Hierarchical byte addresses ("forensic paths").
//!
//! bulk_extractor names every feature by the path that leads to it: a plain
//! image offset (`"151342528"`), or an offset inside a decoded sub-stream
//! (`"20-GZIP-123"` = byte 123 of the GZIP stream that starts at image byte
//! 20). Segments are separated by `-`; the last segment is always the
//! in-region byte offset.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use gestalt_error::{GestaltError, Result};
use serde::{Serialize, Serializer};

/// Separator between address segments.
pub const SEGMENT_DELIMITER: char = '-';

/// One component of a [`ByteAddress`].
///
/// Variant order matters: the derived `Ord` places offsets before tags,
/// which is the tie-break used by the total order on addresses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Byte offset within the enclosing region.
    Offset(u64),
    /// Opaque tag naming a decoder or carving method (`GZIP`, `BASE64`, ...).
    Tag(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(offset) = raw.parse::<u64>() {
                return Self::Offset(offset);
            }
        }
        Self::Tag(raw.to_owned())
    }

    /// Strict comparison: offsets compare numerically, tags lexically, and a
    /// mixed pair has no order.
    fn try_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Offset(a), Self::Offset(b)) => Some(a.cmp(b)),
            (Self::Tag(a), Self::Tag(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Immutable hierarchical byte offset.
///
/// The raw text is kept for output; equality, hashing and ordering look at
/// the parsed segments only, so `"007"` and `"7"` are the same address.
#[derive(Debug, Clone)]
pub struct ByteAddress {
    raw: String,
    segments: Vec<Segment>,
}

impl ByteAddress {
    /// Parse an address from its textual form.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<Segment> = raw.split(SEGMENT_DELIMITER).map(Segment::parse).collect();
        match segments.last() {
            Some(Segment::Offset(_)) => Ok(Self {
                raw: raw.to_owned(),
                segments,
            }),
            _ => Err(GestaltError::malformed_address(
                raw,
                "last segment must be a non-negative integer offset",
            )),
        }
    }

    /// Parse an address from raw feature-file bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(raw).map_err(|_| {
            GestaltError::malformed_address(
                String::from_utf8_lossy(raw),
                "address is not valid UTF-8",
            )
        })?;
        Self::parse(text)
    }

    /// The address exactly as it appeared in the input.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments leading to the region that contains this address.
    #[must_use]
    pub fn region(&self) -> &[Segment] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Byte offset inside the enclosing region.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self.segments.last() {
            Some(Segment::Offset(offset)) => *offset,
            // Construction guarantees the final segment is an offset.
            _ => 0,
        }
    }

    /// Whether both addresses live in the same region (same path prefix and
    /// depth), so their offsets are directly comparable.
    #[must_use]
    pub fn same_region(&self, other: &Self) -> bool {
        self.region() == other.region()
    }

    /// Strict ordering.
    ///
    /// Segments are compared pairwise over the common prefix and the first
    /// differing pair decides. If the whole common prefix is equal, the
    /// shorter address sorts first: `20` is the start of the region
    /// `20-GZIP-...`. A differing pair that mixes an offset with a tag is an
    /// error rather than an arbitrary answer.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        for (mine, theirs) in self.segments.iter().zip(&other.segments) {
            if mine == theirs {
                continue;
            }
            return mine
                .try_cmp(theirs)
                .ok_or_else(|| GestaltError::IncomparableAddresses {
                    left: self.raw.clone(),
                    right: other.raw.clone(),
                });
        }
        Ok(self.segments.len().cmp(&other.segments.len()))
    }
}

impl PartialEq for ByteAddress {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for ByteAddress {}

impl Hash for ByteAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

/// Total order used for keyed collections. Agrees with
/// [`ByteAddress::try_cmp`] whenever that succeeds; mixed offset/tag pairs
/// put the offset first.
impl Ord for ByteAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl PartialOrd for ByteAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for ByteAddress {
    fn from(offset: u64) -> Self {
        Self {
            raw: offset.to_string(),
            segments: vec![Segment::Offset(offset)],
        }
    }
}

impl fmt::Display for ByteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ByteAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
