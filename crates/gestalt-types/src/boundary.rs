//! Feature variants: the "does this fragment start a new record" capability.
//!
//! The merge engine never joins a fragment onto its left neighbor when the
//! fragment opens a new top-level record. What counts as a record start
//! depends on the kind of feature being reassembled; everything else about
//! merging is kind-independent.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use gestalt_error::GestaltError;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use serde::Serialize;

/// Decides whether a fragment begins a new top-level record.
pub trait RecordBoundary: fmt::Debug + Send + Sync {
    /// Short name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Whether `fragment` opens a record that must not be merged into the
    /// preceding one.
    fn is_record_start(&self, fragment: &[u8]) -> bool {
        let _ = fragment;
        false
    }
}

/// Features with no record structure: anything that overlaps may merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericFeature;

impl RecordBoundary for GenericFeature {
    fn name(&self) -> &'static str {
        "generic"
    }
}

lazy_static! {
    // Terminator of a request line: "GET / HTTP/1.1\r\n".
    static ref HTTP_REQUEST_LINE_END: Regex =
        Regex::new(r"(?-u)HTTP/\d.\d\r\n").expect("static regex");
    // Start of a status line: "HTTP/1.1 200 OK".
    static ref HTTP_STATUS_LINE_START: Regex =
        Regex::new(r"(?-u)HTTP/\d.\d \d\d\d ").expect("static regex");
}

/// HTTP header blocks. A header starts with either a request line or a
/// status line, so a fragment carrying the end of a request line or the
/// beginning of a status line opens a new block.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpHeaderFeature;

impl RecordBoundary for HttpHeaderFeature {
    fn name(&self) -> &'static str {
        "httpheader"
    }

    fn is_record_start(&self, fragment: &[u8]) -> bool {
        HTTP_REQUEST_LINE_END.is_match(fragment) || HTTP_STATUS_LINE_START.is_match(fragment)
    }
}

static GENERIC: GenericFeature = GenericFeature;
static HTTP_HEADER: HttpHeaderFeature = HttpHeaderFeature;

/// Selector for the feature variant being reassembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    #[default]
    Generic,
    HttpHeader,
}

impl FeatureKind {
    /// File-name suffix bulk_extractor uses for the HTTP header scanner.
    pub const HTTP_HEADER_SUFFIX: &'static str = "httpheader.txt";

    /// The capability implementing this kind.
    #[must_use]
    pub fn boundary(self) -> &'static dyn RecordBoundary {
        match self {
            Self::Generic => &GENERIC,
            Self::HttpHeader => &HTTP_HEADER,
        }
    }

    /// Pick the kind from a feature file's name.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        let named_http = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(Self::HTTP_HEADER_SUFFIX));
        if named_http {
            Self::HttpHeader
        } else {
            Self::Generic
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.boundary().name()
    }
}

impl FromStr for FeatureKind {
    type Err = GestaltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "httpheader" | "http-header" | "http_header" => Ok(Self::HttpHeader),
            other => Err(GestaltError::usage(format!(
                "unknown feature kind: {other} (expected generic|httpheader)"
            ))),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
