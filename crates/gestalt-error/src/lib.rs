use thiserror::Error;

/// Primary error type for gestalt operations.
///
/// Data errors (a line that cannot be parsed, addresses that cannot be
/// ordered) are separated from programming-invariant failures so the CLI can
/// tell a bad input file apart from a bug in the merge geometry.
#[derive(Error, Debug)]
pub enum GestaltError {
    // === Input Errors ===
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An address that does not end in a non-negative integer offset.
    #[error("malformed address '{address}': {detail}")]
    MalformedAddress { address: String, detail: String },

    /// Two addresses whose paths diverge at an integer/tag pair.
    #[error("addresses cannot be ordered: '{left}' vs '{right}'")]
    IncomparableAddresses { left: String, right: String },

    /// Malformed octal/hex escape sequence.
    #[error("escape decoding failed at byte {offset}: {detail}")]
    Decode { offset: usize, detail: String },

    /// A feature line that does not have the expected shape.
    #[error("malformed feature line: {detail}")]
    MalformedLine { detail: String },

    /// The escaped fragment does not occur in its own escaped context.
    #[error("feature not found in own context at address '{address}'")]
    FragmentNotInContext { address: String },

    /// Wraps a line-level failure with its 1-based line number.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<GestaltError>,
    },

    // === Invariant Errors ===
    /// A merge produced a feature that violates the merge post-condition.
    #[error("merge invariant violated: {0}")]
    MergeInvariant(String),

    // === CLI Errors ===
    /// Bad command-line usage.
    #[error("usage error: {0}")]
    Usage(String),
}

impl GestaltError {
    /// Whether the error was caused by the input data rather than the engine.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::MalformedAddress { .. }
            | Self::IncomparableAddresses { .. }
            | Self::Decode { .. }
            | Self::MalformedLine { .. }
            | Self::FragmentNotInContext { .. } => true,
            Self::AtLine { source, .. } => source.is_data_error(),
            Self::Io(_) | Self::MergeInvariant(_) | Self::Usage(_) => false,
        }
    }

    /// Human-friendly suggestion for fixing this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::IncomparableAddresses { .. } => {
                Some("Check that the feature file comes from a single bulk_extractor run")
            }
            Self::MalformedLine { .. } | Self::FragmentNotInContext { .. } => {
                Some("Check that the input is a tab-separated bulk_extractor feature file")
            }
            Self::MergeInvariant(_) => Some("This is an engine bug; please report the input line"),
            Self::Usage(_) => Some("Run with --help for usage"),
            Self::AtLine { source, .. } => source.suggestion(),
            _ => None,
        }
    }

    /// Get the process exit code for this error (for CLI use).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            Self::MergeInvariant(_) => 70,
            _ => 1,
        }
    }

    /// Create a malformed-address error.
    pub fn malformed_address(address: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedAddress {
            address: address.into(),
            detail: detail.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(offset: usize, detail: impl Into<String>) -> Self {
        Self::Decode {
            offset,
            detail: detail.into(),
        }
    }

    /// Create a malformed-line error.
    pub fn malformed_line(detail: impl Into<String>) -> Self {
        Self::MalformedLine {
            detail: detail.into(),
        }
    }

    /// Attach a 1-based line number.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        Self::AtLine {
            line,
            source: Box::new(self),
        }
    }

    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Result type alias using `GestaltError`.
pub type Result<T> = std::result::Result<T, GestaltError>;
