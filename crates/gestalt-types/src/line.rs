//! Feature-file line parsing.
//!
//! A feature line is `<address>\t<escaped fragment>\t<escaped context>`,
//! optionally followed by further tab-separated columns that are ignored.
//! Only the line terminator is stripped: trailing whitespace may belong to
//! the context.

use gestalt_error::{GestaltError, Result};
use memchr::memmem;

use crate::address::ByteAddress;
use crate::escape::unescape;
use crate::feature::Feature;

/// Field separator in feature files.
pub const FIELD_SEPARATOR: u8 = b'\t';
/// Comment marker at the start of a line.
pub const COMMENT_MARKER: u8 = b'#';

/// Whether the line is a comment (histogram headers, banners, trailers).
#[must_use]
pub fn is_comment(line: &[u8]) -> bool {
    line.first() == Some(&COMMENT_MARKER)
}

/// Strip a trailing `\n` and a `\r` directly before it.
#[must_use]
pub fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Whether the line carries nothing once its terminator is removed.
#[must_use]
pub fn is_blank(line: &[u8]) -> bool {
    strip_line_terminator(line).is_empty()
}

/// Parse only the address column of a feature line.
pub fn parse_address_field(line: &[u8]) -> Result<ByteAddress> {
    let line = strip_line_terminator(line);
    let field = line
        .split(|b| *b == FIELD_SEPARATOR)
        .next()
        .unwrap_or_default();
    ByteAddress::from_bytes(field)
}

/// Parse a feature line into its candidate features.
///
/// Usually one feature comes back. When the fragment occurs several times in
/// its context window, every (non-overlapping) occurrence is a legal split
/// and one candidate per occurrence is returned, all flagged ambiguous and
/// sharing address and origin line.
pub fn parse_feature_line(line: &[u8]) -> Result<Vec<Feature>> {
    let record = strip_line_terminator(line);
    let mut fields = record.split(|b| *b == FIELD_SEPARATOR);
    let (Some(address), Some(fragment), Some(context)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(GestaltError::malformed_line(
            "expected address, fragment and context separated by tabs",
        ));
    };

    let address = ByteAddress::from_bytes(address)?;
    let fragment = unescape(fragment)?;
    let context = unescape(context)?;
    if fragment.is_empty() {
        return Err(GestaltError::malformed_line(format!(
            "empty feature at address '{address}'"
        )));
    }

    let occurrences: Vec<usize> = memmem::find_iter(&context, &fragment).collect();
    if occurrences.is_empty() {
        return Err(GestaltError::FragmentNotInContext {
            address: address.to_string(),
        });
    }

    let ambiguous = occurrences.len() > 1;
    let candidates = occurrences
        .into_iter()
        .map(|start| {
            let end = start + fragment.len();
            Feature::new(
                address.clone(),
                fragment.clone(),
                context[..start].to_vec(),
                context[end..].to_vec(),
            )
            .with_ambiguous(ambiguous)
            .with_origin_line(record.to_vec())
        })
        .collect();
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_occurrence() {
        let features = parse_feature_line(b"2\t__\tab__cd\n").expect("parse");
        assert_eq!(features.len(), 1);
        let feature = &features[0];
        assert_eq!(feature.address(), &ByteAddress::from(2));
        assert_eq!(feature.fragment(), b"__");
        assert_eq!(feature.left_context(), b"ab");
        assert_eq!(feature.right_context(), b"cd");
        assert!(!feature.is_ambiguous());
        assert_eq!(feature.origin_line(), Some(&b"2\t__\tab__cd"[..]));
    }

    #[test]
    fn repeated_fragment_yields_ambiguous_candidates() {
        let line = b"151342543\tFrom: %s\t\
            \\000From: %s (%s)\\012\\000From: %s\\012\\000Date: %s\\012\\000Repl\n";
        let features = parse_feature_line(line).expect("parse");
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(Feature::is_ambiguous));

        assert_eq!(features[0].left_context(), b"\x00");
        assert_eq!(
            features[0].right_context(),
            b" (%s)\n\x00From: %s\n\x00Date: %s\n\x00Repl"
        );
        assert_eq!(features[1].left_context(), b"\x00From: %s (%s)\n\x00");
        assert_eq!(features[1].right_context(), b"\n\x00Date: %s\n\x00Repl");
        assert_eq!(features[0].origin_line(), features[1].origin_line());
        assert_eq!(features[0].window(), features[1].window());
    }

    #[test]
    fn keeps_trailing_whitespace_and_strips_crlf() {
        let features = parse_feature_line(b"7\tab\t ab \r\n").expect("parse");
        assert_eq!(features[0].left_context(), b" ");
        assert_eq!(features[0].right_context(), b" ");
    }

    #[test]
    fn ignores_extra_columns() {
        let features = parse_feature_line(b"7\tab\txaby\tUTF-16\n").expect("parse");
        assert_eq!(features[0].right_context(), b"y");
    }

    #[test]
    fn fragment_missing_from_context_is_fatal() {
        let err = parse_feature_line(b"9\tzz\tabcd\n").expect_err("missing");
        assert!(matches!(err, GestaltError::FragmentNotInContext { .. }));
    }

    #[test]
    fn short_or_empty_lines_are_malformed() {
        for line in [&b"9\tzz\n"[..], b"9\t\tabc\n", b"\n"] {
            let err = parse_feature_line(line).expect_err("malformed");
            assert!(
                matches!(err, GestaltError::MalformedLine { .. }),
                "line={line:?} err={err}"
            );
        }
    }

    #[test]
    fn bad_address_is_reported() {
        let err = parse_feature_line(b"20-GZIP\tab\tab\n").expect_err("address");
        assert!(matches!(err, GestaltError::MalformedAddress { .. }));
    }

    #[test]
    fn classifies_comment_and_blank_lines() {
        assert!(is_comment(b"# Feature-Recorder: email\n"));
        assert!(!is_comment(b"12\t#\t#\n"));
        assert!(is_blank(b"\r\n"));
        assert!(!is_blank(b" \n"));
    }

    #[test]
    fn address_field_only() {
        let address = parse_address_field(b"20-GZIP-123\tx\tx\n").expect("address");
        assert_eq!(address.as_str(), "20-GZIP-123");
    }
}
