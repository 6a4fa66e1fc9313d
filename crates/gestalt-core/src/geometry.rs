//! Distances between features and their context windows.
//!
//! All distances are signed byte counts in the coordinate system of the
//! region both features live in. Features from different regions (e.g. one
//! inside `20-GZIP-...` and one inside `20-ZIP-...`) have no common
//! coordinate system; the distance functions return `None` for them and
//! they never overlap.

use gestalt_types::Feature;

/// Signed distance from `a`'s fragment start to `b`'s fragment start.
///
/// `None` when the addresses are not in the same region.
#[must_use]
pub fn distance_to_feature(a: &Feature, b: &Feature) -> Option<i64> {
    let (left, right) = (a.address(), b.address());
    if left == right {
        return Some(0);
    }
    if !left.same_region(right) {
        return None;
    }
    let distance = i128::from(right.offset()) - i128::from(left.offset());
    i64::try_from(distance).ok()
}

/// Signed distance from the left edge of `a`'s window to the left edge of
/// `b`'s window.
///
/// `None` when the addresses are not in the same region or the distance does
/// not fit in an `i64`.
#[must_use]
pub fn distance_to_window_left_edges(a: &Feature, b: &Feature) -> Option<i64> {
    let d = i128::from(distance_to_feature(a, b)?);
    // Place a's fragment at 0.
    let a_edge = -wide_len(a.left_context().len());
    let b_edge = d - wide_len(b.left_context().len());
    i64::try_from(b_edge - a_edge).ok()
}

/// Whether the two context windows share bytes or touch end to start.
///
/// Touching windows count: they describe contiguous bytes and merge by plain
/// concatenation.
#[must_use]
pub fn overlap(a: &Feature, b: &Feature) -> bool {
    let Some(distance) = distance_to_window_left_edges(a, b) else {
        return false;
    };
    let left_window_len = if distance < 0 {
        b.window_len()
    } else {
        a.window_len()
    };
    distance.unsigned_abs() <= u64::try_from(left_window_len).unwrap_or(u64::MAX)
}

fn wide_len(len: usize) -> i128 {
    i128::try_from(len).unwrap_or(i128::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestalt_types::ByteAddress;

    fn feature(address: &str, left: &[u8], fragment: &[u8], right: &[u8]) -> Feature {
        Feature::new(
            ByteAddress::parse(address).expect("address"),
            fragment.to_vec(),
            left.to_vec(),
            right.to_vec(),
        )
    }

    #[test]
    fn distances_between_neighbors() {
        let f1 = feature("2", b"ab", b"__", b"cd");
        let f2 = feature("6", b"cd", b"__", b"ef");
        assert_eq!(distance_to_feature(&f1, &f1), Some(0));
        assert_eq!(distance_to_feature(&f1, &f2), Some(4));
        assert_eq!(distance_to_feature(&f2, &f1), Some(-4));
        assert_eq!(distance_to_window_left_edges(&f1, &f2), Some(4));
        assert_eq!(distance_to_window_left_edges(&f2, &f1), Some(-4));
    }

    #[test]
    fn distances_with_uneven_contexts() {
        let f3 = feature(
            "151342528",
            b"lx\x00Subject: %s\n\x00",
            b"From: %s (%s)",
            b"\n\x00From: %s\n\x00Date",
        );
        let f4 = feature(
            "151342543",
            b"\x00From: %s (%s)\n\x00",
            b"From: %s",
            b"\n\x00Date: %s\n\x00Repl",
        );
        assert_eq!(distance_to_feature(&f3, &f4), Some(15));
        assert_eq!(distance_to_feature(&f4, &f3), Some(-15));
        assert_eq!(distance_to_window_left_edges(&f3, &f4), Some(15));
        assert_eq!(distance_to_window_left_edges(&f4, &f3), Some(-15));
        assert!(overlap(&f3, &f4));
        assert!(overlap(&f4, &f3));
    }

    #[test]
    fn different_regions_are_incomparable() {
        let plain = feature("20", b"", b"x", b"");
        let nested = feature("20-GZIP-0", b"", b"x", b"");
        let other = feature("21-GZIP-0", b"", b"x", b"");
        assert_eq!(distance_to_feature(&plain, &nested), None);
        assert_eq!(distance_to_feature(&nested, &other), None);
        assert!(!overlap(&plain, &nested));
        assert!(!overlap(&nested, &other));
    }

    #[test]
    fn nested_region_offsets_compare() {
        let a = feature("20-GZIP-100", b"", b"x", b"");
        let b = feature("20-GZIP-130", b"", b"x", b"");
        assert_eq!(distance_to_feature(&a, &b), Some(30));
    }

    #[test]
    fn touching_windows_overlap_but_gaps_do_not() {
        let a = feature("10", b"ab", b"cd", b"ef");
        let touching = feature("16", b"gh", b"ij", b"");
        let gap = feature("17", b"gh", b"ij", b"");
        assert_eq!(distance_to_window_left_edges(&a, &touching), Some(6));
        assert!(overlap(&a, &touching));
        assert!(overlap(&touching, &a));
        assert!(!overlap(&a, &gap));
        assert!(!overlap(&gap, &a));
    }

    #[test]
    fn offsets_near_the_integer_limit_do_not_overflow() {
        let start = feature("0", b"a", b"x", b"");
        let far = feature("9223372036854775807", b"", b"y", b"");
        assert_eq!(distance_to_feature(&start, &far), Some(i64::MAX));
        assert_eq!(distance_to_window_left_edges(&start, &far), None);
        assert!(!overlap(&start, &far));
        assert!(!overlap(&far, &start));

        let end = feature("18446744073709551615", b"", b"z", b"");
        assert_eq!(distance_to_feature(&start, &end), None);
        assert!(!overlap(&start, &end));
    }
}
