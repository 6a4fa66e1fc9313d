//! Merging two features whose context windows overlap.

use gestalt_error::{GestaltError, Result};
use gestalt_types::{Feature, RecordBoundary};
use tracing::warn;

use crate::geometry::{distance_to_feature, distance_to_window_left_edges};

/// Merge two features into one covering both context windows.
///
/// The features are put in window order first (the one whose window starts
/// further left becomes `left`). Returns `Ok(None)` when:
/// - the addresses are in different regions,
/// - `right` opens a new record according to `boundary`,
/// - the windows neither overlap nor touch,
/// - the overlapping bytes disagree. When neither input is ambiguous this is
///   a data anomaly and is logged; ambiguous splits are expected to disagree
///   sometimes and fail silently.
///
/// The merged feature keeps `left`'s address, spans from the earliest
/// fragment start to the latest fragment end, and is ambiguous only if both
/// inputs were.
///
/// A merged fragment that does not begin with `left`'s fragment means the
/// geometry is wrong; that is reported as [`GestaltError::MergeInvariant`].
pub fn merge_features(
    a: &Feature,
    b: &Feature,
    boundary: &dyn RecordBoundary,
) -> Result<Option<Feature>> {
    let Some(distance) = distance_to_window_left_edges(a, b) else {
        return Ok(None);
    };
    let (left, right) = if distance < 0 { (b, a) } else { (a, b) };

    if boundary.is_record_start(right.fragment()) {
        return Ok(None);
    }

    let left_window = left.window();
    let right_window = right.window();
    let Ok(distance) = usize::try_from(distance.unsigned_abs()) else {
        return Ok(None);
    };
    if distance > left_window.len() {
        return Ok(None);
    }

    let overlap_end = left_window.len().min(distance + right_window.len());
    let left_overlap = &left_window[distance..overlap_end];
    let right_overlap = &right_window[..overlap_end - distance];
    if left_overlap != right_overlap {
        if !left.is_ambiguous() && !right.is_ambiguous() {
            warn!(
                left = %left,
                right = %right,
                window_distance = distance,
                feature_distance = ?distance_to_feature(left, right),
                "overlapping feature windows do not have matching content"
            );
        }
        return Ok(None);
    }

    let mut window = left_window;
    window.extend_from_slice(&right_window[right_overlap.len()..]);

    let right_fragment_start = distance + right.left_context().len();
    let fragment_start = left.left_context().len().min(right_fragment_start);
    let fragment_end = (left.left_context().len() + left.fragment().len())
        .max(right_fragment_start + right.fragment().len());

    let merged = Feature::new(
        left.address().clone(),
        window[fragment_start..fragment_end].to_vec(),
        window[..fragment_start].to_vec(),
        window[fragment_end..].to_vec(),
    )
    .with_ambiguous(left.is_ambiguous() && right.is_ambiguous());

    if !merged.fragment().starts_with(left.fragment()) {
        return Err(GestaltError::MergeInvariant(format!(
            "merged fragment does not begin with the left fragment: \
             left={left} right={right} merged={merged}"
        )));
    }

    Ok(Some(merged))
}
