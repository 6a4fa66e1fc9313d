//! The reconstruction database: ordered, merged entries plus the
//! bookkeeping for features that could not be placed.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use gestalt_error::Result;
use gestalt_types::{ByteAddress, Feature, FeatureKind, RecordBoundary};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::geometry::overlap;
use crate::merge::merge_features;

/// What [`ReconstructionDatabase::add_feature`] did with a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorption {
    /// Ambiguous; parked until [`ReconstructionDatabase::resolve_ambiguous_entries`].
    Deferred,
    /// Stored as a new entry.
    Appended,
    /// Joined onto one or both neighboring entries.
    Merged,
    /// Overlapped its neighbor with conflicting content (or arrived out of
    /// order) and was set aside in the failed-merge table.
    Failed,
}

/// Counters reported by one call to
/// [`ReconstructionDatabase::resolve_ambiguous_entries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub passes: usize,
    pub resolved: usize,
    pub isolated: usize,
    pub pending_before: usize,
    pub pending_after: usize,
}

/// Accumulates features in address order, merging each into the previous
/// entry whenever their windows overlap.
#[derive(Debug)]
pub struct ReconstructionDatabase {
    kind: FeatureKind,
    entries: Vec<Feature>,
    pending_ambiguous: BTreeMap<ByteAddress, Vec<Feature>>,
    failed_merges: BTreeMap<ByteAddress, Feature>,
    isolated_ambiguous: Vec<Feature>,
}

impl ReconstructionDatabase {
    #[must_use]
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            pending_ambiguous: BTreeMap::new(),
            failed_merges: BTreeMap::new(),
            isolated_ambiguous: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Absorb one feature.
    ///
    /// Features are expected in non-decreasing address order. Ambiguous
    /// features are parked unless `allow_ambiguous_resolution` is set, in
    /// which case they are placed like any other feature; resolution also
    /// permits splicing a feature in before the last entry.
    ///
    /// Fails only when the feature's address cannot be ordered against the
    /// last entry, or when a merge breaks its geometric post-condition.
    pub fn add_feature(
        &mut self,
        feature: Feature,
        allow_ambiguous_resolution: bool,
    ) -> Result<Absorption> {
        if feature.is_ambiguous() && !allow_ambiguous_resolution {
            debug!(address = %feature.address(), "deferring ambiguous feature");
            self.park(feature);
            return Ok(Absorption::Deferred);
        }

        let Some(last) = self.entries.last() else {
            debug!(address = %feature.address(), "seeding database");
            self.entries.push(feature);
            return Ok(Absorption::Appended);
        };

        match feature.address().try_cmp(last.address())? {
            Ordering::Greater => self.absorb_after_last(feature),
            _ if allow_ambiguous_resolution => self.splice(feature),
            _ => {
                warn!(
                    address = %feature.address(),
                    last = %last.address(),
                    "feature out of address order; sort the input first"
                );
                self.fail(feature);
                Ok(Absorption::Failed)
            }
        }
    }

    fn absorb_after_last(&mut self, feature: Feature) -> Result<Absorption> {
        let boundary = self.kind.boundary();
        let last_index = self.entries.len() - 1;
        let last = &self.entries[last_index];

        if let Some(merged) = merge_features(last, &feature, boundary)? {
            debug!(address = %feature.address(), into = %merged.address(), "merged");
            if !merged.is_ambiguous() {
                self.pending_ambiguous.remove(feature.address());
            }
            self.entries[last_index] = merged;
            return Ok(Absorption::Merged);
        }

        if !overlap(&feature, last) || boundary.is_record_start(feature.fragment()) {
            debug!(address = %feature.address(), "appended");
            self.entries.push(feature);
            return Ok(Absorption::Appended);
        }

        if feature.is_ambiguous() {
            debug!(address = %feature.address(), "ambiguous candidate did not merge; deferring");
            self.park(feature);
            return Ok(Absorption::Deferred);
        }

        warn!(
            address = %feature.address(),
            last = %last.address(),
            "feature overlaps previous entry but could not be merged"
        );
        self.fail(feature);
        Ok(Absorption::Failed)
    }

    /// Insert at the address-sorted position, merging with the predecessor
    /// and then the successor where they accept the feature.
    fn splice(&mut self, feature: Feature) -> Result<Absorption> {
        let boundary = self.kind.boundary();
        let address = feature.address().clone();
        let index = self
            .entries
            .partition_point(|entry| entry.address() < &address);

        let mut merged = feature;
        let mut start = index;
        let mut end = index;
        if let Some(predecessor) = index.checked_sub(1).map(|i| &self.entries[i]) {
            if let Some(joined) = merge_features(predecessor, &merged, boundary)? {
                merged = joined;
                start = index - 1;
            }
        }
        if let Some(successor) = self.entries.get(index) {
            if let Some(joined) = merge_features(&merged, successor, boundary)? {
                merged = joined;
                end = index + 1;
            }
        }

        if !merged.is_ambiguous() {
            self.pending_ambiguous.remove(&address);
        }
        let absorption = if start == end {
            Absorption::Appended
        } else {
            Absorption::Merged
        };
        debug!(address = %address, ?absorption, "spliced");
        self.entries.splice(start..end, std::iter::once(merged));
        Ok(absorption)
    }

    fn park(&mut self, feature: Feature) {
        self.pending_ambiguous
            .entry(feature.address().clone())
            .or_default()
            .push(feature);
    }

    fn fail(&mut self, feature: Feature) {
        self.failed_merges
            .insert(feature.address().clone(), feature);
    }

    /// Try to place every parked ambiguous candidate.
    ///
    /// An address is resolved when exactly one of its candidates merges with
    /// every neighboring entry it overlaps; that candidate is absorbed and
    /// its siblings are discarded. Candidates that overlap no entry at all
    /// are moved to the isolated list. Passes repeat until nothing more
    /// resolves, so calling this again afterwards changes nothing.
    pub fn resolve_ambiguous_entries(&mut self) -> Result<ResolutionStats> {
        let mut stats = ResolutionStats {
            pending_before: self.pending_candidate_count(),
            ..ResolutionStats::default()
        };
        info!(
            pending = stats.pending_before,
            "resolving ambiguously-parsed features"
        );

        loop {
            stats.passes += 1;
            let resolved = self.resolution_pass(&mut stats)?;
            if resolved == 0 {
                break;
            }
        }

        stats.pending_after = self.pending_candidate_count();
        info!(
            pending = stats.pending_after,
            resolved = stats.resolved,
            isolated = stats.isolated,
            passes = stats.passes,
            "ambiguous resolution finished"
        );
        Ok(stats)
    }

    fn resolution_pass(&mut self, stats: &mut ResolutionStats) -> Result<usize> {
        let boundary = self.kind.boundary();
        let addresses: Vec<ByteAddress> = self.pending_ambiguous.keys().cloned().collect();
        let mut resolved = 0;

        for address in addresses {
            let Some(candidates) = self.pending_ambiguous.remove(&address) else {
                continue;
            };

            let index = self
                .entries
                .partition_point(|entry| entry.address() < &address);
            let neighbors: Vec<&Feature> = index
                .checked_sub(1)
                .into_iter()
                .chain(Some(index))
                .filter_map(|i| self.entries.get(i))
                .collect();

            let mut accepted = Vec::new();
            let mut unresolved = Vec::new();
            let mut isolated = Vec::new();
            for candidate in candidates {
                let near: Vec<&Feature> = neighbors
                    .iter()
                    .copied()
                    .filter(|neighbor| overlap(neighbor, &candidate))
                    .collect();
                if near.is_empty() {
                    isolated.push(candidate);
                } else if merges_with_all(&candidate, &near, boundary)? {
                    accepted.push(candidate);
                } else {
                    unresolved.push(candidate);
                }
            }

            stats.isolated += isolated.len();
            self.isolated_ambiguous.extend(isolated);

            if accepted.len() == 1 {
                let winner = accepted.remove(0);
                debug!(
                    address = %address,
                    discarded = unresolved.len(),
                    "resolved ambiguous feature"
                );
                self.add_feature(winner, true)?;
                resolved += 1;
            } else {
                unresolved.append(&mut accepted);
                if !unresolved.is_empty() {
                    self.pending_ambiguous.insert(address, unresolved);
                }
            }
        }

        stats.resolved += resolved;
        Ok(resolved)
    }

    /// Entries in address order.
    #[must_use]
    pub fn entries(&self) -> &[Feature] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn pending_ambiguous(&self) -> &BTreeMap<ByteAddress, Vec<Feature>> {
        &self.pending_ambiguous
    }

    /// Total candidates still parked, over all addresses.
    #[must_use]
    pub fn pending_candidate_count(&self) -> usize {
        self.pending_ambiguous.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn failed_merges(&self) -> &BTreeMap<ByteAddress, Feature> {
        &self.failed_merges
    }

    #[must_use]
    pub fn isolated_ambiguous(&self) -> &[Feature] {
        &self.isolated_ambiguous
    }

    /// Input lines of the isolated candidates, in isolation order.
    pub fn isolated_origin_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.isolated_ambiguous
            .iter()
            .filter_map(Feature::origin_line)
    }
}

impl<'a> IntoIterator for &'a ReconstructionDatabase {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn merges_with_all(
    candidate: &Feature,
    neighbors: &[&Feature],
    boundary: &dyn RecordBoundary,
) -> Result<bool> {
    let mut merged = candidate.clone();
    for neighbor in neighbors {
        match merge_features(neighbor, &merged, boundary)? {
            Some(joined) => merged = joined,
            None => return Ok(false),
        }
    }
    Ok(true)
}
