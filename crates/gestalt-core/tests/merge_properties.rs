use gestalt_core::{ReconstructionDatabase, distance_to_feature, merge_features};
use gestalt_types::{ByteAddress, Feature, FeatureKind, GenericFeature};
use proptest::prelude::*;

/// Cut `data[start..end]` into a feature whose fragment is
/// `data[fragment_start..fragment_end]`.
fn shred(
    data: &[u8],
    start: usize,
    fragment_start: usize,
    fragment_end: usize,
    end: usize,
) -> Feature {
    Feature::new(
        ByteAddress::from(fragment_start as u64),
        data[fragment_start..fragment_end].to_vec(),
        data[start..fragment_start].to_vec(),
        data[fragment_end..end].to_vec(),
    )
}

proptest! {
    #[test]
    fn prop_merge_is_order_independent(
        data in prop::collection::vec(any::<u8>(), 60),
        lead in 1_usize..8,
        first_len in 0_usize..6,
        first_tail in 0_usize..8,
        gap in 0_usize..30,
        back in 0_usize..40,
        second_len in 0_usize..6,
        second_tail in 0_usize..8,
    ) {
        let s1 = 0;
        let f1 = lead;
        let fe1 = f1 + 1 + first_len;
        let e1 = fe1 + first_tail;
        let f2 = f1 + gap;
        let s2 = f2 - back % (f2 - s1);
        let fe2 = f2 + 1 + second_len;
        let e2 = fe2 + second_tail;

        let a = shred(&data, s1, f1, fe1, e1);
        let b = shred(&data, s2, f2, fe2, e2);

        let forward = merge_features(&a, &b, &GenericFeature).expect("consistent geometry");
        let backward = merge_features(&b, &a, &GenericFeature).expect("consistent geometry");
        prop_assert_eq!(&forward, &backward);

        if s2 <= e1 {
            let merged = forward.expect("windows overlap or touch");
            prop_assert_eq!(merged.window(), data[s1..e1.max(e2)].to_vec());
            prop_assert_eq!(merged.fragment(), &data[f1..fe1.max(fe2)]);
            prop_assert_eq!(merged.address(), a.address());
        } else {
            prop_assert!(forward.is_none());
        }
    }

    #[test]
    fn prop_feature_distance_is_antisymmetric(x in 0_u64..1_000_000, y in 0_u64..1_000_000) {
        let a = Feature::new(
            ByteAddress::parse(&format!("7-GZIP-{x}")).expect("address"),
            b"a".to_vec(),
            vec![],
            vec![],
        );
        let b = Feature::new(
            ByteAddress::parse(&format!("7-GZIP-{y}")).expect("address"),
            b"b".to_vec(),
            vec![],
            vec![],
        );
        let ab = distance_to_feature(&a, &b).expect("same region");
        let ba = distance_to_feature(&b, &a).expect("same region");
        prop_assert_eq!(ab, -ba);
    }

    #[test]
    fn prop_overlapping_shreds_reassemble_the_source(
        data in prop::collection::vec(any::<u8>(), 64),
        radius in 0_usize..6,
    ) {
        let mut db = ReconstructionDatabase::new(FeatureKind::Generic);
        for position in (0_usize..64).step_by(4) {
            let start = position.saturating_sub(radius);
            let end = (position + 4 + radius).min(64);
            db.add_feature(shred(&data, start, position, position + 4, end), false)
                .expect("absorb");
        }
        prop_assert_eq!(db.len(), 1);
        prop_assert!(db.failed_merges().is_empty());
        let entry = &db.entries()[0];
        prop_assert_eq!(entry.fragment(), &data[..]);
        prop_assert_eq!(entry.window(), data.clone());
    }
}
