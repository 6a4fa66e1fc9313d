use std::cmp::Ordering;

use gestalt_types::{ByteAddress, escape_for_output, parse_feature_line, unescape};
use proptest::prelude::*;

fn address_strategy() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        (0_u64..10_000).prop_map(|n| n.to_string()),
        prop::sample::select(vec!["GZIP", "BASE64", "ZIP", "PDF"]).prop_map(str::to_owned),
    ];
    (prop::collection::vec(segment, 0..3), 0_u64..10_000).prop_map(|(mut path, offset)| {
        path.push(offset.to_string());
        path.join("-")
    })
}

proptest! {
    #[test]
    fn prop_escape_then_unescape_recovers_bytes(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let escaped = escape_for_output(&bytes);
        prop_assert!(escaped.is_ascii());
        prop_assert!(!escaped.contains('\t'));
        prop_assert!(!escaped.contains('\n'));
        prop_assert_eq!(unescape(escaped.as_bytes()).expect("fresh escape decodes"), bytes);
    }

    #[test]
    fn prop_address_order_is_antisymmetric(a in address_strategy(), b in address_strategy()) {
        let a = ByteAddress::parse(&a).expect("generated address");
        let b = ByteAddress::parse(&b).expect("generated address");
        if let (Ok(ab), Ok(ba)) = (a.try_cmp(&b), b.try_cmp(&a)) {
            prop_assert_eq!(ab, ba.reverse());
            prop_assert_eq!(ab, a.cmp(&b));
            prop_assert_eq!(ab == Ordering::Equal, a == b);
        }
    }

    #[test]
    fn prop_every_candidate_reconstructs_the_window(
        left in prop::collection::vec(any::<u8>(), 0..24),
        fragment in prop::collection::vec(1_u8..=255, 1..6),
        right in prop::collection::vec(any::<u8>(), 0..24),
    ) {
        let mut window = left.clone();
        window.extend_from_slice(&fragment);
        window.extend_from_slice(&right);
        let line = format!(
            "100\t{}\t{}\n",
            escape_for_output(&fragment),
            escape_for_output(&window)
        );

        let candidates = parse_feature_line(line.as_bytes()).expect("well-formed line");
        prop_assert!(!candidates.is_empty());
        for candidate in &candidates {
            prop_assert_eq!(candidate.window(), window.clone());
            prop_assert_eq!(candidate.fragment(), &fragment[..]);
            prop_assert_eq!(candidate.is_ambiguous(), candidates.len() > 1);
        }
    }
}
