use proptest::prelude::*;
use zskyline::ZKey;

/// Reference interleaving for two 32-bit offsets into a single word.
fn interleave_2d(x: u32, y: u32) -> u64 {
    let mut value = 0u64;
    for i in 0..32 {
        value |= ((x as u64 >> i) & 1) << (2 * i + 1);
        value |= ((y as u64 >> i) & 1) << (2 * i);
    }
    value
}

fn offsets(d: std::ops::Range<usize>) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), d)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        ..ProptestConfig::default()
    })]

    #[test]
    fn offsets_survive_encoding(point in offsets(1..7)) {
        let key = ZKey::encode_offsets(&point);
        prop_assert_eq!(key.decode_offsets(point.len()), point);
    }

    #[test]
    fn signed_points_survive_encoding(point in prop::collection::vec(any::<i64>(), 1..6)) {
        let key = ZKey::encode(&point);
        prop_assert_eq!(key.decode(point.len()), point);
    }

    #[test]
    fn order_matches_interleaved_value(a in any::<(u32, u32)>(), b in any::<(u32, u32)>()) {
        let ka = ZKey::encode_offsets(&[a.0 as u64, a.1 as u64]);
        let kb = ZKey::encode_offsets(&[b.0 as u64, b.1 as u64]);
        prop_assert_eq!(ka.cmp(&kb), interleave_2d(a.0, a.1).cmp(&interleave_2d(b.0, b.1)));
        prop_assert_eq!(ka == kb, a == b);
    }

    #[test]
    fn key_length_tracks_highest_bit(x in any::<u32>(), y in any::<u32>()) {
        let key = ZKey::encode_offsets(&[x as u64, y as u64]);
        let value = interleave_2d(x, y);
        prop_assert_eq!(key.len(), 64 - value.leading_zeros() as usize);
        prop_assert_eq!(key.is_empty(), value == 0);
    }

    #[test]
    fn common_prefix_area_is_symmetric(
        a in prop::collection::vec(any::<u64>(), 3),
        b in prop::collection::vec(any::<u64>(), 3),
    ) {
        let ka = ZKey::encode_offsets(&a);
        let kb = ZKey::encode_offsets(&b);
        prop_assert_eq!(
            ZKey::common_prefix_area(&ka, &kb, 3),
            ZKey::common_prefix_area(&kb, &ka, 3)
        );
        prop_assert!(ZKey::common_prefix_area(&ka, &ka, 3).is_empty());
    }

    #[test]
    fn keys_agree_above_common_prefix_area(
        a in prop::collection::vec(0u64..1 << 20, 2..5),
        b in prop::collection::vec(0u64..1 << 20, 2..5),
    ) {
        let d = a.len().min(b.len());
        // Same top bit in dimension 0 gives keys of equal length.
        let mut a = a[..d].to_vec();
        let mut b = b[..d].to_vec();
        a[0] |= 1 << 20;
        b[0] |= 1 << 20;
        let ka = ZKey::encode_offsets(&a);
        let kb = ZKey::encode_offsets(&b);
        prop_assert_eq!(ka.len(), kb.len());

        let area = ZKey::common_prefix_area(&ka, &kb, d);
        prop_assert_eq!(area.len() % d, 0);
        prop_assert_eq!(area.is_empty(), a == b);
        for i in area.len()..ka.len() {
            prop_assert_eq!(ka.bit(i), kb.bit(i), "bit {} differs above area {}", i, area.len());
        }
    }
}
