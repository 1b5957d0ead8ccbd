use proptest::prelude::*;

use crate::error::FramingError;
use crate::protocol::framing::{Datagram, DatagramFramer, Framer, parse_datagram};
use crate::protocol::metadata::{Category, FourCc};

fn chunk(index: u32, count: u32, code: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"ssncchnk");
    out.extend_from_slice(&index.to_be_bytes());
    out.extend_from_slice(&count.to_be_bytes());
    out.extend_from_slice(b"ssnc");
    out.extend_from_slice(code);
    out.extend_from_slice(data);
    out
}

#[test]
fn test_parse_plain_datagram() {
    let Datagram::Item(item) = parse_datagram(b"ssncsnuaAirPlay/371.4.7").unwrap() else {
        panic!("expected item");
    };
    assert_eq!(item.category(), Category::ShairportExtension);
    assert_eq!(item.code(), FourCc::new(b"snua"));
    assert_eq!(item.text().unwrap(), Some("AirPlay/371.4.7"));
}

#[test]
fn test_parse_datagram_without_payload() {
    let Datagram::Item(item) = parse_datagram(b"ssncpfls").unwrap() else {
        panic!("expected item");
    };
    assert!(item.is_empty());
}

#[test]
fn test_parse_chunk() {
    let Datagram::Chunk(fragment) = parse_datagram(&chunk(2, 5, b"PICT", b"abc")).unwrap() else {
        panic!("expected chunk");
    };
    assert_eq!(fragment.index, 2);
    assert_eq!(fragment.count, 5);
    assert_eq!(fragment.code, FourCc::new(b"PICT"));
    assert_eq!(&fragment.data[..], b"abc");
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse_datagram(b"ssnc"), Err(FramingError::TooShort { len: 4 }));
    assert_eq!(
        parse_datagram(b"ssncchnk\0\0\0\0"),
        Err(FramingError::TooShort { len: 12 })
    );
    assert_eq!(
        parse_datagram(&chunk(3, 3, b"PICT", b"")),
        Err(FramingError::InvalidChunk { index: 3, count: 3 })
    );
    assert_eq!(
        parse_datagram(&chunk(0, 0, b"PICT", b"")),
        Err(FramingError::InvalidChunk { index: 0, count: 0 })
    );
    assert!(matches!(
        parse_datagram(b"abcdsnua"),
        Err(FramingError::UnknownCategory(_))
    ));
}

#[test]
fn test_reassembly_in_order() {
    let mut framer = DatagramFramer::new();
    assert!(framer.push(&chunk(0, 3, b"PICT", b"aa")).is_empty());
    assert!(framer.push(&chunk(1, 3, b"PICT", b"bb")).is_empty());
    let items = framer.push(&chunk(2, 3, b"PICT", b"cc"));

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].code(), FourCc::new(b"PICT"));
    assert_eq!(items[0].payload(), Some(&b"aabbcc"[..]));
    assert!(!framer.is_assembling());
}

#[test]
fn test_reassembly_out_of_order() {
    let mut framer = DatagramFramer::new();
    assert!(framer.push(&chunk(2, 3, b"PICT", b"cc")).is_empty());
    assert!(framer.push(&chunk(0, 3, b"PICT", b"aa")).is_empty());
    let items = framer.push(&chunk(1, 3, b"PICT", b"bb"));
    assert_eq!(items[0].payload(), Some(&b"aabbcc"[..]));
}

#[test]
fn test_single_chunk_sequence() {
    let mut framer = DatagramFramer::new();
    let items = framer.push(&chunk(0, 1, b"PICT", b"x"));
    assert_eq!(items[0].payload(), Some(&b"x"[..]));
}

#[test]
fn test_plain_datagram_discards_partial_sequence() {
    let mut framer = DatagramFramer::new();
    framer.push(&chunk(0, 3, b"PICT", b"aa"));
    framer.push(&chunk(1, 3, b"PICT", b"bb"));

    let items = framer.push(b"ssncpend");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].code(), FourCc::new(b"pend"));
    assert!(!framer.is_assembling());

    // The tail of the old sequence starts a fresh, incomplete one
    assert!(framer.push(&chunk(2, 3, b"PICT", b"cc")).is_empty());
}

#[test]
fn test_restart_discards_stale_sequence() {
    let mut framer = DatagramFramer::new();
    framer.push(&chunk(0, 3, b"PICT", b"old"));
    framer.push(&chunk(1, 3, b"PICT", b"old"));

    // Sender starts over with a different layout
    assert!(framer.push(&chunk(0, 2, b"PICT", b"new")).is_empty());
    let items = framer.push(&chunk(1, 2, b"PICT", b"er"));
    assert_eq!(items[0].payload(), Some(&b"newer"[..]));
}

#[test]
fn test_repeated_index_restarts_sequence() {
    let mut framer = DatagramFramer::new();
    framer.push(&chunk(0, 2, b"PICT", b"aa"));
    framer.push(&chunk(0, 2, b"PICT", b"xx"));
    let items = framer.push(&chunk(1, 2, b"PICT", b"yy"));
    assert_eq!(items[0].payload(), Some(&b"xxyy"[..]));
}

#[test]
fn test_invalid_datagram_keeps_sequence() {
    let mut framer = DatagramFramer::new();
    framer.push(&chunk(0, 2, b"PICT", b"aa"));
    assert!(framer.push(b"ss").is_empty());
    let items = framer.push(&chunk(1, 2, b"PICT", b"bb"));
    assert_eq!(items[0].payload(), Some(&b"aabb"[..]));
}

proptest! {
    #[test]
    fn test_reassembly_is_order_independent(
        fragments in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..32), 1..12),
        seed in any::<u64>(),
    ) {
        let count = fragments.len() as u32;
        let expected: Vec<u8> = fragments.concat();

        // Deterministic permutation from the seed
        let mut order: Vec<usize> = (0..fragments.len()).collect();
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let j = (state >> 33) as usize % (i + 1);
            order.swap(i, j);
        }

        let mut framer = DatagramFramer::new();
        let mut items = Vec::new();
        for &i in &order {
            items.extend(framer.push(&chunk(i as u32, count, b"PICT", &fragments[i])));
        }

        prop_assert_eq!(items.len(), 1);
        let payload = items[0].payload().map(<[u8]>::to_vec).unwrap_or_default();
        prop_assert_eq!(payload, expected);
        prop_assert!(!framer.is_assembling());
    }

    #[test]
    fn test_interrupted_sequence_never_emits(
        count in 2u32..10,
        delivered in 1usize..10,
        interrupt_at in 0usize..10,
    ) {
        let delivered = delivered.min(count as usize - 1);
        let interrupt_at = interrupt_at.min(delivered);

        let mut framer = DatagramFramer::new();
        let mut items = Vec::new();
        for i in 0..delivered {
            if i == interrupt_at {
                items.extend(framer.push(b"ssncmden"));
            }
            items.extend(framer.push(&chunk(i as u32, count, b"PICT", b"zz")));
        }
        if interrupt_at == delivered {
            items.extend(framer.push(b"ssncmden"));
        }

        // Only the plain datagram comes out
        prop_assert_eq!(items.len(), 1);
        prop_assert_eq!(items[0].code(), FourCc::new(b"mden"));
    }
}
