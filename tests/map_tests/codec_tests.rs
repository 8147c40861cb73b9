//! Tests for BlockCodec
//!
//! These tests verify:
//! - Byte-exact header and item layout
//! - Sentinel decoding (all-zero Previous, all-one Next)
//! - Layer-dependent item widths
//! - Rejection of malformed counts and out-of-window items

use abchain::config::Config;
use abchain::map::{BlockCodec, Link, MapBlock, MapHeader};
use abchain::space::Window;
use abchain::AbcError;

// =============================================================================
// Helper Functions
// =============================================================================

/// asize=1, isize=1, dist=4, idist=4
fn tiny_codec() -> BlockCodec {
    let config = Config::builder()
        .address_width(1)
        .value_width(1)
        .fanout(4)
        .leaf_fanout(4)
        .build()
        .unwrap();
    BlockCodec::new(&config).unwrap()
}

/// asize=3, isize=2, dist=5, idist=6
fn mixed_codec() -> BlockCodec {
    let config = Config::builder()
        .address_width(3)
        .value_width(2)
        .fanout(5)
        .leaf_fanout(6)
        .build()
        .unwrap();
    BlockCodec::new(&config).unwrap()
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_layout_lengths() {
    let codec = mixed_codec();

    assert_eq!(codec.header_len(), 10);
    assert_eq!(codec.item_width(0), 2);
    assert_eq!(codec.item_width(1), 3);
    assert_eq!(codec.item_width(7), 3);
    assert_eq!(codec.fanout(0), 6);
    assert_eq!(codec.fanout(3), 5);
    assert_eq!(codec.map_len(0), 10 + 12);
    assert_eq!(codec.map_len(1), 10 + 15);
    assert_eq!(codec.slot_len(), 25);
    assert_eq!(codec.address_limit(), 0xFF_FFFF);
}

#[test]
fn test_encode_map_byte_exact() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(8, codec.map_len(0) as usize);

    let block = MapBlock {
        header: MapHeader {
            previous: Link::Boundary,
            parent: 0,
            next: Link::Map(16),
            count: 0,
        },
        items: vec![1, 2, 3, 4],
    };
    codec.encode_map(&mut window, &block, 0).unwrap();

    assert_eq!(window.as_bytes(), &[0x00, 0x00, 0x10, 0x04, 1, 2, 3, 4]);
    assert!(window.is_dirty());
}

#[test]
fn test_encode_tail_map_uses_all_one_next() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(16, codec.map_len(0) as usize);

    let block = MapBlock {
        header: MapHeader {
            previous: Link::Map(8),
            parent: 0,
            next: Link::Boundary,
            count: 0,
        },
        items: vec![5, 6],
    };
    codec.encode_map(&mut window, &block, 0).unwrap();

    // Unused item slots are zeroed
    assert_eq!(window.as_bytes(), &[0x08, 0x00, 0xFF, 0x02, 5, 6, 0, 0]);
}

#[test]
fn test_items_are_big_endian() {
    let codec = mixed_codec();
    let mut window = Window::zeroed(0, codec.map_len(1) as usize);

    codec.encode_item(&mut window, 0, 0, 0x0102).unwrap();
    codec.encode_item(&mut window, 1, 1, 0x0A0B0C).unwrap();

    // Leaf item 0 is 2 bytes at hdr_end; level 1 item 1 is 3 bytes at hdr_end + 3
    assert_eq!(window.read(10, 2).unwrap(), &[0x01, 0x02]);
    assert_eq!(window.read(13, 3).unwrap(), &[0x0A, 0x0B, 0x0C]);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_header_round_trip() {
    let codec = mixed_codec();

    for header in [
        MapHeader {
            previous: Link::Boundary,
            parent: 0,
            next: Link::Boundary,
            count: 0,
        },
        MapHeader {
            previous: Link::Map(0x12_3456),
            parent: 0xAB_CDEF,
            next: Link::Map(0xFF_FFFE),
            count: 5,
        },
    ] {
        let mut window = Window::zeroed(0, codec.header_len());
        codec.encode_header(&mut window, &header).unwrap();
        assert_eq!(codec.decode_header(&window).unwrap(), header);
    }
}

#[test]
fn test_map_round_trip_at_both_layer_kinds() {
    let codec = mixed_codec();
    let block = MapBlock {
        header: MapHeader {
            previous: Link::Map(100),
            parent: 200,
            next: Link::Map(300),
            count: 3,
        },
        items: vec![7, 0xFFFF, 9],
    };

    for level in [0u8, 1, 4] {
        let mut window = Window::zeroed(0, codec.map_len(level) as usize);
        codec.encode_map(&mut window, &block, level).unwrap();
        let decoded = codec.decode_map(&window, level).unwrap();
        assert_eq!(decoded, block);
        for (index, &item) in block.items.iter().enumerate() {
            assert_eq!(codec.decode_item(&window, index, level).unwrap(), item);
        }
    }
}

#[test]
fn test_encode_map_count_follows_items() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(8, codec.map_len(0) as usize);

    // A stale count in the header is replaced by the item count
    let block = MapBlock {
        header: MapHeader {
            previous: Link::Boundary,
            parent: 0,
            next: Link::Boundary,
            count: 4,
        },
        items: vec![9],
    };
    codec.encode_map(&mut window, &block, 0).unwrap();

    assert_eq!(codec.decode_header(&window).unwrap().count, 1);
}

// =============================================================================
// Sentinel Tests
// =============================================================================

#[test]
fn test_all_zero_previous_is_head() {
    let codec = tiny_codec();
    let window = Window::zeroed(8, codec.header_len());

    let header = codec.decode_header(&window).unwrap();
    assert_eq!(header.previous, Link::Boundary);
    // All-zero Next is not the tail sentinel
    assert_eq!(header.next, Link::Map(0));
}

#[test]
fn test_all_one_next_is_tail() {
    let codec = mixed_codec();
    let mut window = Window::zeroed(0, codec.header_len());
    window.fill(6, 3, 0xFF).unwrap();

    let header = codec.decode_header(&window).unwrap();
    assert_eq!(header.next, Link::Boundary);
    assert!(header.next.address().is_none());
}

#[test]
fn test_link_to_sentinel_address_rejected() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(8, codec.header_len());

    let to_root = MapHeader {
        previous: Link::Map(0),
        parent: 0,
        next: Link::Boundary,
        count: 0,
    };
    assert!(matches!(
        codec.encode_header(&mut window, &to_root),
        Err(AbcError::MalformedBlock(_))
    ));

    let to_tail = MapHeader {
        previous: Link::Boundary,
        parent: 0,
        next: Link::Map(0xFF),
        count: 0,
    };
    assert!(matches!(
        codec.encode_header(&mut window, &to_tail),
        Err(AbcError::MalformedBlock(_))
    ));
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_count_beyond_fanout_is_malformed() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(8, codec.map_len(0) as usize);
    window.write(3, &[5]).unwrap();

    let result = codec.decode_map(&window, 0);
    assert!(matches!(result, Err(AbcError::MalformedBlock(_))));
}

#[test]
fn test_item_outside_window_is_malformed() {
    let codec = tiny_codec();
    let window = Window::zeroed(8, codec.map_len(0) as usize);

    assert!(codec.decode_item(&window, 3, 0).is_ok());
    assert!(matches!(
        codec.decode_item(&window, 4, 0),
        Err(AbcError::MalformedBlock(_))
    ));
}

#[test]
fn test_too_many_items_rejected_on_encode() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(8, codec.map_len(0) as usize);

    let block = MapBlock::lone(0, vec![1, 2, 3, 4, 5]);
    assert!(matches!(
        codec.encode_map(&mut window, &block, 0),
        Err(AbcError::MalformedBlock(_))
    ));
}

#[test]
fn test_value_too_wide() {
    let codec = tiny_codec();
    let mut window = Window::zeroed(8, codec.map_len(0) as usize);

    assert!(codec.check_value(255).is_ok());
    assert!(matches!(
        codec.encode_item(&mut window, 0, 0, 256),
        Err(AbcError::ValueTooWide { value: 256, width: 1 })
    ));
}
