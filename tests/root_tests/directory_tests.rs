//! Tests for RootDirectory
//!
//! These tests verify:
//! - Loading from a never-written space
//! - Zero-terminated and full top item lists
//! - Byte-exact persistence
//! - Rejection of inconsistent layer counts

use abchain::config::Config;
use abchain::map::BlockCodec;
use abchain::root::RootDirectory;
use abchain::space::MemorySpace;
use abchain::AbcError;

// =============================================================================
// Helper Functions
// =============================================================================

/// asize=1, dist=4: root is `layers` + 4 one-byte addresses
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

/// asize=2, dist=3
fn wide_codec() -> BlockCodec {
    let config = Config::builder()
        .address_width(2)
        .value_width(4)
        .fanout(3)
        .leaf_fanout(3)
        .build()
        .unwrap();
    BlockCodec::new(&config).unwrap()
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_empty_space() {
    let codec = tiny_codec();
    let space = MemorySpace::new();

    let root = RootDirectory::load(&space, &codec).unwrap();

    assert!(root.is_empty());
    assert_eq!(root.layers(), 0);
    assert!(root.top_items().is_empty());
}

#[test]
fn test_load_stops_at_zero_terminator() {
    let codec = tiny_codec();
    // Anything after the terminator is ignored
    let space = MemorySpace::from_bytes(vec![1, 8, 16, 0, 24]);

    let root = RootDirectory::load(&space, &codec).unwrap();

    assert_eq!(root.layers(), 1);
    assert_eq!(root.top_items(), &[8, 16]);
}

#[test]
fn test_load_full_list_without_terminator() {
    let codec = tiny_codec();
    let space = MemorySpace::from_bytes(vec![2, 8, 16, 24, 32, 40, 48]);

    let root = RootDirectory::load(&space, &codec).unwrap();

    assert_eq!(root.layers(), 2);
    assert_eq!(root.top_items(), &[8, 16, 24, 32]);
}

#[test]
fn test_load_multi_byte_addresses() {
    let codec = wide_codec();
    let space = MemorySpace::from_bytes(vec![3, 0x01, 0x02, 0x00, 0x30]);

    let root = RootDirectory::load(&space, &codec).unwrap();

    assert_eq!(root.layers(), 3);
    assert_eq!(root.top_items(), &[0x0102, 0x0030]);
}

#[test]
fn test_load_rejects_items_without_layers() {
    let codec = tiny_codec();
    let space = MemorySpace::from_bytes(vec![0, 8]);

    let result = RootDirectory::load(&space, &codec);
    assert!(matches!(result, Err(AbcError::MalformedBlock(_))));
}

#[test]
fn test_load_rejects_layers_without_items() {
    let codec = tiny_codec();
    let space = MemorySpace::from_bytes(vec![2]);

    let result = RootDirectory::load(&space, &codec);
    assert!(matches!(result, Err(AbcError::MalformedBlock(_))));
}

// =============================================================================
// Persist Tests
// =============================================================================

#[test]
fn test_persist_is_byte_exact() {
    let codec = tiny_codec();
    let source = MemorySpace::from_bytes(vec![1, 8, 16]);
    let root = RootDirectory::load(&source, &codec).unwrap();

    let target = MemorySpace::from_bytes(vec![0xEE; 5]);
    root.persist(&target, &codec).unwrap();

    // Stale entries past the list are cleared
    assert_eq!(target.snapshot(), vec![1, 8, 16, 0, 0]);
}

#[test]
fn test_persist_then_load() {
    let codec = wide_codec();
    let source = MemorySpace::from_bytes(vec![2, 0x00, 0x40, 0x00, 0x53, 0x01, 0x00]);
    let root = RootDirectory::load(&source, &codec).unwrap();

    let target = MemorySpace::new();
    root.persist(&target, &codec).unwrap();
    let reloaded = RootDirectory::load(&target, &codec).unwrap();

    assert_eq!(reloaded, root);
    assert_eq!(reloaded.top_items(), &[0x40, 0x53, 0x100]);
    assert_eq!(target.snapshot().len(), 7);
}
