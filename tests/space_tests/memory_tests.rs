//! Tests for MemorySpace and Window
//!
//! These tests verify:
//! - Zero-fill of never-written bytes
//! - Write-back on close only for dirty windows
//! - Growth of the extent on write
//! - Window bounds checking and big-endian integers

use abchain::space::{AddressSpace, MemorySpace, Window};
use abchain::AbcError;

// =============================================================================
// Zero Fill / Growth Tests
// =============================================================================

#[test]
fn test_unwritten_bytes_read_as_zero() {
    let space = MemorySpace::new();

    let window = space.open_window(1_000, 16).unwrap();
    assert_eq!(window.len(), 16);
    assert_eq!(window.offset(), 1_000);
    assert!(window.as_bytes().iter().all(|&b| b == 0));
    space.close(window).unwrap();

    assert_eq!(space.extent().unwrap(), 0);
}

#[test]
fn test_write_then_read_back() {
    let space = MemorySpace::new();

    let mut window = space.open_window(4, 3).unwrap();
    window.write(0, b"abc").unwrap();
    space.close(window).unwrap();

    assert_eq!(space.extent().unwrap(), 7);
    let window = space.open_window(0, 8).unwrap();
    assert_eq!(window.as_bytes(), b"\0\0\0\0abc\0");
}

#[test]
fn test_clean_window_is_not_written_back() {
    let space = MemorySpace::from_bytes(vec![1, 2, 3]);

    let window = space.open_window(2, 10).unwrap();
    assert_eq!(window.read(0, 2).unwrap(), &[3, 0]);
    assert!(!window.is_dirty());
    space.close(window).unwrap();

    assert_eq!(space.snapshot(), vec![1, 2, 3]);
}

#[test]
fn test_window_straddling_the_end() {
    let space = MemorySpace::from_bytes(vec![9; 6]);

    let mut window = space.open_window(4, 4).unwrap();
    assert_eq!(window.as_bytes(), &[9, 9, 0, 0]);
    window.write(3, &[7]).unwrap();
    space.close(window).unwrap();

    assert_eq!(space.into_bytes(), vec![9, 9, 9, 9, 9, 9, 0, 7]);
}

#[test]
fn test_write_with_discards_on_error() {
    let space = MemorySpace::new();

    let result: abchain::Result<()> = space.write_with(0, 4, |window| {
        window.write(0, &[1, 2, 3, 4])?;
        Err(AbcError::EndOfChain)
    });

    assert!(matches!(result, Err(AbcError::EndOfChain)));
    assert_eq!(space.extent().unwrap(), 0);
}

#[test]
fn test_read_with_returns_closure_value() {
    let space = MemorySpace::from_bytes(vec![0, 0, 0x01, 0x02]);

    let value = space.read_with(2, 2, |window| window.read_uint(0, 2)).unwrap();
    assert_eq!(value, 0x0102);
}

#[test]
fn test_window_overflowing_u64_is_rejected() {
    let space = MemorySpace::new();

    let result = space.open_window(u64::MAX, 2);
    assert!(matches!(
        result,
        Err(AbcError::WindowOutOfRange { offset: u64::MAX, length: 2 })
    ));
}

// =============================================================================
// Window Tests
// =============================================================================

#[test]
fn test_window_access_outside_bounds() {
    let mut window = Window::zeroed(0, 4);

    assert!(matches!(window.read(2, 3), Err(AbcError::MalformedBlock(_))));
    assert!(matches!(window.write(4, &[1]), Err(AbcError::MalformedBlock(_))));
    assert!(matches!(window.read_uint(1, 4), Err(AbcError::MalformedBlock(_))));
    assert!(!window.is_dirty());
}

#[test]
fn test_uint_widths() {
    let mut window = Window::zeroed(0, 16);

    window.write_uint(0, 5, 0x01_0203_0405).unwrap();
    window.write_uint(5, 8, u64::MAX - 1).unwrap();
    window.write_uint(13, 1, 0xAB).unwrap();

    assert_eq!(&window.as_bytes()[0..5], &[1, 2, 3, 4, 5]);
    assert_eq!(window.read_uint(0, 5).unwrap(), 0x01_0203_0405);
    assert_eq!(window.read_uint(5, 8).unwrap(), u64::MAX - 1);
    assert_eq!(window.read_uint(13, 1).unwrap(), 0xAB);
}

#[test]
fn test_uint_width_must_be_one_to_eight() {
    let window = Window::zeroed(0, 16);

    assert!(matches!(window.read_uint(0, 0), Err(AbcError::Config(_))));
    assert!(matches!(window.read_uint(0, 9), Err(AbcError::Config(_))));
}
