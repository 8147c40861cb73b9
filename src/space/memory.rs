//! In-memory address space
//!
//! A growable `Vec<u8>` behind a RwLock. Used by tests and benches, and by
//! callers that persist the bytes themselves.

use bytes::BytesMut;
use parking_lot::RwLock;

use crate::error::Result;

use super::{window_bounds, AddressSpace, Window};

/// Address space held entirely in RAM
#[derive(Debug, Default)]
pub struct MemorySpace {
    bytes: RwLock<Vec<u8>>,
}

impl MemorySpace {
    /// Create an empty space
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing contents
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RwLock::new(bytes),
        }
    }

    /// Copy of everything written so far
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }

    /// Take the contents
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_inner()
    }
}

impl AddressSpace for MemorySpace {
    fn open_window(&self, offset: u64, length: u64) -> Result<Window> {
        let (start, end) = window_bounds(offset, length)?;
        let mut data = BytesMut::zeroed(end - start);

        let bytes = self.bytes.read();
        if start < bytes.len() {
            let available = end.min(bytes.len());
            data[..available - start].copy_from_slice(&bytes[start..available]);
        }

        Ok(Window::new(offset, data))
    }

    fn close(&self, window: Window) -> Result<()> {
        let (offset, data, dirty) = window.into_parts();
        if !dirty {
            return Ok(());
        }

        let (start, end) = window_bounds(offset, data.len() as u64)?;
        let mut bytes = self.bytes.write();
        if bytes.len() < end {
            bytes.resize(end, 0);
        }
        bytes[start..end].copy_from_slice(&data);
        Ok(())
    }

    fn extent(&self) -> Result<u64> {
        Ok(self.bytes.read().len() as u64)
    }
}
