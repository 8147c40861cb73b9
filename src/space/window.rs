//! Byte Window
//!
//! An owned copy of one address range. Reads and writes are bounds-checked
//! against the window; stepping outside it means the block being decoded is
//! not what the layout promised.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{AbcError, Result};

/// A readable/writable view of `[offset, offset + len)`
#[derive(Debug)]
pub struct Window {
    offset: u64,
    data: BytesMut,
    dirty: bool,
}

impl Window {
    /// Wrap bytes already copied out of the address space
    pub fn new(offset: u64, data: BytesMut) -> Self {
        Self {
            offset,
            data,
            dirty: false,
        }
    }

    /// A window whose every byte reads as zero
    pub fn zeroed(offset: u64, len: usize) -> Self {
        Self::new(offset, BytesMut::zeroed(len))
    }

    /// Address of the first byte
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `close` has to write this window back
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget pending modifications
    pub fn discard(&mut self) {
        self.dirty = false;
    }

    /// All bytes of the window
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrow `len` bytes starting at window-relative `at`
    pub fn read(&self, at: usize, len: usize) -> Result<&[u8]> {
        let end = self.check(at, len)?;
        Ok(&self.data[at..end])
    }

    /// Overwrite bytes at window-relative `at`; the window never grows
    pub fn write(&mut self, at: usize, bytes: &[u8]) -> Result<()> {
        let end = self.check(at, bytes.len())?;
        self.data[at..end].copy_from_slice(bytes);
        self.dirty = true;
        Ok(())
    }

    /// Set `len` bytes at `at` to `byte`
    pub fn fill(&mut self, at: usize, len: usize, byte: u8) -> Result<()> {
        let end = self.check(at, len)?;
        self.data[at..end].fill(byte);
        self.dirty = true;
        Ok(())
    }

    /// Read a big-endian unsigned integer of `width` (1..=8) bytes
    pub fn read_uint(&self, at: usize, width: u8) -> Result<u64> {
        let mut bytes = self.read(at, Self::width(width)?)?;
        Ok(bytes.get_uint(width as usize))
    }

    /// Write the low `width` bytes of `value`, big-endian
    pub fn write_uint(&mut self, at: usize, width: u8, value: u64) -> Result<()> {
        let width = Self::width(width)?;
        let end = self.check(at, width)?;
        let mut dst = &mut self.data[at..end];
        dst.put_uint(value, width);
        self.dirty = true;
        Ok(())
    }

    /// Hand the buffer back to the address space
    pub(crate) fn into_parts(self) -> (u64, BytesMut, bool) {
        (self.offset, self.data, self.dirty)
    }

    fn check(&self, at: usize, len: usize) -> Result<usize> {
        match at.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(AbcError::MalformedBlock(format!(
                "access [{}, +{}) outside window of {} bytes at {:#x}",
                at,
                len,
                self.data.len(),
                self.offset
            ))),
        }
    }

    fn width(width: u8) -> Result<usize> {
        if (1..=8).contains(&width) {
            Ok(width as usize)
        } else {
            Err(AbcError::Config(format!("integer width must be 1..=8, got {}", width)))
        }
    }
}
