//! Address Space Module
//!
//! The sparse, randomly addressable byte space the index lives in.
//!
//! ## Responsibilities
//! - Hand out byte windows over `[offset, offset + length)`
//! - Read never-written bytes as zero
//! - Grow the backing medium when a window is written past its end
//!
//! ## Window Lifecycle
//! ```text
//! open_window(offset, len) ──► Window (owned copy) ──► read / write ──► close(Window)
//!                                                                        │
//!                                          dirty? write back ◄───────────┘
//! ```
//!
//! The index never holds a window across more than one navigation step, so
//! implementations only need to be consistent per call.

mod file;
mod memory;
mod window;

pub use file::FileSpace;
pub use memory::MemorySpace;
pub use window::Window;

use crate::error::{AbcError, Result};

/// Byte-addressable backing store consumed by the index
pub trait AddressSpace {
    /// Copy `[offset, offset + length)` into a window; unwritten bytes read as zero
    fn open_window(&self, offset: u64, length: u64) -> Result<Window>;

    /// Release a window, writing it back if it was modified
    fn close(&self, window: Window) -> Result<()>;

    /// One past the last byte ever written
    fn extent(&self) -> Result<u64>;

    /// Make written data durable
    fn sync(&self) -> Result<()> {
        Ok(())
    }

    /// Open a window, hand it to `f`, then close it
    fn read_with<T, F>(&self, offset: u64, length: u64, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&Window) -> Result<T>,
    {
        let window = self.open_window(offset, length)?;
        let out = f(&window);
        self.close(window)?;
        out
    }

    /// Like `read_with`, but the closure may modify the window
    ///
    /// Nothing is written back when the closure fails.
    fn write_with<T, F>(&self, offset: u64, length: u64, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Window) -> Result<T>,
    {
        let mut window = self.open_window(offset, length)?;
        match f(&mut window) {
            Ok(out) => {
                self.close(window)?;
                Ok(out)
            }
            Err(e) => {
                window.discard();
                self.close(window)?;
                Err(e)
            }
        }
    }
}

/// Validate a window request and return `(start, end)` as `usize`
pub(crate) fn window_bounds(offset: u64, length: u64) -> Result<(usize, usize)> {
    let out_of_range = || AbcError::WindowOutOfRange { offset, length };
    let end = offset.checked_add(length).ok_or_else(out_of_range)?;
    let start = usize::try_from(offset).map_err(|_| out_of_range())?;
    let end = usize::try_from(end).map_err(|_| out_of_range())?;
    Ok((start, end))
}
