//! File-backed address space
//!
//! Windows are read with positioned reads and written back on close. Bytes
//! past the end of the file read as zero; writing past it extends the file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::Result;

use super::{window_bounds, AddressSpace, Window};

/// Address space stored in a single file
pub struct FileSpace {
    /// Path of the backing file
    path: PathBuf,
    /// File handle; seek + read/write pairs must not interleave
    file: Mutex<File>,
    sync_strategy: SyncStrategy,
}

impl FileSpace {
    /// Open or create the backing file
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            sync_strategy,
        })
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AddressSpace for FileSpace {
    fn open_window(&self, offset: u64, length: u64) -> Result<Window> {
        let (start, end) = window_bounds(offset, length)?;
        let mut data = BytesMut::zeroed(end - start);

        let mut file = self.file.lock();
        let file_len = file.metadata()?.len();
        if offset < file_len {
            let available = (file_len - offset).min(length) as usize;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut data[..available])?;
        }

        Ok(Window::new(offset, data))
    }

    fn close(&self, window: Window) -> Result<()> {
        let (offset, data, dirty) = window.into_parts();
        if !dirty {
            return Ok(());
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&data)?;

        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }
        Ok(())
    }

    fn extent(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    fn sync(&self) -> Result<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }
}
