//! Layout Descriptor
//!
//! The index does not describe its own layout, so a reopen with a different
//! `Config` would misread every block. The descriptor is a small sidecar file
//! that records the `Config` next to the index.
//!
//! ## File Format
//! ```text
//! ┌──────────────┬───────────┬───────────┬──────────────────┐
//! │ Magic (4)    │ CRC (4)   │ Len (4)   │ bincode(Config)  │
//! │ "ABCL"       │ LE, data  │ LE        │                  │
//! └──────────────┴───────────┴───────────┴──────────────────┘
//! ```

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{AbcError, Result};

/// Magic bytes identifying a layout descriptor
pub const MAGIC: &[u8; 4] = b"ABCL";

/// Magic (4) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 12;

/// Descriptor path for an index file: `<index>.layout`
pub fn sidecar_path(index_path: &Path) -> PathBuf {
    let mut name = index_path.as_os_str().to_os_string();
    name.push(".layout");
    PathBuf::from(name)
}

/// Serialize a config into descriptor bytes
pub fn encode(config: &Config) -> Result<Vec<u8>> {
    let payload = bincode::serialize(config).map_err(|e| AbcError::Serialization(e.to_string()))?;
    let crc = crc32fast::hash(&payload);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parse descriptor bytes, checking magic, length and CRC
pub fn decode(bytes: &[u8]) -> Result<Config> {
    if bytes.len() < HEADER_SIZE {
        return Err(AbcError::Serialization(format!(
            "descriptor truncated: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != MAGIC {
        return Err(AbcError::Serialization(format!(
            "invalid descriptor magic: expected ABCL, got {:?}",
            &bytes[0..4]
        )));
    }

    let crc = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let payload = bytes
        .get(HEADER_SIZE..HEADER_SIZE + len)
        .ok_or_else(|| AbcError::Serialization(format!("descriptor payload truncated, expected {} bytes", len)))?;

    if crc32fast::hash(payload) != crc {
        return Err(AbcError::Serialization("descriptor CRC mismatch".to_string()));
    }

    let config: Config =
        bincode::deserialize(payload).map_err(|e| AbcError::Serialization(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Write the descriptor file, replacing any existing one
pub fn save(path: &Path, config: &Config) -> Result<()> {
    let bytes = encode(config)?;
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    debug!(path = %path.display(), "saved layout descriptor");
    Ok(())
}

/// Record the layout of a new index at `index_path`; returns the sidecar path
///
/// Refuses when a descriptor already exists or the index file already holds
/// data, since that data may have been written with another layout.
pub fn create(index_path: &Path, config: &Config) -> Result<PathBuf> {
    let sidecar = sidecar_path(index_path);
    if sidecar.exists() {
        return Err(AbcError::Config(format!(
            "{} is already initialized",
            index_path.display()
        )));
    }

    let existing = match fs::metadata(index_path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };
    if existing > 0 {
        return Err(AbcError::Config(format!(
            "{} already holds {} bytes of index data with no recorded layout",
            index_path.display(),
            existing
        )));
    }

    save(&sidecar, config)?;
    Ok(sidecar)
}

/// Read and validate a descriptor file
pub fn load(path: &Path) -> Result<Config> {
    let bytes = fs::read(path)?;
    decode(&bytes)
}
