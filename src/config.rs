//! Configuration for abchain
//!
//! Layout parameters chosen once at creation. They are not recorded in the
//! index itself, so every open of the same address space must pass an
//! identical `Config` (see `descriptor` for the sidecar that remembers it).

use serde::{Deserialize, Serialize};

use crate::error::{AbcError, Result};

/// Layout configuration for one index instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Addressing
    // -------------------------------------------------------------------------
    /// Bytes per address (`asize`). Addressable space is `2^(8 * width)`.
    pub address_width: u8,

    /// Bytes per leaf value (`isize`)
    pub value_width: u8,

    // -------------------------------------------------------------------------
    // Fan-out
    // -------------------------------------------------------------------------
    /// Max children per non-leaf map and per root directory (`dist`)
    pub fanout: u8,

    /// Max values per leaf map (`idist`)
    pub leaf_fanout: u8,
}

/// When a file-backed address space forces written windows to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// fsync after every dirty window close (safest, slowest)
    EveryWrite,

    /// Only on explicit `sync()` / `Index::flush()`
    #[default]
    Manual,
}

impl Default for Config {
    /// 40-bit addresses and 64-bit values; one map fits a 512-byte block.
    fn default() -> Self {
        Self {
            address_width: 5,
            value_width: 8,
            fanout: 99,
            leaf_fanout: 62,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check ranges and that the root directory plus one map fit the address space
    pub fn validate(&self) -> Result<()> {
        if !(1..=8).contains(&self.address_width) {
            return Err(AbcError::Config(format!(
                "address width must be 1..=8 bytes, got {}",
                self.address_width
            )));
        }
        if !(1..=8).contains(&self.value_width) {
            return Err(AbcError::Config(format!(
                "value width must be 1..=8 bytes, got {}",
                self.value_width
            )));
        }
        // A root overflow of fanout + 1 items must split into maps that fit again
        if self.fanout < 2 {
            return Err(AbcError::Config(format!(
                "fanout must be at least 2, got {}",
                self.fanout
            )));
        }
        if self.leaf_fanout == 0 {
            return Err(AbcError::Config("leaf fanout must be at least 1".to_string()));
        }

        let limit = self.address_limit();
        if self.first_slot() >= limit {
            return Err(AbcError::Config(format!(
                "root directory ({} bytes) leaves no room for maps below {:#x}",
                self.root_len(),
                limit
            )));
        }

        Ok(())
    }

    // =========================================================================
    // Derived Layout
    // =========================================================================

    /// `Previous`, `Super`, `Next` and the count byte
    pub fn header_len(&self) -> u64 {
        3 * self.address_width as u64 + 1
    }

    /// Layer count byte plus `fanout` addresses
    pub fn root_len(&self) -> u64 {
        1 + self.fanout as u64 * self.address_width as u64
    }

    /// Every map occupies one slot, large enough for either layer kind
    pub fn slot_len(&self) -> u64 {
        let branch = self.fanout as u64 * self.address_width as u64;
        let leaf = self.leaf_fanout as u64 * self.value_width as u64;
        self.header_len() + branch.max(leaf)
    }

    /// First slot-aligned address past the root directory
    pub fn first_slot(&self) -> u64 {
        self.root_len().div_ceil(self.slot_len()) * self.slot_len()
    }

    /// The all-one address, reserved as the tail sentinel
    pub fn address_limit(&self) -> u64 {
        all_ones(self.address_width)
    }
}

/// Largest unsigned integer representable in `width` bytes
pub(crate) fn all_ones(width: u8) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * width as u32)) - 1
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the address width in bytes (`asize`)
    pub fn address_width(mut self, width: u8) -> Self {
        self.config.address_width = width;
        self
    }

    /// Set the leaf value width in bytes (`isize`)
    pub fn value_width(mut self, width: u8) -> Self {
        self.config.value_width = width;
        self
    }

    /// Set the non-leaf fan-out (`dist`)
    pub fn fanout(mut self, fanout: u8) -> Self {
        self.config.fanout = fanout;
        self
    }

    /// Set the leaf fan-out (`idist`)
    pub fn leaf_fanout(mut self, fanout: u8) -> Self {
        self.config.leaf_fanout = fanout;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
