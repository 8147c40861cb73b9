//! Root Directory
//!
//! The bootstrap record at address 0. Unlike a map it has no chain header:
//!
//! ```text
//! ┌────────────┬──────────────┬──────────────┬─────┬──────────────────────┐
//! │ Layers (1) │ Top[0] (a)   │ Top[1] (a)   │ ... │ up to `fanout` items │
//! └────────────┴──────────────┴──────────────┴─────┴──────────────────────┘
//!   The list ends at the first all-zero address or after `fanout` entries.
//! ```
//!
//! Loaded once at open and kept resident; only the mutator changes it, and it
//! persists the record before a mutation returns.

use tracing::debug;

use crate::error::{AbcError, Result};
use crate::map::{BlockCodec, ROOT_ADDRESS};
use crate::space::AddressSpace;

/// Resident top layer of the index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RootDirectory {
    /// Levels between the resident top and the leaf layer; 0 for an empty index
    layers: u8,
    /// Addresses of the maps at level `layers - 1`
    top_items: Vec<u64>,
}

impl RootDirectory {
    /// Read the record from the start of the address space
    pub fn load<S: AddressSpace>(space: &S, codec: &BlockCodec) -> Result<Self> {
        let layers = space.read_with(ROOT_ADDRESS, 1, |window| window.read_uint(0, 1))? as u8;

        let width = codec.address_width();
        let fanout = codec.root_fanout();
        let list_len = fanout as u64 * width as u64;

        let top_items = space.read_with(ROOT_ADDRESS + 1, list_len, |window| {
            let mut items = Vec::with_capacity(fanout);
            for index in 0..fanout {
                let address = window.read_uint(index * width as usize, width)?;
                if address == 0 {
                    break;
                }
                items.push(address);
            }
            Ok(items)
        })?;

        let root = Self { layers, top_items };
        root.check()?;
        Ok(root)
    }

    /// Write layer count and top items, zeroing the unused tail of the list
    pub fn persist<S: AddressSpace>(&self, space: &S, codec: &BlockCodec) -> Result<()> {
        self.check()?;
        if self.top_items.len() > codec.root_fanout() {
            return Err(AbcError::StructuralInconsistency(format!(
                "root holds {} items, fanout is {}",
                self.top_items.len(),
                codec.root_fanout()
            )));
        }

        let width = codec.address_width();
        let root_len = 1 + codec.root_fanout() as u64 * width as u64;

        space.write_with(ROOT_ADDRESS, root_len, |window| {
            window.fill(0, window.len(), 0)?;
            window.write_uint(0, 1, self.layers as u64)?;
            for (index, &address) in self.top_items.iter().enumerate() {
                window.write_uint(1 + index * width as usize, width, address)?;
            }
            Ok(())
        })?;

        debug!(layers = self.layers, items = self.top_items.len(), "persisted root directory");
        Ok(())
    }

    pub fn layers(&self) -> u8 {
        self.layers
    }

    pub fn top_items(&self) -> &[u64] {
        &self.top_items
    }

    pub fn is_empty(&self) -> bool {
        self.layers == 0
    }

    pub fn len(&self) -> usize {
        self.top_items.len()
    }

    // =========================================================================
    // Mutation (mutator only)
    // =========================================================================

    /// Insert `address` right after `existing`; returns the new item's index
    pub(crate) fn insert_after(&mut self, existing: u64, address: u64) -> Result<usize> {
        let index = self
            .top_items
            .iter()
            .position(|&item| item == existing)
            .ok_or_else(|| {
                AbcError::StructuralInconsistency(format!(
                    "map {:#x} is not referenced by the root",
                    existing
                ))
            })?;
        self.top_items.insert(index + 1, address);
        Ok(index + 1)
    }

    /// Swap in a whole new top layer
    pub(crate) fn replace(&mut self, layers: u8, top_items: Vec<u64>) {
        self.layers = layers;
        self.top_items = top_items;
    }

    fn check(&self) -> Result<()> {
        match (self.layers, self.top_items.is_empty()) {
            (0, false) => Err(AbcError::MalformedBlock(
                "root lists maps but records zero layers".to_string(),
            )),
            (1.., true) => Err(AbcError::MalformedBlock(format!(
                "root records {} layers but lists no maps",
                self.layers
            ))),
            _ => Ok(()),
        }
    }
}
