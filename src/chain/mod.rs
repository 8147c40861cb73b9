//! Chain Module
//!
//! Single-step movement along the doubly linked chain of maps at one layer,
//! and sequential scans of the leaf chain built on top of it.

mod navigator;
mod scan;

pub use navigator::Navigator;
pub use scan::{Direction, Scan};

/// A located item: its value, the map holding it, and its slot in that map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub value: u64,
    pub address: u64,
    pub position: usize,
}

impl Entry {
    pub fn new(value: u64, address: u64, position: usize) -> Self {
        Self {
            value,
            address,
            position,
        }
    }
}
