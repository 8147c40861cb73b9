//! Leaf Scan
//!
//! Sequential iteration over the leaf chain in either direction.

use crate::error::Result;
use crate::space::AddressSpace;

use super::{Entry, Navigator};

/// Scan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Iterator over leaf entries; yields the start entry first and ends at the
/// chain boundary
pub struct Scan<'a, S> {
    navigator: Navigator<'a, S>,
    direction: Direction,
    /// Next item to yield; `None` once the chain is exhausted
    pending: Option<Result<Entry>>,
}

impl<'a, S: AddressSpace> Scan<'a, S> {
    pub fn new(navigator: Navigator<'a, S>, start: Option<Entry>, direction: Direction) -> Self {
        Self {
            navigator,
            direction,
            pending: start.map(Ok),
        }
    }
}

impl<'a, S: AddressSpace> Iterator for Scan<'a, S> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match self.pending.take()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };

        let step = match self.direction {
            Direction::Forward => self.navigator.advance(current.address, current.position, 0),
            Direction::Backward => self.navigator.retreat(current.address, current.position, 0),
        };
        self.pending = match step {
            Ok(entry) => Some(Ok(entry)),
            Err(e) if e.is_end_of_chain() => None,
            Err(e) => Some(Err(e)),
        };

        Some(Ok(current))
    }
}
