//! Navigator
//!
//! Every call re-reads the maps it touches; nothing is cached between steps,
//! so a reader always sees pointers as of its latest step.

use crate::error::{AbcError, Result};
use crate::map::{BlockCodec, Link, MapBlock};
use crate::space::AddressSpace;

use super::Entry;

/// Moves at most one map boundary per call
pub struct Navigator<'a, S> {
    space: &'a S,
    codec: &'a BlockCodec,
}

impl<'a, S: AddressSpace> Navigator<'a, S> {
    pub fn new(space: &'a S, codec: &'a BlockCodec) -> Self {
        Self { space, codec }
    }

    /// Read the map at `address`, interpreting items for `level`
    pub fn load(&self, address: u64, level: u8) -> Result<MapBlock> {
        self.space
            .read_with(address, self.codec.map_len(level), |window| {
                self.codec.decode_map(window, level)
            })
    }

    /// Step to the item after `position`, crossing into `Next` if needed
    pub fn advance(&self, address: u64, position: usize, level: u8) -> Result<Entry> {
        let block = self.load(address, level)?;
        let count = block.items.len();
        check_position(address, position, count)?;

        let step = position + 1;
        if step < count {
            return Ok(Entry::new(block.items[step], address, step));
        }

        let next = match block.header.next {
            Link::Map(next) => next,
            Link::Boundary => return Err(AbcError::EndOfChain),
        };
        // Valid positions always carry exactly to slot 0 of the successor
        let carry = step - count;
        let successor = self.load(next, level)?;
        match successor.items.get(carry) {
            Some(&item) => Ok(Entry::new(item, next, carry)),
            None => Err(empty_map(next, level)),
        }
    }

    /// Step to the item before `position`, crossing into `Previous` if needed
    pub fn retreat(&self, address: u64, position: usize, level: u8) -> Result<Entry> {
        let block = self.load(address, level)?;
        check_position(address, position, block.items.len())?;

        if position > 0 {
            return Ok(Entry::new(block.items[position - 1], address, position - 1));
        }

        let previous = match block.header.previous {
            Link::Map(previous) => previous,
            Link::Boundary => return Err(AbcError::EndOfChain),
        };
        let predecessor = self.load(previous, level)?;
        match predecessor.items.last() {
            Some(&item) => Ok(Entry::new(item, previous, predecessor.items.len() - 1)),
            None => Err(empty_map(previous, level)),
        }
    }

    /// Follow item 0 from the map at `address` (at `level`) down to the leaf
    /// layer and return the smallest value of that subtree
    pub fn descend_to_first(&self, address: u64, level: u8) -> Result<u64> {
        Ok(self.leftmost(address, level)?.value)
    }

    /// First leaf entry below the map at `address`
    pub fn leftmost(&self, address: u64, level: u8) -> Result<Entry> {
        self.descend(address, level, |items| items.first().copied().map(|item| (item, 0)))
    }

    /// Last leaf entry below the map at `address`
    pub fn rightmost(&self, address: u64, level: u8) -> Result<Entry> {
        self.descend(address, level, |items| {
            items.last().copied().map(|item| (item, items.len() - 1))
        })
    }

    fn descend<F>(&self, mut address: u64, mut level: u8, pick: F) -> Result<Entry>
    where
        F: Fn(&[u64]) -> Option<(u64, usize)>,
    {
        loop {
            let block = self.load(address, level)?;
            let (item, position) = pick(&block.items).ok_or_else(|| empty_map(address, level))?;
            if level == 0 {
                return Ok(Entry::new(item, address, position));
            }
            address = item;
            level -= 1;
        }
    }
}

fn check_position(address: u64, position: usize, count: usize) -> Result<()> {
    if position >= count {
        return Err(AbcError::InvalidPosition {
            address,
            position,
            count,
        });
    }
    Ok(())
}

fn empty_map(address: u64, level: u8) -> AbcError {
    AbcError::MalformedBlock(format!("map {:#x} at level {} holds no items", address, level))
}
