//! Bisector
//!
//! Top-down search. Starting from the resident root, each layer is bisected
//! and the search descends into the one child whose subtree can hold the
//! target. Items above layer 0 are addresses, so each candidate is compared
//! through its representative: the first leaf value of its subtree.
//!
//! Cost: one map read per layer to descend, plus the representative lookups
//! made by each bisection step.

use std::cmp::Ordering;

use crate::chain::{Entry, Navigator};
use crate::error::{AbcError, Result};
use crate::map::{BlockCodec, ROOT_ADDRESS};
use crate::root::RootDirectory;
use crate::space::AddressSpace;

/// Searches the index from the resident root down
pub struct Bisector<'a, S> {
    navigator: Navigator<'a, S>,
    root: &'a RootDirectory,
}

impl<'a, S: AddressSpace> Bisector<'a, S> {
    pub fn new(space: &'a S, codec: &'a BlockCodec, root: &'a RootDirectory) -> Self {
        Self {
            navigator: Navigator::new(space, codec),
            root,
        }
    }

    /// Find the entry for which `compare(value, target)` is `Equal`
    ///
    /// `compare` orders a stored value relative to the target and must agree
    /// with the ascending order of the leaf chain.
    pub fn search<F>(&self, target: u64, compare: F) -> Result<Option<Entry>>
    where
        F: Fn(u64, u64) -> Ordering,
    {
        Ok(self
            .locate(target, &compare)?
            .filter(|entry| compare(entry.value, target) == Ordering::Equal))
    }

    /// Find the last entry not ordered after the target (its insertion
    /// neighbour); `None` when the target precedes every value
    pub fn seek<F>(&self, target: u64, compare: F) -> Result<Option<Entry>>
    where
        F: Fn(u64, u64) -> Ordering,
    {
        Ok(self
            .locate(target, &compare)?
            .filter(|entry| compare(entry.value, target) != Ordering::Greater))
    }

    /// Descend to the leaf position the bisection collapses to
    fn locate<F>(&self, target: u64, compare: &F) -> Result<Option<Entry>>
    where
        F: Fn(u64, u64) -> Ordering,
    {
        if self.root.is_empty() {
            return Ok(None);
        }

        let mut level = self.root.layers();
        let mut address = ROOT_ADDRESS;
        let mut items = self.root.top_items().to_vec();

        loop {
            if items.is_empty() {
                return Err(AbcError::MalformedBlock(format!(
                    "map {:#x} at level {} holds no items",
                    address, level
                )));
            }

            let index = if level == 0 {
                bisect(items.len(), |i| Ok(items[i]), target, compare)?
            } else {
                bisect(
                    items.len(),
                    |i| self.navigator.descend_to_first(items[i], level - 1),
                    target,
                    compare,
                )?
            };

            if level == 0 {
                return Ok(Some(Entry::new(items[index], address, index)));
            }

            address = items[index];
            level -= 1;
            items = self.navigator.load(address, level)?.items;
        }
    }
}

/// Collapse `[0, len)` to the last index whose key is not after `target`
///
/// Index 0 is never compared: it is the fallback when every key is greater.
/// An `Equal` key is taken immediately.
fn bisect<K, F>(len: usize, mut key: K, target: u64, compare: &F) -> Result<usize>
where
    K: FnMut(usize) -> Result<u64>,
    F: Fn(u64, u64) -> Ordering,
{
    let (mut low, mut high) = (0, len);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        match compare(key(mid)?, target) {
            Ordering::Equal => return Ok(mid),
            Ordering::Less => low = mid,
            Ordering::Greater => high = mid,
        }
    }
    Ok(low)
}
