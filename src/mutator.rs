//! Mutator
//!
//! The write path. Values enter the leaf chain; a map that overflows is split
//! by cutting a suffix of its items into a freshly allocated sibling, and the
//! sibling's address is inserted into the parent. That insertion may overflow
//! the parent in turn, all the way up. When the resident root overflows, its
//! items move into two new maps and a new resident layer is added on top.
//!
//! ## Split Policy
//! - Overflow caused by an insert at the end of the map (the append path):
//!   the map keeps exactly `fanout` items and the sibling gets the rest, so
//!   append-only workloads leave every interior map fully packed.
//! - Any other overflow: split in half, left side gets `ceil(n / 2)`.
//!
//! ## Write Order
//! There is no journal. Each split writes the new sibling first, then the
//! successor's `Previous`, the shrunk original with its new `Next`, the moved
//! children's `Super`, and finally the parent (the root directory last). A crash in between
//! leaves a state that `verify` reports as a structural inconsistency.
//!
//! Every slot a mutation will allocate is counted and checked against the
//! address limit before the first write, so running out of address space
//! fails with the index untouched. The resident root is only replaced once
//! its new record has been persisted.
//!
//! Removal is not supported and always fails.

use tracing::{debug, info, trace, warn};

use crate::bisect::Bisector;
use crate::chain::Navigator;
use crate::error::{AbcError, Result};
use crate::map::{BlockCodec, Link, MapBlock, MapHeader, ROOT_ADDRESS};
use crate::root::RootDirectory;
use crate::space::AddressSpace;

/// Applies structural changes to one index
pub struct Mutator<'a, S> {
    space: &'a S,
    codec: &'a BlockCodec,
    root: &'a mut RootDirectory,
}

impl<'a, S: AddressSpace> Mutator<'a, S> {
    pub fn new(space: &'a S, codec: &'a BlockCodec, root: &'a mut RootDirectory) -> Self {
        Self { space, codec, root }
    }

    /// Extend the tail of the leaf chain with `value`
    ///
    /// `value` must be greater than the current last value.
    pub fn append(&mut self, value: u64) -> Result<()> {
        self.codec.check_value(value)?;
        if self.root.is_empty() {
            return self.plant(value);
        }

        let (address, block) = self.tail_leaf()?;
        let tail = *block
            .items
            .last()
            .ok_or_else(|| empty_map(address, 0))?;
        if value <= tail {
            return Err(AbcError::OutOfOrder { value, tail });
        }

        trace!(value, map = address, "append");
        let position = block.items.len();
        self.insert_at(address, 0, block, position, value)
    }

    /// Insert `value` at its sorted position anywhere in the leaf chain
    pub fn insert(&mut self, value: u64) -> Result<()> {
        self.codec.check_value(value)?;
        if self.root.is_empty() {
            return self.plant(value);
        }

        let floor = Bisector::new(self.space, self.codec, &*self.root).seek(value, |v, t| v.cmp(&t))?;
        let navigator = Navigator::new(self.space, self.codec);

        let (address, position) = match floor {
            Some(entry) if entry.value == value => return Err(AbcError::DuplicateValue(value)),
            Some(entry) => (entry.address, entry.position + 1),
            None => {
                // Smaller than everything: front of the head leaf
                let first = self.root.top_items()[0];
                (navigator.leftmost(first, self.root.layers() - 1)?.address, 0)
            }
        };

        trace!(value, map = address, position, "insert");
        let block = navigator.load(address, 0)?;
        self.insert_at(address, 0, block, position, value)
    }

    /// Always fails; the index state is left untouched
    pub fn remove(&self, value: u64) -> Result<()> {
        warn!(value, "rejected removal");
        Err(AbcError::UnsupportedOperation(format!(
            "cannot remove {}: removal is not supported",
            value
        )))
    }

    // =========================================================================
    // Structural Changes
    // =========================================================================

    /// First value of an empty index: one leaf under a one-layer root
    fn plant(&mut self, value: u64) -> Result<()> {
        let address = self.allocate()?;
        self.write_map(address, 0, &MapBlock::lone(ROOT_ADDRESS, vec![value]))?;

        let mut root = RootDirectory::default();
        root.replace(1, vec![address]);
        self.commit_root(root)?;

        info!(map = address, "planted first leaf");
        Ok(())
    }

    /// Put `item` at `position` of the map at `address`, splitting upward as
    /// long as maps overflow
    fn insert_at(
        &mut self,
        mut address: u64,
        mut level: u8,
        mut block: MapBlock,
        mut position: usize,
        mut item: u64,
    ) -> Result<()> {
        let navigator = Navigator::new(self.space, self.codec);
        self.reserve(self.slots_needed(&block, level)?)?;

        loop {
            block.items.insert(position, item);
            if block.items.len() <= self.codec.fanout(level) {
                return self.write_map(address, level, &block);
            }

            let sibling = self.split(address, level, &mut block, position)?;

            if level + 1 == self.root.layers() {
                return self.insert_top(address, sibling);
            }

            let parent = block.header.parent;
            let parent_block = navigator.load(parent, level + 1)?;
            let slot = parent_block
                .items
                .iter()
                .position(|&child| child == address)
                .ok_or_else(|| {
                    AbcError::StructuralInconsistency(format!(
                        "map {:#x} names {:#x} as parent, which does not reference it",
                        address, parent
                    ))
                })?;

            address = parent;
            level += 1;
            block = parent_block;
            position = slot + 1;
            item = sibling;
        }
    }

    /// Cut the overflowing `block` in two; returns the new sibling's address
    fn split(&mut self, address: u64, level: u8, block: &mut MapBlock, position: usize) -> Result<u64> {
        let keep = split_point(block.items.len(), position, self.codec.fanout(level));
        let suffix = block.items.split_off(keep);

        let sibling = self.allocate()?;
        let old_next = block.header.next;
        let sibling_block = MapBlock {
            header: MapHeader {
                previous: Link::Map(address),
                parent: block.header.parent,
                next: old_next,
                count: 0,
            },
            items: suffix,
        };
        self.write_map(sibling, level, &sibling_block)?;

        if let Link::Map(successor) = old_next {
            self.update_header(successor, |header| header.previous = Link::Map(sibling))?;
        }

        block.header.next = Link::Map(sibling);
        self.write_map(address, level, block)?;

        if level > 0 {
            self.adopt(&sibling_block.items, sibling)?;
        }

        debug!(
            level,
            map = address,
            sibling,
            kept = block.items.len(),
            moved = sibling_block.items.len(),
            "split map"
        );
        Ok(sibling)
    }

    /// Register `sibling` after `existing` in the root, growing a layer on overflow
    fn insert_top(&mut self, existing: u64, sibling: u64) -> Result<()> {
        let mut top = self.root.clone();
        let index = top.insert_after(existing, sibling)?;
        if top.len() <= self.codec.root_fanout() {
            return self.commit_root(top);
        }

        let appended = index + 1 == top.len();
        self.grow(top.top_items().to_vec(), appended)
    }

    /// Move the overflowing root items into two new maps under a new top layer
    fn grow(&mut self, mut left_items: Vec<u64>, appended: bool) -> Result<()> {
        let level = self.root.layers();
        let layers = level.checked_add(1).ok_or(AbcError::LayerLimit)?;

        let keep = if appended {
            self.codec.root_fanout()
        } else {
            left_items.len().div_ceil(2)
        };
        let right_items = left_items.split_off(keep);

        let left = self.allocate()?;
        let right = self.allocate()?;

        let left_block = MapBlock {
            header: MapHeader {
                previous: Link::Boundary,
                parent: ROOT_ADDRESS,
                next: Link::Map(right),
                count: 0,
            },
            items: left_items,
        };
        let right_block = MapBlock {
            header: MapHeader {
                previous: Link::Map(left),
                parent: ROOT_ADDRESS,
                next: Link::Boundary,
                count: 0,
            },
            items: right_items,
        };
        self.write_map(left, level, &left_block)?;
        self.write_map(right, level, &right_block)?;
        self.adopt(&left_block.items, left)?;
        self.adopt(&right_block.items, right)?;

        let mut root = RootDirectory::default();
        root.replace(layers, vec![left, right]);
        self.commit_root(root)?;

        info!(layers, left, right, "added resident layer");
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Last leaf map, reached by following the last item at every layer
    fn tail_leaf(&self) -> Result<(u64, MapBlock)> {
        let navigator = Navigator::new(self.space, self.codec);
        let mut level = self.root.layers() - 1;
        let mut address = *self
            .root
            .top_items()
            .last()
            .ok_or_else(|| empty_map(ROOT_ADDRESS, self.root.layers()))?;

        loop {
            let block = navigator.load(address, level)?;
            if level == 0 {
                return Ok((address, block));
            }
            address = *block.items.last().ok_or_else(|| empty_map(address, level))?;
            level -= 1;
        }
    }

    /// Slots an insert into `block` (at `level`, not yet modified) will
    /// allocate: one per overflowing map on the way up, two more if the root
    /// grows a layer
    fn slots_needed(&self, block: &MapBlock, level: u8) -> Result<u64> {
        let navigator = Navigator::new(self.space, self.codec);
        let mut level = level;
        let mut len = block.items.len() + 1;
        let mut parent = block.header.parent;
        let mut needed = 0;

        while len > self.codec.fanout(level) {
            needed += 1;
            if level + 1 == self.root.layers() {
                if self.root.len() + 1 > self.codec.root_fanout() {
                    if self.root.layers() == u8::MAX {
                        return Err(AbcError::LayerLimit);
                    }
                    needed += 2;
                }
                break;
            }

            let above = navigator.load(parent, level + 1)?;
            len = above.items.len() + 1;
            parent = above.header.parent;
            level += 1;
        }
        Ok(needed)
    }

    /// Fail unless `count` more slots fit below the address limit
    fn reserve(&self, count: u64) -> Result<()> {
        if count > 0 {
            self.free_slot(count - 1)?;
        }
        Ok(())
    }

    /// Reserve the next free slot by writing it zeroed
    fn allocate(&self) -> Result<u64> {
        let slot = self.codec.slot_len();
        let address = self.free_slot(0)?;

        self.space
            .write_with(address, slot, |window| window.fill(0, window.len(), 0))?;
        Ok(address)
    }

    /// Address of the free slot `skip` slots past the next one
    fn free_slot(&self, skip: u64) -> Result<u64> {
        let slot = self.codec.slot_len();
        let limit = self.codec.address_limit();
        let start = self.space.extent()?.max(self.codec.first_slot());

        start
            .div_ceil(slot)
            .checked_add(skip)
            .and_then(|index| index.checked_mul(slot))
            .filter(|&address| address < limit)
            .ok_or(AbcError::AddressSpaceExhausted {
                requested: start,
                limit,
            })
    }

    /// Persist `root`, then make it the resident root
    fn commit_root(&mut self, root: RootDirectory) -> Result<()> {
        root.persist(self.space, self.codec)?;
        *self.root = root;
        Ok(())
    }

    fn write_map(&self, address: u64, level: u8, block: &MapBlock) -> Result<()> {
        self.space
            .write_with(address, self.codec.map_len(level), |window| {
                self.codec.encode_map(window, block, level)
            })
    }

    /// Read-modify-write of a map header only
    fn update_header<F>(&self, address: u64, change: F) -> Result<()>
    where
        F: FnOnce(&mut MapHeader),
    {
        let len = self.codec.header_len() as u64;
        self.space.write_with(address, len, |window| {
            let mut header = self.codec.decode_header(window)?;
            change(&mut header);
            self.codec.encode_header(window, &header)
        })
    }

    /// Point `Super` of every child at `parent`
    fn adopt(&self, children: &[u64], parent: u64) -> Result<()> {
        for &child in children {
            self.update_header(child, |header| header.parent = parent)?;
        }
        Ok(())
    }
}

/// How many of `len` items the original map keeps after an insert at `position`
fn split_point(len: usize, position: usize, fanout: usize) -> usize {
    if position + 1 == len {
        fanout
    } else {
        len.div_ceil(2)
    }
}

fn empty_map(address: u64, level: u8) -> AbcError {
    AbcError::MalformedBlock(format!("map {:#x} at level {} holds no items", address, level))
}
