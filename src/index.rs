//! Index Module
//!
//! The public face of one ABC index bound to an address space.
//!
//! ## Responsibilities
//! - Load the root directory once at open
//! - Route lookups to the bisector and scans to the navigator
//! - Route inserts to the mutator, which persists the root before returning
//!
//! ## Concurrency Model
//! All operations are synchronous. Reads take `&self` and re-read every map
//! they touch; mutations take `&mut self`, so the borrow checker serializes
//! them against each other and against readers of the same instance.

use std::cmp::Ordering;

use tracing::info;

use crate::bisect::Bisector;
use crate::chain::{Direction, Entry, Navigator, Scan};
use crate::config::Config;
use crate::error::Result;
use crate::map::BlockCodec;
use crate::mutator::Mutator;
use crate::root::RootDirectory;
use crate::space::AddressSpace;
use crate::verify::{self, IndexStats};

/// An open index over address space `S`
pub struct Index<S: AddressSpace> {
    /// Layout parameters; must match every previous open of `space`
    config: Config,

    /// Map encoding derived from `config`
    codec: BlockCodec,

    /// Resident top layer (only cross-call mutable state)
    root: RootDirectory,

    /// Backing byte space
    space: S,
}

impl<S: AddressSpace> Index<S> {
    /// Open the index stored in `space`
    ///
    /// A never-written space reads as zero and opens as an empty index.
    pub fn open(space: S, config: Config) -> Result<Self> {
        // Step 1: Validate layout and derive the codec
        let codec = BlockCodec::new(&config)?;

        // Step 2: Load the resident root
        let root = RootDirectory::load(&space, &codec)?;

        info!(
            layers = root.layers(),
            top_items = root.len(),
            address_width = config.address_width,
            value_width = config.value_width,
            "opened index"
        );

        Ok(Self {
            config,
            codec,
            root,
            space,
        })
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Find the entry whose value compares `Equal` to `target`
    pub fn search<F>(&self, target: u64, compare: F) -> Result<Option<Entry>>
    where
        F: Fn(u64, u64) -> Ordering,
    {
        self.bisector().search(target, compare)
    }

    /// Exact lookup by natural ordering
    pub fn find(&self, value: u64) -> Result<Option<Entry>> {
        self.search(value, |candidate, target| candidate.cmp(&target))
    }

    /// Last entry not ordered after `target`; `None` if `target` precedes all
    pub fn seek<F>(&self, target: u64, compare: F) -> Result<Option<Entry>>
    where
        F: Fn(u64, u64) -> Ordering,
    {
        self.bisector().seek(target, compare)
    }

    /// Smallest value
    pub fn first(&self) -> Result<Option<Entry>> {
        match self.root.top_items().first() {
            Some(&address) => Ok(Some(self.navigator().leftmost(address, self.root.layers() - 1)?)),
            None => Ok(None),
        }
    }

    /// Largest value
    pub fn last(&self) -> Result<Option<Entry>> {
        match self.root.top_items().last() {
            Some(&address) => Ok(Some(self.navigator().rightmost(address, self.root.layers() - 1)?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Next leaf entry after (`address`, `position`)
    ///
    /// Fails with `EndOfChain` at the tail.
    pub fn advance(&self, address: u64, position: usize) -> Result<Entry> {
        self.navigator().advance(address, position, 0)
    }

    /// Previous leaf entry before (`address`, `position`)
    ///
    /// Fails with `EndOfChain` at the head.
    pub fn retreat(&self, address: u64, position: usize) -> Result<Entry> {
        self.navigator().retreat(address, position, 0)
    }

    /// Ascending scan over all values
    pub fn iter(&self) -> Result<Scan<'_, S>> {
        let start = self.first()?;
        Ok(Scan::new(self.navigator(), start, Direction::Forward))
    }

    /// Descending scan over all values
    pub fn iter_rev(&self) -> Result<Scan<'_, S>> {
        let start = self.last()?;
        Ok(Scan::new(self.navigator(), start, Direction::Backward))
    }

    /// Scan starting at `entry` (inclusive)
    pub fn iter_from(&self, entry: Entry, direction: Direction) -> Scan<'_, S> {
        Scan::new(self.navigator(), Some(entry), direction)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a value greater than the current last value
    pub fn append(&mut self, value: u64) -> Result<()> {
        self.mutator().append(value)
    }

    /// Insert a value at its sorted position
    pub fn insert(&mut self, value: u64) -> Result<()> {
        self.mutator().insert(value)
    }

    /// Always fails with `UnsupportedOperation`
    pub fn remove(&mut self, value: u64) -> Result<()> {
        self.mutator().remove(value)
    }

    /// Make all written maps durable
    pub fn flush(&self) -> Result<()> {
        self.space.sync()
    }

    /// Check the whole structure and report its shape
    pub fn verify(&self) -> Result<IndexStats> {
        verify::verify(&self.space, &self.codec, &self.root)
    }

    /// Flush and hand back the address space
    pub fn into_space(self) -> Result<S> {
        self.flush()?;
        Ok(self.space)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layers(&self) -> u8 {
        self.root.layers()
    }

    /// Addresses held by the resident root
    pub fn top_items(&self) -> &[u64] {
        self.root.top_items()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn space(&self) -> &S {
        &self.space
    }

    pub fn codec(&self) -> &BlockCodec {
        &self.codec
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn navigator(&self) -> Navigator<'_, S> {
        Navigator::new(&self.space, &self.codec)
    }

    fn bisector(&self) -> Bisector<'_, S> {
        Bisector::new(&self.space, &self.codec, &self.root)
    }

    fn mutator(&mut self) -> Mutator<'_, S> {
        Mutator::new(&self.space, &self.codec, &mut self.root)
    }
}
