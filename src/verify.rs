//! Structural audit
//!
//! Walks every layer top-down and checks that the chains, the parent item
//! lists and the `Super` pointers all describe the same tree. This is the
//! way to detect a split that was interrupted halfway.

use crate::chain::Navigator;
use crate::error::{AbcError, Result};
use crate::map::{BlockCodec, Link, ROOT_ADDRESS};
use crate::root::RootDirectory;
use crate::space::AddressSpace;

/// Shape of a verified index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub layers: u8,
    /// Map count per level, leaf layer first
    pub maps_per_level: Vec<usize>,
    /// Number of leaf values
    pub values: u64,
}

impl IndexStats {
    /// Total number of maps, excluding the root directory
    pub fn maps(&self) -> usize {
        self.maps_per_level.iter().sum()
    }
}

/// Check every map reachable from the root
///
/// Per map: non-empty, `Count` within fan-out, `Super` equal to the map that
/// lists it, and `Previous`/`Next` equal to its neighbours in the
/// concatenated item lists of the layer above (with sentinels at both ends).
/// Leaf values must ascend strictly across the whole chain.
pub fn verify<S: AddressSpace>(
    space: &S,
    codec: &BlockCodec,
    root: &RootDirectory,
) -> Result<IndexStats> {
    if root.is_empty() {
        return Ok(IndexStats::default());
    }

    let navigator = Navigator::new(space, codec);
    let layers = root.layers();
    let mut maps_per_level = vec![0; layers as usize];
    let mut values = 0u64;
    let mut last_value: Option<u64> = None;

    // (map, parent) pairs in chain order for the level being checked
    let mut expected: Vec<(u64, u64)> = root
        .top_items()
        .iter()
        .map(|&address| (address, ROOT_ADDRESS))
        .collect();

    for level in (0..layers).rev() {
        let mut below = Vec::new();
        let mut previous = Link::Boundary;

        for (i, &(address, parent)) in expected.iter().enumerate() {
            let block = navigator.load(address, level)?;

            if block.items.is_empty() {
                return Err(inconsistent(address, level, "holds no items"));
            }
            if block.header.parent != parent {
                return Err(inconsistent(
                    address,
                    level,
                    &format!("names {:#x} as parent, listed by {:#x}", block.header.parent, parent),
                ));
            }
            if block.header.previous != previous {
                return Err(inconsistent(
                    address,
                    level,
                    &format!("links back to {:?}, expected {:?}", block.header.previous, previous),
                ));
            }
            let next = expected
                .get(i + 1)
                .map(|&(address, _)| Link::Map(address))
                .unwrap_or(Link::Boundary);
            if block.header.next != next {
                return Err(inconsistent(
                    address,
                    level,
                    &format!("links forward to {:?}, expected {:?}", block.header.next, next),
                ));
            }

            if level == 0 {
                for &value in &block.items {
                    if let Some(last) = last_value {
                        if value <= last {
                            return Err(inconsistent(
                                address,
                                level,
                                &format!("value {} does not follow {}", value, last),
                            ));
                        }
                    }
                    last_value = Some(value);
                    values += 1;
                }
            } else {
                below.extend(block.items.iter().map(|&child| (child, address)));
            }

            previous = Link::Map(address);
        }

        maps_per_level[level as usize] = expected.len();
        expected = below;
    }

    Ok(IndexStats {
        layers,
        maps_per_level,
        values,
    })
}

fn inconsistent(address: u64, level: u8, detail: &str) -> AbcError {
    AbcError::StructuralInconsistency(format!("map {:#x} at level {} {}", address, level, detail))
}
