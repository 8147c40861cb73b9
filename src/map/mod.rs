//! Map Module
//!
//! One map per block: a node of a chain at some layer.
//!
//! ## Block Format
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬───────────┬──────────────────────┐
//! │ Previous (a) │ Super (a)    │ Next (a)     │ Count (1) │ Items[0..Count)      │
//! └──────────────┴──────────────┴──────────────┴───────────┴──────────────────────┘
//!   a = address width. Items are addresses (a bytes) above the leaf
//!   layer and values (value width bytes) at layer 0.
//!   Previous all-zero  = chain head
//!   Next     all-one   = chain tail
//! ```

mod codec;

pub use codec::BlockCodec;

/// Address of the root directory; a `Super` of 0 means "referenced by the root"
pub const ROOT_ADDRESS: u64 = 0;

/// A decoded `Previous` or `Next` pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Neighbouring map at the same layer
    Map(u64),

    /// No neighbour in this direction (head or tail sentinel)
    Boundary,
}

impl Link {
    /// The neighbour's address, if any
    pub fn address(self) -> Option<u64> {
        match self {
            Link::Map(address) => Some(address),
            Link::Boundary => None,
        }
    }

    pub fn is_boundary(self) -> bool {
        self == Link::Boundary
    }
}

/// Fixed-size part of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub previous: Link,
    /// `Super`: map one layer up whose item list references this map
    pub parent: u64,
    pub next: Link,
    pub count: u8,
}

/// A fully decoded map: header plus its live items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapBlock {
    pub header: MapHeader,
    /// Child addresses above layer 0, sorted values at layer 0
    pub items: Vec<u64>,
}

impl MapBlock {
    /// A single-chain map with no neighbours
    pub fn lone(parent: u64, items: Vec<u64>) -> Self {
        Self {
            header: MapHeader {
                previous: Link::Boundary,
                parent,
                next: Link::Boundary,
                count: 0,
            },
            items,
        }
    }

    pub fn is_head(&self) -> bool {
        self.header.previous.is_boundary()
    }

    pub fn is_tail(&self) -> bool {
        self.header.next.is_boundary()
    }
}
