//! # abchain
//!
//! Accelerated Bisectional Chains: a sorted index of fixed-width values that
//! keeps the append locality of a chain of sorted blocks and adds
//! `O(log_d N)` search by layering fixed fan-out index maps over it.
//! - Byte-exact, variable address width block layout
//! - Sequential navigation across map boundaries in both directions
//! - Top-down bisection using representative leaf values
//! - Append-driven growth with map splits and dynamic layer creation
//!
//! ## Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────┐
//!                     │   Root Directory (@ 0)    │  resident, layer `layers`
//!                     └─────┬───────────────┬─────┘
//!                           │               │
//!                     ┌─────▼─────┐   ┌─────▼─────┐
//!                     │   Map     │◄─►│   Map     │  layer 1: child addresses
//!                     └──┬─────┬──┘   └──┬─────┬──┘
//!                        │     │         │     │
//!                     ┌──▼┐ ┌──▼┐     ┌──▼┐ ┌──▼┐
//!                     │Map│◄►Map│◄───►│Map│◄►Map│    layer 0: sorted values
//!                     └───┘ └───┘     └───┘ └───┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use abchain::{Config, Index, MemorySpace};
//!
//! let config = Config::builder()
//!     .address_width(2)
//!     .value_width(4)
//!     .fanout(4)
//!     .leaf_fanout(4)
//!     .build()
//!     .unwrap();
//! let mut index = Index::open(MemorySpace::new(), config).unwrap();
//! for value in 1..=20 {
//!     index.append(value * 10).unwrap();
//! }
//!
//! let entry = index.find(70).unwrap().unwrap();
//! assert_eq!(entry.value, 70);
//! assert_eq!(index.advance(entry.address, entry.position).unwrap().value, 80);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod descriptor;

pub mod space;
pub mod map;
pub mod root;
pub mod chain;
pub mod bisect;
pub mod mutator;
pub mod verify;
pub mod index;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use chain::{Direction, Entry};
pub use config::{Config, SyncStrategy};
pub use error::{AbcError, Result};
pub use index::Index;
pub use space::{AddressSpace, FileSpace, MemorySpace};
pub use verify::IndexStats;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of abchain
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
