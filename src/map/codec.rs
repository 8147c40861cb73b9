//! Block codec
//!
//! Stateless translation between a window and map fields. Every offset is
//! relative to the window start, which is the map's own address.

use crate::config::{all_ones, Config};
use crate::error::{AbcError, Result};
use crate::space::Window;

use super::{Link, MapBlock, MapHeader};

/// Encodes and decodes maps for one layout
#[derive(Debug, Clone)]
pub struct BlockCodec {
    address_width: u8,
    value_width: u8,
    fanout: usize,
    leaf_fanout: usize,
    /// Offset of item 0 (`hdr_end`)
    header_len: usize,
    slot_len: u64,
    first_slot: u64,
    address_limit: u64,
}

impl BlockCodec {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            address_width: config.address_width,
            value_width: config.value_width,
            fanout: config.fanout as usize,
            leaf_fanout: config.leaf_fanout as usize,
            header_len: config.header_len() as usize,
            slot_len: config.slot_len(),
            first_slot: config.first_slot(),
            address_limit: config.address_limit(),
        })
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn address_width(&self) -> u8 {
        self.address_width
    }

    pub fn value_width(&self) -> u8 {
        self.value_width
    }

    /// Bytes per item at `level`
    pub fn item_width(&self, level: u8) -> u8 {
        if level == 0 {
            self.value_width
        } else {
            self.address_width
        }
    }

    /// Max items per map at `level`
    pub fn fanout(&self, level: u8) -> usize {
        if level == 0 {
            self.leaf_fanout
        } else {
            self.fanout
        }
    }

    /// Fan-out of the root directory
    pub fn root_fanout(&self) -> usize {
        self.fanout
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Bytes a full map at `level` occupies
    pub fn map_len(&self, level: u8) -> u64 {
        self.header_len as u64 + self.fanout(level) as u64 * self.item_width(level) as u64
    }

    pub fn slot_len(&self) -> u64 {
        self.slot_len
    }

    pub fn first_slot(&self) -> u64 {
        self.first_slot
    }

    /// All-one address; no map may start here or beyond
    pub fn address_limit(&self) -> u64 {
        self.address_limit
    }

    /// Reject values wider than the leaf item width
    pub fn check_value(&self, value: u64) -> Result<()> {
        if value > all_ones(self.value_width) {
            return Err(AbcError::ValueTooWide {
                value,
                width: self.value_width,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Header
    // =========================================================================

    /// Read `Previous`, `Super`, `Next` and `Count`
    pub fn decode_header(&self, window: &Window) -> Result<MapHeader> {
        let a = self.address_width as usize;

        let previous = match window.read_uint(0, self.address_width)? {
            0 => Link::Boundary,
            address => Link::Map(address),
        };
        let parent = window.read_uint(a, self.address_width)?;
        let next = match window.read_uint(2 * a, self.address_width)? {
            address if address == self.address_limit => Link::Boundary,
            address => Link::Map(address),
        };
        let count = window.read_uint(3 * a, 1)? as u8;

        Ok(MapHeader {
            previous,
            parent,
            next,
            count,
        })
    }

    pub fn encode_header(&self, window: &mut Window, header: &MapHeader) -> Result<()> {
        let a = self.address_width as usize;

        let previous = match header.previous {
            Link::Boundary => 0,
            Link::Map(address) => self.check_link(address)?,
        };
        let next = match header.next {
            Link::Boundary => self.address_limit,
            Link::Map(address) => self.check_link(address)?,
        };

        window.write_uint(0, self.address_width, previous)?;
        window.write_uint(a, self.address_width, header.parent)?;
        window.write_uint(2 * a, self.address_width, next)?;
        window.write_uint(3 * a, 1, header.count as u64)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Read item `index`; its width depends on whether `level` is the leaf layer
    pub fn decode_item(&self, window: &Window, index: usize, level: u8) -> Result<u64> {
        let width = self.item_width(level);
        window.read_uint(self.item_offset(index, width)?, width)
    }

    pub fn encode_item(&self, window: &mut Window, index: usize, level: u8, item: u64) -> Result<()> {
        let width = self.item_width(level);
        if level == 0 {
            self.check_value(item)?;
        }
        window.write_uint(self.item_offset(index, width)?, width, item)
    }

    // =========================================================================
    // Whole Maps
    // =========================================================================

    /// Decode header and live items, rejecting counts beyond the layer's fan-out
    pub fn decode_map(&self, window: &Window, level: u8) -> Result<MapBlock> {
        let header = self.decode_header(window)?;
        let count = header.count as usize;
        if count > self.fanout(level) {
            return Err(AbcError::MalformedBlock(format!(
                "map {:#x} at level {} holds {} items, fanout is {}",
                window.offset(),
                level,
                count,
                self.fanout(level)
            )));
        }

        let items = (0..count)
            .map(|index| self.decode_item(window, index, level))
            .collect::<Result<Vec<_>>>()?;

        Ok(MapBlock { header, items })
    }

    /// Write a map with `Count` taken from its item list; unused item slots are zeroed
    pub fn encode_map(&self, window: &mut Window, block: &MapBlock, level: u8) -> Result<()> {
        let count = block.items.len();
        if count > self.fanout(level) {
            return Err(AbcError::MalformedBlock(format!(
                "{} items exceed fanout {} at level {}",
                count,
                self.fanout(level),
                level
            )));
        }

        let header = MapHeader {
            count: count as u8,
            ..block.header
        };
        self.encode_header(window, &header)?;

        for (index, &item) in block.items.iter().enumerate() {
            self.encode_item(window, index, level, item)?;
        }

        let used = self.header_len + count * self.item_width(level) as usize;
        if window.len() > used {
            window.fill(used, window.len() - used, 0)?;
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn item_offset(&self, index: usize, width: u8) -> Result<usize> {
        index
            .checked_mul(width as usize)
            .and_then(|off| off.checked_add(self.header_len))
            .ok_or_else(|| AbcError::MalformedBlock(format!("item index {} overflows", index)))
    }

    /// A link may name neither the root nor the tail sentinel
    fn check_link(&self, address: u64) -> Result<u64> {
        if address == 0 || address >= self.address_limit {
            return Err(AbcError::MalformedBlock(format!(
                "chain link {:#x} collides with a sentinel",
                address
            )));
        }
        Ok(address)
    }
}
