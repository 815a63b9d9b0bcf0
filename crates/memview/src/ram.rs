//! An in-memory target backed by a plain byte buffer.
//!
//! Scaffolding for embedding code and tests. The region map and the buffer
//! sit behind locks, so regions can be mapped and unmapped through a shared
//! reference while cursors are live — the same shape as a debug target whose
//! memory map changes underneath open cursors.

use parking_lot::RwLock;

use crate::error::{RegionMapError, TargetError, TargetResult};
use crate::region::{Region, RegionMap};
use crate::traits::MemoryTarget;

/// A [`MemoryTarget`] serving transfers from a host-memory buffer.
///
/// The buffer models the target's backing store from address 0 upward. A
/// region may describe more address space than the buffer holds: reads
/// short-read at the buffer end and writes beyond it fail, mirroring a
/// remote transport that returns less than asked or refuses a transfer.
pub struct RamTarget {
    mem: RwLock<Vec<u8>>,
    map: RwLock<RegionMap>,
}

impl RamTarget {
    /// Target with a zeroed buffer of `size` bytes and an empty region map.
    pub fn new(size: usize) -> Self {
        RamTarget {
            mem: RwLock::new(vec![0; size]),
            map: RwLock::new(RegionMap::new()),
        }
    }

    /// Target whose buffer is initialized from `contents`.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        RamTarget {
            mem: RwLock::new(contents.into()),
            map: RwLock::new(RegionMap::new()),
        }
    }

    /// Add a region to the target's memory map.
    pub fn map_region(&self, region: Region) -> Result<(), RegionMapError> {
        self.map.write().insert(region)
    }

    /// Remove the region based at `base`, returning it if present.
    pub fn unmap_region(&self, base: u64) -> Option<Region> {
        self.map.write().remove(base)
    }

    /// Size of the backing buffer in bytes.
    pub fn len(&self) -> usize {
        self.mem.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.read().is_empty()
    }
}

impl MemoryTarget for RamTarget {
    fn resolve_region(&self, address: u64) -> Option<Region> {
        self.map.read().resolve(address).copied()
    }

    fn read_bytes(&self, address: u64, length: usize) -> TargetResult<Vec<u8>> {
        let mem = self.mem.read();
        let len = mem.len() as u64;
        let start = address.min(len) as usize;
        let end = address.saturating_add(length as u64).min(len) as usize;
        Ok(mem[start..end].to_vec())
    }

    fn write_bytes(&self, address: u64, data: &[u8]) -> TargetResult<()> {
        let mut mem = self.mem.write();
        let end = address.saturating_add(data.len() as u64);
        if end > mem.len() as u64 {
            return Err(TargetError::Transport(format!(
                "write of {} bytes at {address:#x} exceeds the backing store",
                data.len()
            )));
        }
        let start = address as usize;
        mem[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn address_space_end(&self) -> u64 {
        self.map.read().end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cursor::SeekTo;
    use crate::error::{AccessOp, CursorError};
    use crate::region::Perms;

    #[test]
    fn test_roundtrip_through_cursor() {
        let target = RamTarget::new(0x20);
        target.map_region(Region::new(0, 0x20, Perms::RW)).unwrap();

        let mut cursor = target.memory_at(4);
        assert_eq!(cursor.write(b"hello").unwrap(), 5);
        assert_eq!(cursor.tell(), 9);

        cursor.seek(SeekTo::Absolute(4));
        assert_eq!(cursor.read(5).unwrap(), b"hello");
    }

    #[test]
    fn test_short_read_at_buffer_end() {
        // The region claims more address space than the buffer backs.
        let target = RamTarget::with_contents(vec![0x55; 0x20]);
        target.map_region(Region::new(0, 0x40, Perms::READ)).unwrap();

        let mut cursor = target.memory();
        let bytes = cursor.read_to_region_end().unwrap();
        assert_eq!(bytes.len(), 0x20);
        // Advanced by what the transport returned, not the clamped request.
        assert_eq!(cursor.tell(), 0x20);
    }

    #[test]
    fn test_write_beyond_buffer_fails_and_keeps_position() {
        let target = RamTarget::new(0x20);
        target.map_region(Region::new(0, 0x40, Perms::RW)).unwrap();

        let mut cursor = target.memory_at(0x1e);
        assert_eq!(
            cursor.write(b"12345678"),
            Err(CursorError::unavailable(AccessOp::Write, 0x1e))
        );
        assert_eq!(cursor.tell(), 0x1e);
    }

    #[test]
    fn test_region_resolved_fresh_on_every_access() {
        let target = RamTarget::new(0x20);
        target.map_region(Region::new(0, 0x10, Perms::READ)).unwrap();

        let mut cursor = target.memory_at(4);
        assert!(cursor.is_readable());
        assert!(cursor.read(4).is_ok());

        // Unmapping underneath the live cursor takes effect immediately.
        target.unmap_region(0).unwrap();
        assert!(!cursor.is_readable());
        assert!(cursor.read(4).is_err());

        // Remapping with different permissions does too.
        target.map_region(Region::new(0, 0x10, Perms::RW)).unwrap();
        assert!(cursor.is_writable());
        assert_eq!(cursor.write(b"ok").unwrap(), 2);
    }

    #[test]
    fn test_address_space_end_follows_map() {
        let target = RamTarget::new(0x10);
        assert_eq!(target.address_space_end(), 0);

        target
            .map_region(Region::new(0x100, 0x10, Perms::READ))
            .unwrap();
        let mut cursor = target.memory();
        assert_eq!(cursor.seek(SeekTo::FromEnd), 0x110);

        target.unmap_region(0x100).unwrap();
        assert_eq!(cursor.seek(SeekTo::FromEnd), 0);
    }

    #[test]
    fn test_overlapping_map_rejected() {
        let target = RamTarget::new(0x20);
        target.map_region(Region::new(0, 0x10, Perms::READ)).unwrap();
        assert!(target.map_region(Region::new(8, 0x10, Perms::READ)).is_err());
    }
}
