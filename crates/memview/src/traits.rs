//! The capability seam between a cursor and the target behind it.

use crate::cursor::MemoryCursor;
use crate::error::TargetResult;
use crate::region::Region;

/// Everything a [`MemoryCursor`] needs from the target it inspects.
///
/// The trait bundles the target's region-directory lookup with its raw
/// transport. Implementations are free to service it however they like — a
/// live debug stub, an emulator, or plain host memory such as
/// [`RamTarget`](crate::ram::RamTarget). The cursor never owns the target;
/// it holds a shared reference for as long as it lives.
pub trait MemoryTarget {
    /// The region containing `address`, if the target's memory map has one.
    ///
    /// Called on every access. Implementations must reflect the current map,
    /// since regions may be mapped or unmapped between calls.
    fn resolve_region(&self, address: u64) -> Option<Region>;

    /// Read up to `length` bytes starting at `address`.
    ///
    /// May return fewer bytes than requested, never more.
    fn read_bytes(&self, address: u64, length: usize) -> TargetResult<Vec<u8>>;

    /// Write `data` at `address`. All-or-nothing at this seam.
    fn write_bytes(&self, address: u64, data: &[u8]) -> TargetResult<()>;

    /// Exclusive upper bound of the mapped address space, used by
    /// end-relative seeks.
    fn address_space_end(&self) -> u64;

    /// A cursor over this target, positioned at address 0.
    fn memory(&self) -> MemoryCursor<'_>
    where
        Self: Sized,
    {
        MemoryCursor::new(self)
    }

    /// A cursor over this target, positioned at `offset`.
    fn memory_at(&self, offset: u64) -> MemoryCursor<'_>
    where
        Self: Sized,
    {
        MemoryCursor::with_offset(self, offset)
    }
}
