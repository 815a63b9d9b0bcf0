//! A seekable read/write cursor over a target's mapped memory.
//!
//! The cursor exposes a target's possibly non-uniform address space through
//! a conventional file-like surface. Every access resolves the region
//! containing the current position at call time, gates on that region's
//! permissions and clamps the transfer so it never crosses the region's
//! upper bound. Positions outside any mapped region are legal to seek to;
//! accesses made there report [`CursorError::Unavailable`].

use std::fmt;

use tracing::{debug, trace};

use crate::error::{AccessOp, CursorError, CursorResult};
use crate::region::Region;
use crate::traits::MemoryTarget;

/// Where a [`MemoryCursor::seek`] should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTo {
    /// Position at this address.
    Absolute(u64),
    /// Displace the current position by a signed amount, saturating at the
    /// bounds of the address space.
    Relative(i64),
    /// Position at the end of the mapped address space, as reported by the
    /// target.
    FromEnd,
}

/// How much a [`MemoryCursor::read`] should ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadLen {
    /// Read up to the end of the region containing the cursor.
    ToRegionEnd,
    /// Read at most this many bytes.
    AtMost(usize),
}

impl From<usize> for ReadLen {
    fn from(len: usize) -> Self {
        ReadLen::AtMost(len)
    }
}

/// A stateful cursor into the memory of a target.
///
/// The only state owned by the cursor is its byte offset; the target behind
/// it provides the region directory and the transfer transport. Transfers
/// are confined to the single region containing the offset at the moment of
/// the call, so a result shorter than requested is ordinary proximity to a
/// region boundary, not an error.
pub struct MemoryCursor<'t> {
    target: &'t dyn MemoryTarget,
    offset: u64,
}

impl<'t> MemoryCursor<'t> {
    /// Cursor over `target`, positioned at address 0.
    pub fn new(target: &'t dyn MemoryTarget) -> Self {
        MemoryCursor::with_offset(target, 0)
    }

    /// Cursor over `target`, positioned at `offset`.
    pub fn with_offset(target: &'t dyn MemoryTarget, offset: u64) -> Self {
        MemoryCursor { target, offset }
    }

    /// Current position.
    pub fn tell(&self) -> u64 {
        self.offset
    }

    /// The region of the target's memory map containing the current
    /// position.
    ///
    /// Resolved fresh on every call; the map may have changed since the
    /// last access.
    pub fn region(&self) -> Option<Region> {
        self.target.resolve_region(self.offset)
    }

    /// Whether the current position sits in a region permitting reads.
    pub fn is_readable(&self) -> bool {
        self.region().is_some_and(|region| region.is_readable())
    }

    /// Whether the current position sits in a region permitting writes.
    pub fn is_writable(&self) -> bool {
        self.region().is_some_and(|region| region.is_writable())
    }

    /// Positioning is always permitted, whatever the mapping state.
    pub fn seekable(&self) -> bool {
        true
    }

    /// Move the cursor and return the resulting position.
    ///
    /// No bounds validation happens here. An out-of-range position is legal
    /// and simply yields unavailable accesses later; validity is enforced at
    /// access time because the target's map can change between the seek and
    /// the access that follows it.
    pub fn seek(&mut self, to: SeekTo) -> u64 {
        self.offset = match to {
            SeekTo::Absolute(offset) => offset,
            SeekTo::Relative(delta) => self.offset.saturating_add_signed(delta),
            SeekTo::FromEnd => self.target.address_space_end(),
        };
        trace!("seek to {:#x}", self.offset);
        self.offset
    }

    /// Read from the current position.
    ///
    /// The request is clamped to the containing region, and the position
    /// advances by the number of bytes the transport actually returned —
    /// which may be fewer than the clamped length, but never leaves unread
    /// bytes silently skipped.
    pub fn read(&mut self, len: impl Into<ReadLen>) -> CursorResult<Vec<u8>> {
        let len = len.into();
        let region = match self.region() {
            Some(region) if region.is_readable() => region,
            _ => {
                debug!("read at {:#x} blocked: no readable region", self.offset);
                return Err(CursorError::unavailable(AccessOp::Read, self.offset));
            }
        };

        let remaining = region.remaining_from(self.offset);
        let want = match len {
            ReadLen::ToRegionEnd => remaining,
            ReadLen::AtMost(n) => remaining.min(n as u64),
        };
        let want = usize::try_from(want).unwrap_or(usize::MAX);

        let mut bytes = match self.target.read_bytes(self.offset, want) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("transport failed reading {} bytes at {:#x}: {}", want, self.offset, err);
                return Err(CursorError::unavailable(AccessOp::Read, self.offset));
            }
        };
        // The transport may return fewer bytes; more would breach the
        // region clamp.
        bytes.truncate(want);

        self.offset += bytes.len() as u64;
        trace!("read {} bytes, cursor now at {:#x}", bytes.len(), self.offset);
        Ok(bytes)
    }

    /// Read from the current position to the end of the containing region.
    pub fn read_to_region_end(&mut self) -> CursorResult<Vec<u8>> {
        self.read(ReadLen::ToRegionEnd)
    }

    /// Read into the front of `buf`, returning the number of bytes copied.
    ///
    /// The count can be less than `buf.len()` near a region end or on a
    /// short transport return.
    pub fn read_into(&mut self, buf: &mut [u8]) -> CursorResult<usize> {
        let bytes = self.read(ReadLen::AtMost(buf.len()))?;
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Write `data` at the current position.
    ///
    /// The transfer is truncated at the containing region's upper bound and
    /// the count of accepted bytes returned. A transport failure leaves the
    /// position unchanged.
    pub fn write(&mut self, data: &[u8]) -> CursorResult<usize> {
        let region = match self.region() {
            Some(region) if region.is_writable() => region,
            _ => {
                debug!("write at {:#x} blocked: no writable region", self.offset);
                return Err(CursorError::unavailable(AccessOp::Write, self.offset));
            }
        };

        let remaining = region.remaining_from(self.offset);
        let accepted = (data.len() as u64).min(remaining) as usize;

        if let Err(err) = self.target.write_bytes(self.offset, &data[..accepted]) {
            debug!("transport failed writing {} bytes at {:#x}: {}", accepted, self.offset, err);
            return Err(CursorError::unavailable(AccessOp::Write, self.offset));
        }

        self.offset += accepted as u64;
        trace!("wrote {} bytes, cursor now at {:#x}", accepted, self.offset);
        Ok(accepted)
    }

    /// No-op; this layer buffers nothing.
    pub fn flush(&mut self) {}

    /// Memory regions have a fixed extent; always fails.
    pub fn truncate(&mut self) -> CursorResult<()> {
        Err(CursorError::Unsupported("truncate"))
    }

    /// No operating-system descriptor backs a cursor; always fails.
    pub fn file_descriptor(&self) -> CursorResult<i32> {
        Err(CursorError::NoDescriptor)
    }

    /// A cursor is never an interactive terminal.
    pub fn is_interactive(&self) -> bool {
        false
    }
}

impl fmt::Debug for MemoryCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCursor")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
