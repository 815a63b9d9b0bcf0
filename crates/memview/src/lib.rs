//! Windowed cursor access to a debug target's memory.
//!
//! This crate exposes a contiguous view of a target's possibly non-uniform
//! address space — a debug stub's, an emulator's — through a conventional
//! seek/read/write cursor, as if it were a file. It provides:
//!
//! - [`Region`] and [`RegionMap`], the permission-tagged memory-map model
//!   and the directory resolving an address to the region containing it
//! - [`MemoryTarget`], the seam to the backing transport that performs the
//!   actual transfers
//! - [`MemoryCursor`], the stateful cursor that gates every access on the
//!   containing region's permissions and clamps transfers at its boundary
//! - `std::io::{Read, Write, Seek}` impls so a cursor can be handed to
//!   generic stream-consuming code
//!
//! Transfers are confined to the single region containing the cursor at the
//! moment of the call; a result shorter than requested means proximity to a
//! region boundary or a short transport return, never an error. Accesses at
//! unmapped or permission-blocked positions report
//! [`CursorError::Unavailable`], distinct from a successful empty read.
//!
//! # Example
//!
//! ```
//! use memview::{MemoryTarget, Perms, RamTarget, ReadLen, Region, SeekTo};
//!
//! let target = RamTarget::with_contents(b"\x00\x01\x02\x03\x04\x05\x06\x07".to_vec());
//! target.map_region(Region::new(0, 8, Perms::RW)).unwrap();
//!
//! let mut cursor = target.memory();
//! cursor.seek(SeekTo::Absolute(4));
//! let bytes = cursor.read(ReadLen::AtMost(16)).unwrap(); // clamped to the region
//! assert_eq!(bytes, [4, 5, 6, 7]);
//! assert_eq!(cursor.tell(), 8);
//! ```

pub mod cursor;
pub mod error;
mod io;
pub mod ram;
pub mod region;
pub mod traits;

// Re-export key types at crate root.
pub use cursor::{MemoryCursor, ReadLen, SeekTo};
pub use error::{
    AccessOp, CursorError, CursorResult, ParsePermsError, RegionMapError, TargetError,
    TargetResult,
};
pub use ram::RamTarget;
pub use region::{Perms, Region, RegionMap};
pub use traits::MemoryTarget;
