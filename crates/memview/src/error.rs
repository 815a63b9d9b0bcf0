//! Error types for cursor, transport and directory operations.

use std::fmt;

use thiserror::Error;

use crate::region::Region;

/// Which access a cursor operation was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOp {
    Read,
    Write,
}

impl fmt::Display for AccessOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessOp::Read => write!(f, "read"),
            AccessOp::Write => write!(f, "write"),
        }
    }
}

/// Errors surfaced by the cursor data path.
///
/// Boundary clamping never raises: a transfer cut short at a region edge is
/// an ordinary return value. A blocked access — no mapped region, a missing
/// permission, or a refused transfer — is the single coarse
/// [`CursorError::Unavailable`] signal, kept distinct from a successful
/// zero-length result. Only structurally unsupported operations are hard
/// failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// No mapped region contains the cursor, the region lacks the required
    /// permission, or the backing transport refused the transfer.
    #[error("memory at {address:#x} is not available for {op}")]
    Unavailable { op: AccessOp, address: u64 },

    /// The operation has no meaning for a memory cursor.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// No operating-system descriptor backs a memory cursor.
    #[error("no file descriptor associated with this memory cursor")]
    NoDescriptor,
}

impl CursorError {
    /// Create an [`CursorError::Unavailable`] for `op` at `address`.
    pub fn unavailable(op: AccessOp, address: u64) -> Self {
        CursorError::Unavailable { op, address }
    }
}

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors reported by a backing target's transport.
#[derive(Error, Debug)]
pub enum TargetError {
    /// The remote side refused or could not complete the transfer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// I/O error on the channel to the target.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for backing-target transfers.
pub type TargetResult<T> = Result<T, TargetError>;

/// Errors maintaining a region directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionMapError {
    /// The new region intersects one already in the directory.
    #[error("region {new_base:#x}+{new_size:#x} overlaps mapped region {existing_base:#x}+{existing_size:#x}")]
    Overlap {
        new_base: u64,
        new_size: u64,
        existing_base: u64,
        existing_size: u64,
    },
}

impl RegionMapError {
    /// Create an [`RegionMapError::Overlap`] from the two conflicting regions.
    pub fn overlap(new: &Region, existing: &Region) -> Self {
        RegionMapError::Overlap {
            new_base: new.base,
            new_size: new.size,
            existing_base: existing.base,
            existing_size: existing.size,
        }
    }
}

/// A permission string was not of the `rwx`/`rw-` form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid permission string {0:?}")]
pub struct ParsePermsError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = CursorError::unavailable(AccessOp::Read, 0x9999);
        assert!(err.to_string().contains("0x9999"));
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn test_overlap_display() {
        use crate::region::Perms;
        let a = Region::new(0x1000, 0x10, Perms::READ);
        let b = Region::new(0x1008, 0x10, Perms::READ);
        let err = RegionMapError::overlap(&b, &a);
        assert!(err.to_string().contains("0x1008"));
        assert!(err.to_string().contains("0x1000"));
    }
}
