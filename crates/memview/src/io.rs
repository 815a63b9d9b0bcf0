//! `std::io` adapters for [`MemoryCursor`].
//!
//! A cursor can be handed to any code expecting a conventional byte stream.
//! An unavailable position surfaces as [`io::ErrorKind::WouldBlock`], the
//! non-blocking "no data ready" signal, which keeps it distinct from the
//! `Ok(0)` end-of-stream return.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::cursor::{MemoryCursor, SeekTo};
use crate::error::CursorError;

impl From<CursorError> for io::Error {
    fn from(err: CursorError) -> Self {
        let kind = match err {
            CursorError::Unavailable { .. } => io::ErrorKind::WouldBlock,
            CursorError::Unsupported(_) | CursorError::NoDescriptor => {
                io::ErrorKind::Unsupported
            }
        };
        io::Error::new(kind, err)
    }
}

impl Read for MemoryCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_into(buf).map_err(io::Error::from)
    }
}

impl Write for MemoryCursor<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        MemoryCursor::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        MemoryCursor::flush(self);
        Ok(())
    }
}

impl Seek for MemoryCursor<'_> {
    /// `SeekFrom::End` positions at the end of the mapped address space;
    /// its displacement is ignored.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let to = match pos {
            SeekFrom::Start(offset) => SeekTo::Absolute(offset),
            SeekFrom::Current(delta) => SeekTo::Relative(delta),
            SeekFrom::End(_) => SeekTo::FromEnd,
        };
        Ok(MemoryCursor::seek(self, to))
    }
}
