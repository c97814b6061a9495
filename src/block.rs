//! Block-aligned stream framing.
//!
//! Every header and data section of a FITS file is padded to a multiple of
//! [`BLOCK_SIZE`] bytes. [`BlockStream`] wraps a raw byte stream and keeps
//! a logical position so callers can assert alignment (invariant 1 and 7 of
//! the data model) without the underlying stream needing to expose one
//! itself — this is what lets the crate support sockets and pipes
//! alongside files and in-memory buffers.
use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Fixed FITS block size in bytes. Header and data sections are always
/// padded to a multiple of this.
pub const BLOCK_SIZE: u64 = 2880;

/// Fixed card size in bytes.
pub const CARD_SIZE: usize = 80;

/// Fill byte used to pad header sections.
pub const HEADER_FILL: u8 = b' ';

/// Fill byte used to pad data sections.
pub const DATA_FILL: u8 = 0x00;

#[derive(Debug)]
enum Backend<S> {
    /// The wrapped stream supports `Seek`; kept distinct from
    /// `ForwardOnly` mainly so a backward movement can be rejected
    /// immediately rather than silently reinterpreted as a forward skip.
    Seekable(S),
    /// The wrapped stream only supports sequential access (a socket, a
    /// pipe, stdin piped from a process). Forward movement is emulated by
    /// discarding bytes (read) or emitting fill bytes (write); backward
    /// movement is an error.
    ForwardOnly(S),
}

/// A byte stream with block-aligned positional bookkeeping layered on top.
///
/// Construct with [`BlockStream::seekable`] when the underlying stream
/// implements [`std::io::Seek`], or [`BlockStream::forward_only`] otherwise.
/// Both variants expose the same read/write/pad operations; the distinction
/// only affects whether a hypothetical backward movement is rejected.
#[derive(Debug)]
pub struct BlockStream<S> {
    backend: Backend<S>,
    pos: u64,
}

impl<S> BlockStream<S> {
    pub fn seekable(inner: S) -> Self {
        Self {
            backend: Backend::Seekable(inner),
            pos: 0,
        }
    }

    pub fn forward_only(inner: S) -> Self {
        Self {
            backend: Backend::ForwardOnly(inner),
            pos: 0,
        }
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self.backend, Backend::Seekable(_))
    }

    /// Current logical byte offset since the stream was opened.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Number of padding bytes needed to reach the next block boundary.
    pub fn remaining_in_block(&self) -> u64 {
        let rem = self.pos % BLOCK_SIZE;
        if rem == 0 {
            0
        } else {
            BLOCK_SIZE - rem
        }
    }

    fn inner(&mut self) -> &mut S {
        match &mut self.backend {
            Backend::Seekable(s) => s,
            Backend::ForwardOnly(s) => s,
        }
    }

    /// Unwrap the underlying stream, discarding the position bookkeeping.
    pub fn into_inner(self) -> S {
        match self.backend {
            Backend::Seekable(s) => s,
            Backend::ForwardOnly(s) => s,
        }
    }
}

impl<S: Read> BlockStream<S> {
    /// Read exactly `buf.len()` bytes, advancing the logical position.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner().read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    /// Discard the next `n` bytes without retaining them.
    pub fn skip_forward(&mut self, n: u64) -> Result<()> {
        let mut remaining = n;
        let mut scratch = [0u8; 4096];
        while remaining > 0 {
            let chunk = remaining.min(scratch.len() as u64) as usize;
            self.inner().read_exact(&mut scratch[..chunk])?;
            remaining -= chunk as u64;
        }
        self.pos += n;
        Ok(())
    }

    /// Skip forward to the next block boundary, discarding the bytes.
    pub fn pad_to_block_read(&mut self) -> Result<()> {
        let n = self.remaining_in_block();
        self.skip_forward(n)
    }

    /// Advance the logical position to the absolute offset `target`,
    /// discarding the bytes in between. `target` must not precede the
    /// current position: this stream is forward-only, so a backward seek
    /// is an [`Error::OutOfBounds`] rather than a no-op or a silent wrap.
    pub fn seek_forward_to_read(&mut self, target: u64) -> Result<()> {
        if target < self.pos {
            return Err(Error::OutOfBounds(
                "cannot seek backward on a forward-only stream",
            ));
        }
        self.skip_forward(target - self.pos)
    }
}

impl<S: Write> BlockStream<S> {
    /// Write `buf` verbatim, advancing the logical position.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner().write_all(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    /// Emit `n` copies of `fill`.
    pub fn fill_forward(&mut self, fill: u8, n: u64) -> Result<()> {
        let chunk = [fill; 4096];
        let mut remaining = n;
        while remaining > 0 {
            let len = remaining.min(chunk.len() as u64) as usize;
            self.inner().write_all(&chunk[..len])?;
            remaining -= len as u64;
        }
        self.pos += n;
        Ok(())
    }

    /// Pad forward to the next block boundary by emitting `fill` bytes.
    pub fn pad_to_block_write(&mut self, fill: u8) -> Result<()> {
        let n = self.remaining_in_block();
        self.fill_forward(fill, n)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner().flush()?;
        Ok(())
    }

    /// Advance the logical position to the absolute offset `target`,
    /// emitting `fill` bytes in between. `target` must not precede the
    /// current position: this stream is forward-only, so a backward seek
    /// is an [`Error::OutOfBounds`] rather than a no-op or a silent wrap.
    pub fn seek_forward_to_write(&mut self, target: u64, fill: u8) -> Result<()> {
        if target < self.pos {
            return Err(Error::OutOfBounds(
                "cannot seek backward on a forward-only stream",
            ));
        }
        self.fill_forward(fill, target - self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn pad_to_block_write_reaches_boundary() {
        let mut bs = BlockStream::seekable(Cursor::new(Vec::new()));
        bs.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(bs.remaining_in_block(), BLOCK_SIZE - 3);
        bs.pad_to_block_write(DATA_FILL).unwrap();
        assert_eq!(bs.position() % BLOCK_SIZE, 0);
        assert_eq!(bs.position(), BLOCK_SIZE);
    }

    #[test]
    fn pad_to_block_on_boundary_is_noop() {
        let mut bs = BlockStream::seekable(Cursor::new(Vec::new()));
        bs.fill_forward(0, BLOCK_SIZE).unwrap();
        let before = bs.position();
        bs.pad_to_block_write(DATA_FILL).unwrap();
        assert_eq!(bs.position(), before);
    }

    #[test]
    fn forward_only_skip_discards_bytes() {
        let data = vec![0xAAu8; 100];
        let mut bs = BlockStream::forward_only(Cursor::new(data));
        bs.skip_forward(10).unwrap();
        assert_eq!(bs.position(), 10);
        let mut buf = [0u8; 4];
        bs.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xAA; 4]);
        assert_eq!(bs.position(), 14);
    }

    #[test]
    fn seek_forward_to_read_advances_and_discards() {
        let data = vec![0xAAu8; 100];
        let mut bs = BlockStream::forward_only(Cursor::new(data));
        bs.seek_forward_to_read(20).unwrap();
        assert_eq!(bs.position(), 20);
    }

    #[test]
    fn seek_forward_to_read_rejects_backward_target() {
        let data = vec![0xAAu8; 100];
        let mut bs = BlockStream::forward_only(Cursor::new(data));
        bs.seek_forward_to_read(20).unwrap();
        assert!(matches!(
            bs.seek_forward_to_read(5),
            Err(Error::OutOfBounds(_))
        ));
        // a rejected seek leaves the position untouched
        assert_eq!(bs.position(), 20);
    }

    #[test]
    fn seek_forward_to_write_advances_and_fills() {
        let mut bs = BlockStream::seekable(Cursor::new(Vec::new()));
        bs.seek_forward_to_write(10, DATA_FILL).unwrap();
        assert_eq!(bs.position(), 10);
        assert_eq!(bs.into_inner().into_inner(), vec![DATA_FILL; 10]);
    }

    #[test]
    fn seek_forward_to_write_rejects_backward_target() {
        let mut bs = BlockStream::seekable(Cursor::new(Vec::new()));
        bs.seek_forward_to_write(10, DATA_FILL).unwrap();
        assert!(matches!(
            bs.seek_forward_to_write(0, DATA_FILL),
            Err(Error::OutOfBounds(_))
        ));
        assert_eq!(bs.position(), 10);
    }
}
