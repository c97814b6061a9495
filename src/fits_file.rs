//! The top-level orchestrator: owns the block stream, drives the HDU
//! sequence, and dispatches concrete HDU variants on read.
//!
//! Grounded on `file.rs`'s `FITSFile` enum-of-readers (`Gz`/`Plain`) and
//! `lib.rs`'s `Fits::from_reader` + iterator-style HDU traversal. The
//! teacher stops at read; the write side mirrors the same shape, built in
//! the teacher's manual-`Result` style and informed by
//! `fitsio-pure`'s header/data round-trip tests for what a symmetric write
//! path looks like.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::block::BlockStream;
use crate::error::{Error, Result};
use crate::hdu::{self, Hdu};

/// Mode a [`FitsFile`] was opened in. Carried mainly for diagnostics: the
/// actual operations available are determined by which trait bounds `S`
/// satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// A FITS file (or file-like stream) opened for streaming read or write.
pub struct FitsFile<S> {
    stream: BlockStream<S>,
    mode: Mode,
    hdus: Vec<Hdu>,
    /// Whether this instance opened the underlying resource itself (a
    /// path) as opposed to being handed an externally-owned stream. Only
    /// internally-opened streams are released on close.
    owned: bool,
    closed: bool,
}

impl FitsFile<BufReader<File>> {
    /// Open a file for streaming read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(FitsFile {
            stream: BlockStream::seekable(BufReader::new(file)),
            mode: Mode::Read,
            hdus: Vec::new(),
            owned: true,
            closed: false,
        })
    }
}

impl FitsFile<BufWriter<File>> {
    /// Create a file for streaming write, truncating any existing
    /// contents.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(FitsFile {
            stream: BlockStream::seekable(BufWriter::new(file)),
            mode: Mode::Write,
            hdus: Vec::new(),
            owned: true,
            closed: false,
        })
    }
}

impl<S> FitsFile<S> {
    /// Unwrap the underlying stream. Mainly useful in tests and for
    /// callers that need the written bytes back (an in-memory buffer).
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

impl<S: Read + Seek> FitsFile<S> {
    /// Wrap an externally-owned seekable stream for read.
    pub fn from_seekable_reader(inner: S) -> Self {
        FitsFile {
            stream: BlockStream::seekable(inner),
            mode: Mode::Read,
            hdus: Vec::new(),
            owned: false,
            closed: false,
        }
    }
}

impl<S: Read> FitsFile<S> {
    /// Wrap an externally-owned, possibly non-seekable stream for read
    /// (a socket, a pipe, stdin).
    pub fn from_reader(inner: S) -> Self {
        FitsFile {
            stream: BlockStream::forward_only(inner),
            mode: Mode::Read,
            hdus: Vec::new(),
            owned: false,
            closed: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current(&self) -> Option<&Hdu> {
        self.hdus.last()
    }

    pub fn hdus(&self) -> &[Hdu] {
        &self.hdus
    }

    /// Finish the current HDU (if any) and read the next one. Returns
    /// `Ok(None)` once the stream is exhausted at an HDU boundary.
    pub fn advance(&mut self) -> Result<Option<&Hdu>> {
        if let Some(current) = self.hdus.last_mut() {
            current.read_to_finish(&mut self.stream)?;
        }
        match hdu::read_next(&mut self.stream)? {
            Some(next) => {
                self.hdus.push(next);
                Ok(self.hdus.last())
            }
            None => Ok(None),
        }
    }

    /// Read the next stride of the current HDU.
    pub fn read_stride(&mut self, buf: &mut [u8]) -> Result<()> {
        let current = self
            .hdus
            .last_mut()
            .ok_or(Error::InvalidState("no current HDU; call advance() first"))?;
        current.read_stride(&mut self.stream, buf)
    }

    /// Read mode's idempotent close: no flush is needed, but repeated
    /// calls must not error.
    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

impl<S: Write> FitsFile<S> {
    /// Wrap an externally-owned stream for write.
    pub fn from_writer(inner: S) -> Self {
        FitsFile {
            stream: BlockStream::forward_only(inner),
            mode: Mode::Write,
            hdus: Vec::new(),
            owned: false,
            closed: false,
        }
    }

    /// Append a new HDU, writing its header immediately. The previous HDU
    /// (if any) must already be `Done` (all strides written).
    pub fn append_hdu(&mut self, hdu: Hdu) -> Result<()> {
        if let Some(current) = self.hdus.last() {
            if !current.is_done() {
                return Err(Error::InvalidState("previous HDU has not finished writing its strides"));
            }
        }
        self.hdus.push(hdu);
        let idx = self.hdus.len() - 1;
        self.hdus[idx].write_header(&mut self.stream)
    }

    /// Write the next stride of the current HDU.
    pub fn write_stride(&mut self, buf: &[u8]) -> Result<()> {
        let current = self
            .hdus
            .last_mut()
            .ok_or(Error::InvalidState("no current HDU; call append_hdu() first"))?;
        current.write_stride(&mut self.stream, buf)
    }

    /// Flush and pad the current block, then release the stream if it
    /// was internally opened. Idempotent: a second call is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if let Some(current) = self.hdus.last_mut() {
            if !current.is_done() {
                return Err(Error::InvalidState("cannot close with an unfinished HDU"));
            }
        }
        self.stream.flush()?;
        self.closed = true;
        Ok(())
    }
}

impl<S: Write + Seek> FitsFile<S> {
    /// Wrap an externally-owned seekable stream for write.
    pub fn from_seekable_writer(inner: S) -> Self {
        FitsFile {
            stream: BlockStream::seekable(inner),
            mode: Mode::Write,
            hdus: Vec::new(),
            owned: false,
            closed: false,
        }
    }
}

impl<S> Drop for FitsFile<S> {
    fn drop(&mut self) {
        // Externally-supplied streams are never closed by us; `owned`
        // only gates whether we consider ourselves responsible for the
        // resource, which in Rust just means not suppressing its own Drop.
        let _ = self.owned;
    }
}
