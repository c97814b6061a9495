//! Crate-wide error type.
//!
//! Every fallible public operation returns `Result<T, Error>`. Nothing in
//! this crate panics on malformed input outside of tests; end-of-stream at
//! an HDU boundary is not an error, it is `None` from
//! [`crate::fits_file::FitsFile::advance`].

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The underlying stream failed, or ended unexpectedly in the middle of
    /// a card or a stride.
    Io(std::io::Error),
    /// A malformed 80-byte card: bad keyword characters, a missing `= `
    /// marker where one was expected, or an unterminated quote.
    InvalidCard { offset: u64, reason: &'static str },
    /// A missing mandatory keyword, a contradiction between keywords, or no
    /// `END` card within a sane number of cards.
    InvalidHeader(&'static str),
    /// An API call made out of lifecycle order: mutating a card after the
    /// header left the `Start` state, reading/writing a stride before the
    /// header, or past `total_strides`.
    InvalidState(&'static str),
    /// A backward seek attempted on a forward-only stream.
    OutOfBounds(&'static str),
    /// A construct this crate intentionally does not implement: variable
    /// length arrays (`P`/`Q`), random groups, tile compression, or an
    /// unrecognised `XTENSION` name.
    Unsupported(String),
    /// A card value that failed to parse as the type the caller expected,
    /// or a numeric literal that is not well-formed FITS.
    InvalidValue(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "i/o error: {e}"),
            Error::InvalidCard { offset, reason } => {
                write!(f, "invalid card at byte offset {offset}: {reason}")
            }
            Error::InvalidHeader(reason) => write!(f, "invalid header: {reason}"),
            Error::InvalidState(reason) => write!(f, "invalid state: {reason}"),
            Error::OutOfBounds(reason) => write!(f, "out of bounds: {reason}"),
            Error::Unsupported(what) => write!(f, "unsupported: {what}"),
            Error::InvalidValue(reason) => write!(f, "invalid value: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidValue("card bytes are not valid utf-8")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
