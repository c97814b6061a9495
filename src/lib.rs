//! A streaming reader/writer for the FITS (Flexible Image Transport
//! System) binary container format used in astronomy.
//!
//! A FITS file is a sequence of Header/Data Units (HDUs); each HDU is an
//! ASCII header of fixed-size 80-byte cards followed by an optional
//! binary data payload, both padded to 2880-byte blocks. This crate
//! exposes an incremental API: callers iterate HDUs, inspect their
//! headers, and stream the data payload in fixed-size strides without
//! materializing the full payload.
//!
//! # Examples
//!
//! Reading a file HDU by HDU:
//!
//! ```no_run
//! use fitsrs::{FitsFile, Hdu};
//!
//! let mut fits = FitsFile::open("image.fits").unwrap();
//! while fits.advance().unwrap().is_some() {
//!     let is_image = matches!(fits.current().unwrap(), Hdu::Primary(_));
//!     if is_image {
//!         let stride_len = fits.current().unwrap().stride_length() as usize;
//!         let total_strides = fits.current().unwrap().total_strides();
//!         let mut buf = vec![0u8; stride_len];
//!         for _ in 0..total_strides {
//!             fits.read_stride(&mut buf).unwrap();
//!         }
//!     }
//! }
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    clippy::uninlined_format_args,
    clippy::match_same_arms
)]

pub mod block;
pub mod card;
pub mod codec;
pub mod collection;
pub mod datatype;
pub mod error;
pub mod fits_file;
pub mod hdu;

pub use block::BlockStream;
pub use card::{Card, Keyword, Value};
pub use collection::CardCollection;
pub use datatype::{AsciiColumnFormat, Bitpix, BinaryTableType, ColumnFormat};
pub use error::{Error, Result};
pub use fits_file::{FitsFile, Mode};
pub use hdu::{AsciiTableHdu, BinaryTableHdu, Hdu, HduBase, ImageHdu};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn card_line(text: &str) -> [u8; card::CARD_SIZE] {
        let mut buf = [b' '; card::CARD_SIZE];
        let bytes = text.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);
        buf
    }

    fn minimal_primary_fits() -> Vec<u8> {
        let lines = [
            "SIMPLE  =                    T",
            "BITPIX  =                   16",
            "NAXIS   =                    2",
            "NAXIS1  =                    3",
            "NAXIS2  =                    2",
            "END",
        ];
        let mut out = Vec::new();
        for l in lines {
            out.extend_from_slice(&card_line(l));
        }
        while out.len() % 2880 != 0 {
            out.push(b' ');
        }
        // data: two strides of 6 bytes (3 i16 samples, big-endian).
        let mut data = vec![0u8; 12];
        data[1] = 1; // first sample = 1
        data[9] = 2; // fourth sample = 2
        out.extend_from_slice(&data);
        while out.len() % 2880 != 0 {
            out.push(0);
        }
        out
    }

    #[test]
    fn streaming_read_of_minimal_image() {
        let bytes = minimal_primary_fits();
        let mut fits = FitsFile::from_seekable_reader(Cursor::new(bytes));
        let hdu = fits.advance().unwrap().unwrap();
        assert!(matches!(hdu, Hdu::Primary(_)));
        assert_eq!(hdu.stride_length(), 6);
        assert_eq!(hdu.total_strides(), 2);

        let mut buf = [0u8; 6];
        fits.read_stride(&mut buf).unwrap();
        assert_eq!(buf, [0, 1, 0, 0, 0, 0]);
        fits.read_stride(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 2, 0, 0]);

        assert!(fits.advance().unwrap().is_none());
    }

    #[test]
    fn forward_only_stream_matches_seekable_reads() {
        let bytes = minimal_primary_fits();
        let mut fits = FitsFile::from_reader(Cursor::new(bytes));
        let hdu = fits.advance().unwrap().unwrap();
        assert_eq!(hdu.total_strides(), 2);
        let mut buf = [0u8; 6];
        fits.read_stride(&mut buf).unwrap();
        fits.read_stride(&mut buf).unwrap();
        assert!(fits.advance().unwrap().is_none());
    }
}
