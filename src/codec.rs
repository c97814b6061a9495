//! Big-endian primitive codec for FITS data strides.
//!
//! FITS stores every numeric sample big-endian regardless of host byte
//! order. Grounded on the teacher's `Value` trait in
//! `hdu/data/iter.rs`, which reads a single big-endian primitive off a
//! `byteorder`-wrapped reader; extended here with a write side (the
//! teacher has none) and the two binary-table complex codes `C`/`M`.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::Result;

/// A single-precision complex sample (`TFORM` code `C`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

/// A double-precision complex sample (`TFORM` code `M`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

/// A fixed-width primitive sample that can be moved in and out of a FITS
/// data stride in big-endian wire format.
pub trait Sample: Sized + Copy {
    /// Size of one sample on the wire, in bytes.
    const SIZE: usize;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self>;
    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl Sample for u8 {
    const SIZE: usize = 1;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u8()?)
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_u8(*self)?)
    }
}

impl Sample for i16 {
    const SIZE: usize = 2;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i16::<BigEndian>()?)
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_i16::<BigEndian>(*self)?)
    }
}

impl Sample for i32 {
    const SIZE: usize = 4;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i32::<BigEndian>()?)
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_i32::<BigEndian>(*self)?)
    }
}

impl Sample for i64 {
    const SIZE: usize = 8;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i64::<BigEndian>()?)
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_i64::<BigEndian>(*self)?)
    }
}

impl Sample for f32 {
    const SIZE: usize = 4;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f32::<BigEndian>()?)
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_f32::<BigEndian>(*self)?)
    }
}

impl Sample for f64 {
    const SIZE: usize = 8;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f64::<BigEndian>()?)
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_f64::<BigEndian>(*self)?)
    }
}

impl Sample for Complex32 {
    const SIZE: usize = 8;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        let re = reader.read_f32::<BigEndian>()?;
        let im = reader.read_f32::<BigEndian>()?;
        Ok(Complex32 { re, im })
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<BigEndian>(self.re)?;
        writer.write_f32::<BigEndian>(self.im)?;
        Ok(())
    }
}

impl Sample for Complex64 {
    const SIZE: usize = 16;

    fn read_be<R: Read>(reader: &mut R) -> Result<Self> {
        let re = reader.read_f64::<BigEndian>()?;
        let im = reader.read_f64::<BigEndian>()?;
        Ok(Complex64 { re, im })
    }

    fn write_be<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f64::<BigEndian>(self.re)?;
        writer.write_f64::<BigEndian>(self.im)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_i32() {
        let mut buf = Vec::new();
        42i32.write_be(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 42]);
        let mut cur = Cursor::new(buf);
        assert_eq!(i32::read_be(&mut cur).unwrap(), 42);
    }

    #[test]
    fn round_trips_f64() {
        let mut buf = Vec::new();
        std::f64::consts::PI.write_be(&mut buf).unwrap();
        let mut cur = Cursor::new(buf);
        assert_eq!(f64::read_be(&mut cur).unwrap(), std::f64::consts::PI);
    }

    #[test]
    fn round_trips_complex32() {
        let c = Complex32 { re: 1.5, im: -2.5 };
        let mut buf = Vec::new();
        c.write_be(&mut buf).unwrap();
        assert_eq!(buf.len(), Complex32::SIZE);
        let mut cur = Cursor::new(buf);
        assert_eq!(Complex32::read_be(&mut cur).unwrap(), c);
    }
}
