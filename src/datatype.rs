//! Sample types and column format grammars.
//!
//! `Bitpix` is grounded on the teacher's `BitpixValue` enum in
//! `hdu/header/extension/image.rs` and `hdu/header/extension/bintable.rs`'s
//! `TFormType`/marker-struct scheme (`L`, `X`, `B`, `I`, `J`, `K`, `A`, `E`,
//! `D`, `C`, `M`, `P`, `Q`); rewritten here as a data-carrying
//! `ColumnFormat` rather than one zero-sized marker struct per code, since
//! this crate needs to parse `TFORMn` at runtime rather than pick a
//! monomorphized reader at compile time.

use crate::error::{Error, Result};

/// `BITPIX`: the primitive sample type of an image data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitpix {
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Bitpix {
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            8 => Ok(Bitpix::U8),
            16 => Ok(Bitpix::I16),
            32 => Ok(Bitpix::I32),
            64 => Ok(Bitpix::I64),
            -32 => Ok(Bitpix::F32),
            -64 => Ok(Bitpix::F64),
            _ => Err(Error::InvalidValue("BITPIX must be one of 8,16,32,64,-32,-64")),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Bitpix::U8 => 8,
            Bitpix::I16 => 16,
            Bitpix::I32 => 32,
            Bitpix::I64 => 64,
            Bitpix::F32 => -32,
            Bitpix::F64 => -64,
        }
    }

    /// Size of one sample in bytes.
    pub fn byte_size(self) -> u64 {
        match self {
            Bitpix::U8 => 1,
            Bitpix::I16 => 2,
            Bitpix::I32 => 4,
            Bitpix::I64 => 8,
            Bitpix::F32 => 4,
            Bitpix::F64 => 8,
        }
    }
}

/// The decoded type code of a binary table `TFORMn` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryTableType {
    Logical,
    Bit,
    Byte,
    I16,
    I32,
    I64,
    Character,
    F32,
    F64,
    ComplexF32,
    ComplexF64,
}

impl BinaryTableType {
    fn byte_size(self) -> u64 {
        match self {
            BinaryTableType::Logical => 1,
            BinaryTableType::Bit => 1, // packed; see ColumnFormat::byte_width
            BinaryTableType::Byte => 1,
            BinaryTableType::I16 => 2,
            BinaryTableType::I32 => 4,
            BinaryTableType::I64 => 8,
            BinaryTableType::Character => 1,
            BinaryTableType::F32 => 4,
            BinaryTableType::F64 => 8,
            BinaryTableType::ComplexF32 => 8,
            BinaryTableType::ComplexF64 => 16,
        }
    }
}

/// A parsed `TFORMn` descriptor: repeat count plus type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFormat {
    pub repeat_count: u64,
    pub ty: BinaryTableType,
}

impl ColumnFormat {
    /// Total bytes this column occupies in one row. Bit columns (`X`) are
    /// packed 8 per byte, rounded up.
    pub fn byte_width(&self) -> u64 {
        if self.ty == BinaryTableType::Bit {
            self.repeat_count.div_ceil(8)
        } else {
            self.repeat_count * self.ty.byte_size()
        }
    }

    /// Parse a `TFORMn` value, e.g. `"1J"`, `"80A"`, `"3D"`.
    ///
    /// Variable-length array descriptors (`P`, `Q`) are recognised but
    /// rejected with [`Error::Unsupported`]: heap-pointer columns require
    /// random access into a trailing heap area, which this crate's
    /// forward-only stride model cannot express.
    pub fn parse(tform: &str) -> Result<Self> {
        let tform = tform.trim();
        let digit_end = tform.find(|c: char| !c.is_ascii_digit()).unwrap_or(tform.len());
        let (count_str, rest) = tform.split_at(digit_end);
        let repeat_count: u64 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| Error::InvalidValue("TFORM repeat count is not a valid integer"))?
        };
        let code = rest
            .chars()
            .next()
            .ok_or(Error::InvalidValue("TFORM is missing a type code"))?;

        let ty = match code {
            'L' => BinaryTableType::Logical,
            'X' => BinaryTableType::Bit,
            'B' => BinaryTableType::Byte,
            'I' => BinaryTableType::I16,
            'J' => BinaryTableType::I32,
            'K' => BinaryTableType::I64,
            'A' => BinaryTableType::Character,
            'E' => BinaryTableType::F32,
            'D' => BinaryTableType::F64,
            'C' => BinaryTableType::ComplexF32,
            'M' => BinaryTableType::ComplexF64,
            'P' | 'Q' => {
                return Err(Error::Unsupported(format!(
                    "variable-length array TFORM code '{code}'"
                )))
            }
            other => return Err(Error::Unsupported(format!("TFORM type code '{other}'"))),
        };

        Ok(ColumnFormat { repeat_count, ty })
    }
}

/// A parsed Fortran-style ASCII table column descriptor (`TFORMn` on an
/// ASCII-table HDU): `Aw`, `Iw`, `Fw.d`, `Ew.d`, `Dw.d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiColumnFormat {
    Character { width: u64 },
    Integer { width: u64 },
    Float { width: u64, decimals: u64 },
    Exponential { width: u64, decimals: u64 },
    Double { width: u64, decimals: u64 },
}

impl AsciiColumnFormat {
    pub fn width(&self) -> u64 {
        match *self {
            AsciiColumnFormat::Character { width }
            | AsciiColumnFormat::Integer { width }
            | AsciiColumnFormat::Float { width, .. }
            | AsciiColumnFormat::Exponential { width, .. }
            | AsciiColumnFormat::Double { width, .. } => width,
        }
    }

    pub fn parse(tform: &str) -> Result<Self> {
        let tform = tform.trim();
        let mut chars = tform.chars();
        let code = chars
            .next()
            .ok_or(Error::InvalidValue("ASCII TFORM is empty"))?;
        let rest: String = chars.collect();

        let parse_width_decimals = |s: &str| -> Result<(u64, u64)> {
            if let Some((w, d)) = s.split_once('.') {
                Ok((
                    w.parse()
                        .map_err(|_| Error::InvalidValue("bad ASCII TFORM width"))?,
                    d.parse()
                        .map_err(|_| Error::InvalidValue("bad ASCII TFORM decimals"))?,
                ))
            } else {
                Err(Error::InvalidValue("ASCII TFORM missing '.' decimals field"))
            }
        };

        match code {
            'A' => Ok(AsciiColumnFormat::Character {
                width: rest
                    .parse()
                    .map_err(|_| Error::InvalidValue("bad ASCII TFORM width"))?,
            }),
            'I' => Ok(AsciiColumnFormat::Integer {
                width: rest
                    .parse()
                    .map_err(|_| Error::InvalidValue("bad ASCII TFORM width"))?,
            }),
            'F' => {
                let (width, decimals) = parse_width_decimals(&rest)?;
                Ok(AsciiColumnFormat::Float { width, decimals })
            }
            'E' => {
                let (width, decimals) = parse_width_decimals(&rest)?;
                Ok(AsciiColumnFormat::Exponential { width, decimals })
            }
            'D' => {
                let (width, decimals) = parse_width_decimals(&rest)?;
                Ok(AsciiColumnFormat::Double { width, decimals })
            }
            other => Err(Error::Unsupported(format!("ASCII TFORM code '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(8, Bitpix::U8)]
    #[test_case(16, Bitpix::I16)]
    #[test_case(32, Bitpix::I32)]
    #[test_case(64, Bitpix::I64)]
    #[test_case(-32, Bitpix::F32)]
    #[test_case(-64, Bitpix::F64)]
    fn bitpix_round_trips_codes(code: i64, expected: Bitpix) {
        let bitpix = Bitpix::from_code(code).unwrap();
        assert_eq!(bitpix, expected);
        assert_eq!(bitpix.code(), code);
    }

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(17)]
    #[test_case(-8)]
    fn bitpix_rejects_invalid_codes(code: i64) {
        assert!(matches!(Bitpix::from_code(code), Err(Error::InvalidValue(_))));
    }

    #[test_case("1J", 1, BinaryTableType::I32, 4)]
    #[test_case("80A", 80, BinaryTableType::Character, 80)]
    #[test_case("1D", 1, BinaryTableType::F64, 8)]
    #[test_case("1C", 1, BinaryTableType::ComplexF32, 8)]
    #[test_case("1M", 1, BinaryTableType::ComplexF64, 16)]
    #[test_case("17X", 17, BinaryTableType::Bit, 3)]
    fn tform_parses_binary_column(tform: &str, repeat: u64, ty: BinaryTableType, width: u64) {
        let fmt = ColumnFormat::parse(tform).unwrap();
        assert_eq!(fmt.repeat_count, repeat);
        assert_eq!(fmt.ty, ty);
        assert_eq!(fmt.byte_width(), width);
    }

    #[test_case("1PJ")]
    #[test_case("1QJ")]
    fn tform_rejects_variable_length_arrays(tform: &str) {
        assert!(matches!(ColumnFormat::parse(tform), Err(Error::Unsupported(_))));
    }

    #[test_case("A8", 8)]
    #[test_case("I5", 5)]
    #[test_case("F10.3", 10)]
    #[test_case("E15.7", 15)]
    #[test_case("D20.12", 20)]
    fn ascii_tform_parses_every_code(tform: &str, width: u64) {
        assert_eq!(AsciiColumnFormat::parse(tform).unwrap().width(), width);
    }
}
