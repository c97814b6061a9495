//! Binary table HDU: `XTENSION = 'BINTABLE'`.
//!
//! Grounded on `hdu/header/extension/bintable.rs`'s `BinTable` struct and
//! its `TFormBinaryTableType`-per-marker-struct scheme; re-expressed over
//! a runtime [`ColumnFormat`](crate::datatype::ColumnFormat) instead of
//! the teacher's phantom-typed `TFormBinaryTable<T>`, per the design note
//! in §4.5.

use super::HduBase;
use crate::card::{Card, Value};
use crate::collection::CardCollection;
use crate::datatype::ColumnFormat;
use crate::error::{Error, Result};

/// Column-level metadata for one `TFORMn` slot.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: Option<String>,
    pub format: ColumnFormat,
    pub scale: Option<f64>,
    pub zero: Option<f64>,
    pub null: Option<i64>,
    pub dim: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BinaryTableHdu {
    pub(crate) base: HduBase,
    pub naxis1: u64,
    pub naxis2: u64,
    pub pcount: u64,
    pub gcount: u64,
    pub columns: Vec<ColumnDescriptor>,
}

impl BinaryTableHdu {
    /// Build an empty binary-table HDU for write mode, in `Start` state.
    pub fn new_for_write() -> Self {
        BinaryTableHdu {
            base: HduBase::for_write(),
            naxis1: 0,
            naxis2: 0,
            pcount: 0,
            gcount: 1,
            columns: Vec::new(),
        }
    }

    pub(crate) fn from_header(cards: CardCollection, header_position: u64, data_position: u64) -> Result<Self> {
        let bitpix = cards.get_required_integer("BITPIX")?;
        if bitpix != 8 {
            return Err(Error::InvalidHeader("BINTABLE requires BITPIX = 8"));
        }
        let naxis = cards.get_required_integer("NAXIS")?;
        if naxis != 2 {
            return Err(Error::InvalidHeader("BINTABLE requires NAXIS = 2"));
        }
        let naxis1 = cards.get_naxis_n(1)? as u64;
        let naxis2 = cards.get_naxis_n(2)? as u64;
        let pcount = cards.get_required_integer("PCOUNT")? as u64;
        let gcount = cards.get_required_integer("GCOUNT")?;
        if gcount != 1 {
            return Err(Error::InvalidHeader("BINTABLE requires GCOUNT = 1"));
        }
        let tfields = cards.get_required_integer("TFIELDS")?;

        let mut columns = Vec::with_capacity(tfields as usize);
        let mut total_width = 0u64;
        for i in 1..=tfields {
            let tform = cards.get_required_string(&format!("TFORM{i}"))?;
            let format = ColumnFormat::parse(&tform)?;
            total_width += format.byte_width();
            let name = cards.get(&format!("TTYPE{i}")).and_then(Value::as_str).map(str::to_string);
            let scale = cards.get(&format!("TSCAL{i}")).and_then(Value::as_float);
            let zero = cards.get(&format!("TZERO{i}")).and_then(Value::as_float);
            let null = cards.get(&format!("TNULL{i}")).and_then(Value::as_integer);
            let dim = cards.get(&format!("TDIM{i}")).and_then(Value::as_str).map(str::to_string);
            columns.push(ColumnDescriptor { name, format, scale, zero, null, dim });
        }

        if total_width != naxis1 {
            return Err(Error::InvalidHeader("sum of TFORMn widths does not match NAXIS1"));
        }

        Ok(BinaryTableHdu {
            base: HduBase {
                cards,
                header_position,
                data_position,
                stride_length: naxis1,
                total_strides: naxis2,
                stride_counter: 0,
                state: super::State::Header,
            },
            naxis1,
            naxis2,
            pcount,
            gcount,
            columns,
        })
    }

    pub fn cards(&self) -> &CardCollection {
        &self.base.cards
    }

    pub fn row_count(&self) -> u64 {
        self.naxis2
    }

    /// Append a column descriptor while the header is still mutable. The
    /// row count (`NAXIS2`) must be set separately via
    /// [`BinaryTableHdu::set_row_count`].
    pub fn push_column(&mut self, descriptor: ColumnDescriptor) -> Result<()> {
        self.base.assert_mutable()?;
        self.columns.push(descriptor);
        Ok(())
    }

    pub fn set_row_count(&mut self, rows: u64) -> Result<()> {
        self.base.assert_mutable()?;
        self.naxis2 = rows;
        Ok(())
    }

    pub(crate) fn finalize_geometry(&mut self) -> Result<()> {
        self.naxis1 = self.columns.iter().map(|c| c.format.byte_width()).sum();
        self.pcount = 0;
        self.gcount = 1;

        self.base.cards.push(Card::new("XTENSION", Value::String("BINTABLE".to_string())));
        self.base.cards.push(Card::new("BITPIX", Value::Integer(8)));
        self.base.cards.push(Card::new("NAXIS", Value::Integer(2)));
        self.base.cards.push(Card::new("NAXIS1", Value::Integer(self.naxis1 as i64)));
        self.base.cards.push(Card::new("NAXIS2", Value::Integer(self.naxis2 as i64)));
        self.base.cards.push(Card::new("PCOUNT", Value::Integer(0)));
        self.base.cards.push(Card::new("GCOUNT", Value::Integer(1)));
        self.base.cards.push(Card::new("TFIELDS", Value::Integer(self.columns.len() as i64)));

        for (i, column) in self.columns.iter().enumerate() {
            let n = i + 1;
            let code = format_code(column);
            self.base.cards.push(Card::new(&format!("TFORM{n}"), Value::String(code)));
            if let Some(name) = &column.name {
                self.base
                    .cards
                    .push(Card::new(&format!("TTYPE{n}"), Value::String(name.clone())));
            }
            if let Some(scale) = column.scale {
                self.base.cards.push(Card::new(&format!("TSCAL{n}"), Value::Float(scale)));
            }
            if let Some(zero) = column.zero {
                self.base.cards.push(Card::new(&format!("TZERO{n}"), Value::Float(zero)));
            }
            if let Some(null) = column.null {
                self.base.cards.push(Card::new(&format!("TNULL{n}"), Value::Integer(null)));
            }
        }

        self.base.stride_length = self.naxis1;
        self.base.total_strides = self.naxis2;
        Ok(())
    }
}

fn format_code(column: &ColumnDescriptor) -> String {
    use crate::datatype::BinaryTableType::*;
    let code = match column.format.ty {
        Logical => 'L',
        Bit => 'X',
        Byte => 'B',
        I16 => 'I',
        I32 => 'J',
        I64 => 'K',
        Character => 'A',
        F32 => 'E',
        F64 => 'D',
        ComplexF32 => 'C',
        ComplexF64 => 'M',
    };
    format!("{}{}", column.format.repeat_count, code)
}
