//! ASCII table HDU: `XTENSION = 'TABLE'`.
//!
//! Supplemental module (§2.1): the mandatory FITS extension type the
//! distilled spec didn't ask for but the teacher carries
//! (`hdu/header/extension/asciitable.rs`, not retrieved in full here, so
//! this reuses the binary-table row-stride machinery with the
//! Fortran-style `TFORMn` grammar and `TBCOLn` column positions instead of
//! packed binary widths).

use super::HduBase;
use crate::card::{Card, Value};
use crate::collection::CardCollection;
use crate::datatype::AsciiColumnFormat;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct AsciiColumnDescriptor {
    pub name: Option<String>,
    pub format: AsciiColumnFormat,
    /// 1-based starting column of this field within the row, per
    /// `TBCOLn`.
    pub start_column: u64,
}

#[derive(Debug, Clone)]
pub struct AsciiTableHdu {
    pub(crate) base: HduBase,
    pub naxis1: u64,
    pub naxis2: u64,
    pub columns: Vec<AsciiColumnDescriptor>,
}

impl AsciiTableHdu {
    /// Build an empty ASCII-table HDU for write mode, in `Start` state.
    pub fn new_for_write() -> Self {
        AsciiTableHdu {
            base: HduBase::for_write(),
            naxis1: 0,
            naxis2: 0,
            columns: Vec::new(),
        }
    }

    pub(crate) fn from_header(cards: CardCollection, header_position: u64, data_position: u64) -> Result<Self> {
        let bitpix = cards.get_required_integer("BITPIX")?;
        if bitpix != 8 {
            return Err(Error::InvalidHeader("ASCII TABLE requires BITPIX = 8"));
        }
        let naxis = cards.get_required_integer("NAXIS")?;
        if naxis != 2 {
            return Err(Error::InvalidHeader("ASCII TABLE requires NAXIS = 2"));
        }
        let naxis1 = cards.get_naxis_n(1)? as u64;
        let naxis2 = cards.get_naxis_n(2)? as u64;
        let tfields = cards.get_required_integer("TFIELDS")?;

        let mut columns = Vec::with_capacity(tfields as usize);
        for i in 1..=tfields {
            let tform = cards.get_required_string(&format!("TFORM{i}"))?;
            let format = AsciiColumnFormat::parse(&tform)?;
            let start_column = cards.get_required_integer(&format!("TBCOL{i}"))? as u64;
            let name = cards.get(&format!("TTYPE{i}")).and_then(Value::as_str).map(str::to_string);
            columns.push(AsciiColumnDescriptor { name, format, start_column });
        }

        Ok(AsciiTableHdu {
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
            columns,
        })
    }

    pub fn cards(&self) -> &CardCollection {
        &self.base.cards
    }

    pub fn row_count(&self) -> u64 {
        self.naxis2
    }

    pub fn push_column(&mut self, descriptor: AsciiColumnDescriptor) -> Result<()> {
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
        let row_width = self
            .columns
            .iter()
            .map(|c| c.start_column - 1 + c.format.width())
            .max()
            .unwrap_or(0);
        self.naxis1 = row_width;

        self.base.cards.push(Card::new("XTENSION", Value::String("TABLE".to_string())));
        self.base.cards.push(Card::new("BITPIX", Value::Integer(8)));
        self.base.cards.push(Card::new("NAXIS", Value::Integer(2)));
        self.base.cards.push(Card::new("NAXIS1", Value::Integer(self.naxis1 as i64)));
        self.base.cards.push(Card::new("NAXIS2", Value::Integer(self.naxis2 as i64)));
        self.base.cards.push(Card::new("PCOUNT", Value::Integer(0)));
        self.base.cards.push(Card::new("GCOUNT", Value::Integer(1)));
        self.base.cards.push(Card::new("TFIELDS", Value::Integer(self.columns.len() as i64)));

        for (i, column) in self.columns.iter().enumerate() {
            let n = i + 1;
            self.base
                .cards
                .push(Card::new(&format!("TBCOL{n}"), Value::Integer(column.start_column as i64)));
            self.base
                .cards
                .push(Card::new(&format!("TFORM{n}"), Value::String(format_code(&column.format))));
            if let Some(name) = &column.name {
                self.base
                    .cards
                    .push(Card::new(&format!("TTYPE{n}"), Value::String(name.clone())));
            }
        }

        self.base.stride_length = self.naxis1;
        self.base.total_strides = self.naxis2;
        Ok(())
    }
}

fn format_code(format: &AsciiColumnFormat) -> String {
    match *format {
        AsciiColumnFormat::Character { width } => format!("A{width}"),
        AsciiColumnFormat::Integer { width } => format!("I{width}"),
        AsciiColumnFormat::Float { width, decimals } => format!("F{width}.{decimals}"),
        AsciiColumnFormat::Exponential { width, decimals } => format!("E{width}.{decimals}"),
        AsciiColumnFormat::Double { width, decimals } => format!("D{width}.{decimals}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_geometry_computes_naxis1_from_last_column() {
        let mut hdu = AsciiTableHdu::new_for_write();
        hdu.push_column(AsciiColumnDescriptor {
            name: Some("ID".to_string()),
            format: AsciiColumnFormat::Integer { width: 5 },
            start_column: 1,
        })
        .unwrap();
        hdu.push_column(AsciiColumnDescriptor {
            name: Some("FLUX".to_string()),
            format: AsciiColumnFormat::Exponential { width: 15, decimals: 7 },
            start_column: 7,
        })
        .unwrap();
        hdu.set_row_count(2).unwrap();
        hdu.finalize_geometry().unwrap();
        assert_eq!(hdu.naxis1, 21);
    }
}
