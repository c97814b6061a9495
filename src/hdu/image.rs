//! Image HDU: primary array or `XTENSION = 'IMAGE'` extension.
//!
//! Grounded on `hdu/header/extension/image.rs`'s `Image` struct
//! (`bitpix`, `naxisn: Box<[u64]>`) and its `get_num_pixels`/
//! `get_num_bytes_data_block` helpers; re-expressed over [`HduBase`]
//! instead of the teacher's `Xtension` trait object.

use super::HduBase;
use crate::collection::CardCollection;
use crate::datatype::Bitpix;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ImageHdu {
    pub(crate) base: HduBase,
    pub bitpix: Bitpix,
    pub naxisn: Vec<u64>,
}

impl ImageHdu {
    pub(crate) fn new_for_write() -> Self {
        ImageHdu {
            base: HduBase::for_write(),
            bitpix: Bitpix::U8,
            naxisn: Vec::new(),
        }
    }

    pub(crate) fn from_header(cards: CardCollection, header_position: u64, data_position: u64) -> Result<Self> {
        let bitpix = Bitpix::from_code(cards.get_required_integer("BITPIX")?)?;
        let naxis = cards.get_required_integer("NAXIS")?;
        if naxis < 0 {
            return Err(Error::InvalidHeader("NAXIS must be non-negative"));
        }
        let mut naxisn = Vec::with_capacity(naxis as usize);
        for i in 1..=naxis {
            let n = cards.get_naxis_n(i as usize)?;
            if n < 0 {
                return Err(Error::InvalidHeader("NAXISn must be non-negative"));
            }
            naxisn.push(n as u64);
        }

        let (stride_length, total_strides) = stride_geometry(bitpix, &naxisn);

        Ok(ImageHdu {
            base: HduBase {
                cards,
                header_position,
                data_position,
                stride_length,
                total_strides,
                stride_counter: 0,
                state: super::State::Header,
            },
            bitpix,
            naxisn,
        })
    }

    pub fn cards(&self) -> &CardCollection {
        &self.base.cards
    }

    pub fn naxis(&self) -> u64 {
        self.naxisn.len() as u64
    }

    /// Total pixel count across all axes.
    pub fn num_pixels(&self) -> u64 {
        self.naxisn.iter().product()
    }

    /// Set `BITPIX`/`NAXIS`/`NAXISn` and the derived card entries, only
    /// while the header is still mutable.
    pub fn set_geometry(&mut self, bitpix: Bitpix, naxisn: Vec<u64>) -> Result<()> {
        self.base.assert_mutable()?;
        self.bitpix = bitpix;
        self.naxisn = naxisn;
        Ok(())
    }

    pub fn push_card(&mut self, card: crate::card::Card) -> Result<()> {
        self.base.assert_mutable()?;
        self.base.cards.push(card);
        Ok(())
    }

    pub(crate) fn finalize_geometry(&mut self, is_primary: bool) -> Result<()> {
        use crate::card::{Card, Value};

        if is_primary {
            self.base.cards.push(Card::new("SIMPLE", Value::Logical(true)));
        } else {
            self.base.cards.push(Card::new("XTENSION", Value::String("IMAGE".to_string())));
        }
        self.base.cards.push(Card::new("BITPIX", Value::Integer(self.bitpix.code())));
        self.base
            .cards
            .push(Card::new("NAXIS", Value::Integer(self.naxisn.len() as i64)));
        for (i, n) in self.naxisn.iter().enumerate() {
            self.base
                .cards
                .push(Card::new(&format!("NAXIS{}", i + 1), Value::Integer(*n as i64)));
        }

        let (stride_length, total_strides) = stride_geometry(self.bitpix, &self.naxisn);
        self.base.stride_length = stride_length;
        self.base.total_strides = total_strides;
        Ok(())
    }
}

/// `strideLength = |BITPIX|/8 × NAXIS1`; `totalStrides = ∏_{i=2..NAXIS}
/// NAXISi` (1 if `NAXIS == 1`, 0 if `NAXIS == 0`), per the design note
/// resolving the source's ambiguous axis accumulation.
fn stride_geometry(bitpix: Bitpix, naxisn: &[u64]) -> (u64, u64) {
    if naxisn.is_empty() {
        return (0, 0);
    }
    let stride_length = bitpix.byte_size() * naxisn[0];
    let total_strides = naxisn[1..].iter().product::<u64>().max(1);
    (stride_length, total_strides)
}
