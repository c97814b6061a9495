//! An ordered, keyword-indexed collection of header cards.
//!
//! Grounded on the teacher's use of `indexmap::IndexMap` (see
//! `Cargo.toml`'s `indexmap` dependency and `ValueMap` in
//! `hdu/header/extension/mod.rs`) to get O(1) keyword lookup without
//! losing the on-disk card order, which commentary keywords (`COMMENT`,
//! `HISTORY`) and repeated keywords (`NAXISn`, `TFORMn`) depend on.

use indexmap::IndexMap;

use crate::card::{Card, Keyword, Value};
use crate::error::{Error, Result};

/// The canonical order mandatory keywords are written in, per HDU kind.
/// Keywords not listed here are written after these, in insertion order,
/// per the non-mandatory-card ordering decision recorded in the design
/// notes.
const MANDATORY_ORDER: &[&str] = &[
    "SIMPLE", "XTENSION", "BITPIX", "NAXIS", "PCOUNT", "GCOUNT", "TFIELDS", "EXTEND",
];

/// An ordered collection of [`Card`]s, indexed by keyword for fast lookup.
///
/// Repeatable keywords (`COMMENT`, `HISTORY`, blank, `NAXISn`, `TFORMn`,
/// `TTYPEn`, ...) keep every occurrence; indexed lookup returns the first.
#[derive(Debug, Clone, Default)]
pub struct CardCollection {
    cards: Vec<Card>,
    index: IndexMap<String, Vec<usize>>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Append a card, keeping it at the tail of the on-disk order.
    pub fn push(&mut self, card: Card) {
        let idx = self.cards.len();
        self.index
            .entry(card.keyword.as_str().to_string())
            .or_default()
            .push(idx);
        self.cards.push(card);
    }

    /// The value of the first card with this keyword, if any.
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.get_card(keyword).and_then(|c| c.value.as_ref())
    }

    /// The first card with this keyword, if any.
    pub fn get_card(&self, keyword: &str) -> Option<&Card> {
        let upper = keyword.to_ascii_uppercase();
        self.index
            .get(&upper)
            .and_then(|positions| positions.first())
            .map(|&i| &self.cards[i])
    }

    /// Every card with this keyword, in on-disk order (for `COMMENT`,
    /// `HISTORY`, and indexed families like `NAXISn`).
    pub fn get_all(&self, keyword: &str) -> Vec<&Card> {
        let upper = keyword.to_ascii_uppercase();
        self.index
            .get(&upper)
            .map(|positions| positions.iter().map(|&i| &self.cards[i]).collect())
            .unwrap_or_default()
    }

    pub fn get_required_integer(&self, keyword: &str) -> Result<i64> {
        self.get(keyword)
            .and_then(Value::as_integer)
            .ok_or(Error::InvalidHeader("missing or non-integer mandatory keyword"))
    }

    pub fn get_required_logical(&self, keyword: &str) -> Result<bool> {
        self.get(keyword)
            .and_then(Value::as_logical)
            .ok_or(Error::InvalidHeader("missing or non-logical mandatory keyword"))
    }

    pub fn get_required_string(&self, keyword: &str) -> Result<String> {
        self.get(keyword)
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .ok_or(Error::InvalidHeader("missing or non-string mandatory keyword"))
    }

    /// NAXISn for 1-based axis number `n`.
    pub fn get_naxis_n(&self, n: usize) -> Result<i64> {
        self.get_required_integer(&format!("NAXIS{n}"))
    }

    /// Cards in the canonical write order: mandatory keywords first (in
    /// [`MANDATORY_ORDER`], with indexed families such as `NAXISn`
    /// expanded in axis order immediately after `NAXIS`), everything else
    /// in insertion order, `END` last.
    pub fn in_write_order(&self) -> Vec<&Card> {
        let mut out = Vec::with_capacity(self.cards.len());
        let mut emitted = vec![false; self.cards.len()];

        for &mandatory in MANDATORY_ORDER {
            if let Some(&idx) = self.index.get(mandatory).and_then(|p| p.first()) {
                out.push(&self.cards[idx]);
                emitted[idx] = true;
                if mandatory == "NAXIS" {
                    self.emit_naxis_n(&mut out, &mut emitted);
                }
            }
        }

        for (idx, card) in self.cards.iter().enumerate() {
            if !emitted[idx] && !card.keyword.eq(&"END") {
                out.push(card);
                emitted[idx] = true;
            }
        }

        if let Some(&idx) = self.index.get("END").and_then(|p| p.first()) {
            out.push(&self.cards[idx]);
        }

        out
    }

    fn emit_naxis_n<'a>(&'a self, out: &mut Vec<&'a Card>, emitted: &mut [bool]) {
        let naxis = self.get("NAXIS").and_then(Value::as_integer).unwrap_or(0);
        for n in 1..=naxis {
            let kw = format!("NAXIS{n}");
            if let Some(&idx) = self.index.get(&kw).and_then(|p| p.first()) {
                out.push(&self.cards[idx]);
                emitted[idx] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins_for_get() {
        let mut c = CardCollection::new();
        c.push(Card::commentary("COMMENT", "first"));
        c.push(Card::commentary("COMMENT", "second"));
        assert_eq!(c.get_all("COMMENT").len(), 2);
    }

    #[test]
    fn mandatory_keywords_come_first_in_write_order() {
        let mut c = CardCollection::new();
        c.push(Card::new("BITPIX", Value::Integer(8)));
        c.push(Card::new("NAXIS", Value::Integer(1)));
        c.push(Card::new("NAXIS1", Value::Integer(10)));
        c.push(Card::new("SIMPLE", Value::Logical(true)));
        c.push(Card::commentary("COMMENT", "hello"));
        c.push(Card { keyword: Keyword::new("END"), value: None, comment: None });

        let order = c.in_write_order();
        let names: Vec<&str> = order.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(names, vec!["SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "COMMENT", "END"]);
    }
}
