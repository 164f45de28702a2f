//! Lexicons: binary meaning × signal matrices.
//!
//! Row `m` lists which signals are conventionally usable for meaning `m`.
//! Construction rejects any row without a usable signal, so speaker
//! production is always defined.
//!
//! Lexicons print and parse as rows of `0`/`1` joined by `/`:
//!
//! ```rust
//! use pragma_core::lexicon::Lexicon;
//!
//! let identity: Lexicon = "100/010/001".parse().unwrap();
//! assert_eq!(identity, Lexicon::identity(3).unwrap());
//! assert_eq!(identity.to_string(), "100/010/001");
//! ```

use core::fmt;
use core::str::FromStr;

use crate::error::{ModelError, Result};

/// Meaning (referent) index.
pub type Meaning = usize;

/// Signal index.
pub type Signal = usize;

/// Largest matrix (meanings × signals) that [`Lexicon::enumerate`] will expand.
pub const MAX_ENUMERATION_CELLS: usize = 20;

/// Immutable binary lexicon.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LexiconRows"))]
pub struct Lexicon {
    rows: Vec<Vec<bool>>,
}

/// Unvalidated wire form; deserialisation goes through [`Lexicon::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LexiconRows {
    rows: Vec<Vec<bool>>,
}

#[cfg(feature = "serde")]
impl TryFrom<LexiconRows> for Lexicon {
    type Error = ModelError;

    fn try_from(raw: LexiconRows) -> Result<Self> {
        Self::new(raw.rows)
    }
}

impl Lexicon {
    /// Build a lexicon from boolean rows.
    ///
    /// Fails with [`ModelError::LexiconShape`] for empty or ragged input and
    /// [`ModelError::DegenerateLexicon`] when a meaning has no usable signal.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Self> {
        let width = match rows.first() {
            Some(r) if !r.is_empty() => r.len(),
            _ => return Err(ModelError::LexiconShape("lexicon needs at least one meaning and one signal")),
        };
        if rows.iter().any(|r| r.len() != width) {
            return Err(ModelError::LexiconShape("every meaning needs the same number of signals"));
        }
        if let Some(meaning) = rows.iter().position(|r| !r.iter().any(|&b| b)) {
            return Err(ModelError::DegenerateLexicon { meaning });
        }
        Ok(Self { rows })
    }

    /// Build from 0/1 rows.
    pub fn from_bits(rows: &[&[u8]]) -> Result<Self> {
        Self::new(rows.iter().map(|r| r.iter().map(|&b| b != 0).collect()).collect())
    }

    /// One-to-one lexicon: meaning `i` uses signal `i` only.
    ///
    /// `n == 0` is a [`ModelError::LexiconShape`].
    pub fn identity(n: usize) -> Result<Self> {
        Self::new((0..n).map(|m| (0..n).map(|s| s == m).collect()).collect())
    }

    /// Maximally ambiguous lexicon: every signal usable for every meaning.
    pub fn fully_ambiguous(num_meanings: usize, num_signals: usize) -> Result<Self> {
        Self::new(vec![vec![true; num_signals]; num_meanings])
    }

    /// Every valid lexicon of the given shape.
    ///
    /// Matrices are read row-major as a bit pattern with meaning 0 / signal 0
    /// as the most significant bit, and listed in descending pattern order.
    /// For 3 × 3 this yields 7³ = 343 lexicons, starting with the fully
    /// ambiguous one.
    pub fn enumerate(num_meanings: usize, num_signals: usize) -> Result<Vec<Self>> {
        let cells = num_meanings * num_signals;
        if cells == 0 {
            return Err(ModelError::LexiconShape("lexicon needs at least one meaning and one signal"));
        }
        if cells > MAX_ENUMERATION_CELLS {
            return Err(ModelError::InvalidConfig("lexicon too large to enumerate"));
        }
        let row_mask: u32 = (1 << num_signals) - 1;
        let mut out = Vec::new();
        for pattern in (1..(1u32 << cells)).rev() {
            let row_bits = |m: usize| (pattern >> ((num_meanings - 1 - m) * num_signals)) & row_mask;
            if (0..num_meanings).any(|m| row_bits(m) == 0) {
                continue;
            }
            let rows = (0..num_meanings)
                .map(|m| {
                    let bits = row_bits(m);
                    (0..num_signals)
                        .map(|s| bits & (1 << (num_signals - 1 - s)) != 0)
                        .collect()
                })
                .collect();
            out.push(Self { rows });
        }
        Ok(out)
    }

    /// Number of meanings (rows).
    pub fn num_meanings(&self) -> usize {
        self.rows.len()
    }

    /// Number of signals (columns).
    pub fn num_signals(&self) -> usize {
        self.rows[0].len()
    }

    /// Row for `meaning`.
    pub fn row(&self, meaning: Meaning) -> Result<&[bool]> {
        self.rows
            .get(meaning)
            .map(Vec::as_slice)
            .ok_or(ModelError::MeaningOutOfRange { meaning, num_meanings: self.rows.len() })
    }

    /// `true` if `signal` is conventionally usable for `meaning`.
    pub fn is_usable(&self, meaning: Meaning, signal: Signal) -> bool {
        self.rows[meaning][signal]
    }

    /// Number of signals usable for `meaning` (always ≥ 1).
    pub fn usable_count(&self, meaning: Meaning) -> usize {
        self.rows[meaning].iter().filter(|&&b| b).count()
    }

    /// `true` if every signal is usable for `meaning`.
    pub fn is_universal(&self, meaning: Meaning) -> bool {
        self.usable_count(meaning) == self.num_signals()
    }

    /// Winner-take-all signal for `meaning`: the first usable signal.
    pub fn best_signal(&self, meaning: Meaning) -> Result<Signal> {
        self.row(meaning)?
            .iter()
            .position(|&b| b)
            .ok_or(ModelError::DegenerateLexicon { meaning })
    }
}

impl fmt::Display for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for &b in row {
                f.write_str(if b { "1" } else { "0" })?;
            }
        }
        Ok(())
    }
}

impl FromStr for Lexicon {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let rows = s
            .split('/')
            .map(|row| {
                row.trim()
                    .chars()
                    .map(|c| match c {
                        '1' => Ok(true),
                        '0' => Ok(false),
                        _ => Err(ModelError::LexiconShape("lexicon rows may contain only 0 and 1")),
                    })
                    .collect::<Result<Vec<bool>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
    }
}
