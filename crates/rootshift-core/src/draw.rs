//! Draws and draw sequences.
//!
//! A [`Draw`] is one historical outcome: [`DRAW_SIZE`] distinct integers in
//! `1..=MAX_NUMBER`, stored sorted ascending. A [`Sequence`] is the
//! chronological list of draws; every engine stage borrows it as `&[Draw]`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, RootShiftError};

/// Number of values in every draw.
pub const DRAW_SIZE: usize = 6;

/// Largest value a draw may contain (values start at 1).
pub const MAX_NUMBER: u8 = 60;

/// One validated draw, sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Draw {
    values: [u8; DRAW_SIZE],
}

impl Draw {
    /// Validate and sort a draw.
    pub fn new(values: &[u8]) -> Result<Self> {
        if values.len() != DRAW_SIZE {
            return Err(RootShiftError::invalid_draw(format!(
                "expected {DRAW_SIZE} values, got {}",
                values.len()
            )));
        }
        let mut sorted = [0u8; DRAW_SIZE];
        sorted.copy_from_slice(values);
        sorted.sort_unstable();

        if let Some(&bad) = sorted.iter().find(|&&v| v == 0 || v > MAX_NUMBER) {
            return Err(RootShiftError::invalid_draw(format!(
                "value {bad} outside 1..={MAX_NUMBER}"
            )));
        }
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(RootShiftError::invalid_draw(format!(
                "duplicate value {}",
                pair[0]
            )));
        }
        Ok(Self { values: sorted })
    }

    /// Values in ascending order.
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn contains(&self, value: u8) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.values.iter().map(|&v| u32::from(v)).sum()
    }

    pub fn even_count(&self) -> usize {
        self.values.iter().filter(|&&v| v % 2 == 0).count()
    }

    pub fn min(&self) -> u8 {
        self.values[0]
    }

    pub fn max(&self) -> u8 {
        self.values[DRAW_SIZE - 1]
    }
}

impl TryFrom<Vec<u8>> for Draw {
    type Error = RootShiftError;

    fn try_from(values: Vec<u8>) -> Result<Self> {
        Self::new(&values)
    }
}

impl From<Draw> for Vec<u8> {
    fn from(draw: Draw) -> Self {
        draw.values.to_vec()
    }
}

/// Chronological list of draws, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    draws: Vec<Draw>,
}

impl Sequence {
    pub fn new(draws: Vec<Draw>) -> Self {
        Self { draws }
    }

    /// Validate raw value lists into a sequence, reporting the failing position.
    pub fn from_raw<I, V>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let draws = raw
            .into_iter()
            .enumerate()
            .map(|(i, values)| Draw::new(values.as_ref()).map_err(|e| e.at_draw(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { draws })
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// SHA-256 hex digest of the draw values, in order.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.draws)
    }
}

/// SHA-256 hex digest of a draw slice.
pub fn fingerprint(draws: &[Draw]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((draws.len() as u64).to_le_bytes());
    for draw in draws {
        hasher.update(draw.values());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
