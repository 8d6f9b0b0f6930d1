//! Flat weight buffers.
//!
//! A network persists as one ordered run of `f64` values. Writing appends,
//! reading walks forward through a cursor that lives only as long as a single
//! load, so independent loads never share a read position.

use crate::error::{NeuroError, Result};
use crate::network::kind::NetworkKind;

/// Forward-only read cursor over a flat buffer.
#[derive(Debug)]
pub struct FlatReader<'a> {
    data: &'a [f64],
    position: usize,
}

impl<'a> FlatReader<'a> {
    pub fn new(data: &'a [f64]) -> FlatReader<'a> {
        FlatReader { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn read(&mut self) -> Result<f64> {
        let value = *self
            .data
            .get(self.position)
            .ok_or(NeuroError::UnexpectedEnd { position: self.position })?;
        self.position += 1;
        Ok(value)
    }

    /// Fails unless the unread part of the buffer can hold every
    /// `(count, width)` group of records, `width` being the fewest values one
    /// record takes. Loaders call this before sizing anything from a header.
    pub fn ensure_room(&self, records: &[(usize, usize)]) -> Result<()> {
        let needed = records.iter().try_fold(0usize, |total, &(count, width)| {
            count.checked_mul(width).and_then(|values| total.checked_add(values))
        });
        match needed {
            Some(needed) if needed <= self.remaining() => Ok(()),
            _ => Err(NeuroError::UnexpectedEnd { position: self.data.len() }),
        }
    }

    /// Reads a non-negative whole number stored as `f64`.
    pub fn read_count(&mut self) -> Result<usize> {
        let value = self.read()?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
            return Err(NeuroError::InvalidCount { value });
        }
        Ok(value as usize)
    }

    /// Reads the type tag without judging it.
    pub fn read_kind(&mut self, expected: NetworkKind) -> Result<NetworkKind> {
        let found = self.read()?;
        NetworkKind::from_tag(found).ok_or(NeuroError::FormatMismatch { expected, found })
    }

    /// Reads the type tag and fails unless it is exactly `expected`.
    pub fn expect_kind(&mut self, expected: NetworkKind) -> Result<()> {
        let found = self.read()?;
        match NetworkKind::from_tag(found) {
            Some(kind) if kind == expected => Ok(()),
            _ => Err(NeuroError::FormatMismatch { expected, found }),
        }
    }
}

/// Append-only flat buffer builder; the mirror image of `FlatReader`.
#[derive(Debug, Default)]
pub struct FlatWriter {
    data: Vec<f64>,
}

impl FlatWriter {
    pub fn new() -> FlatWriter {
        FlatWriter::default()
    }

    pub fn push(&mut self, value: f64) {
        self.data.push(value);
    }

    pub fn push_count(&mut self, count: usize) {
        self.data.push(count as f64);
    }

    pub fn push_kind(&mut self, kind: NetworkKind) {
        self.data.push(kind.tag() as f64);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}
