//! Sparse vectors over GF(p).
//!
//! The Steenrod-algebra tooling this crate is styled after keeps a dense,
//! bit-packed `FpVector` because its algebras are small-dimensional per
//! degree. Here the index space (basis indices, or matrix columns) is
//! unbounded and support is typically tiny, so `SparseVec`/`SparseRow` keep
//! the same `iter_nonzero`-shaped interface but back it with a sorted
//! `Vec<(index, Scalar)>` (spec's own design notes ask for exactly this).

use crate::prime::ValidPrime;
use crate::scalar::{self, Scalar};

/// A sparse map from index to nonzero scalar, sorted ascending by index.
///
/// Invariant: no entry has a zero scalar; indices are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseVec {
    entries: Vec<(usize, Scalar)>,
}

impl SparseVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(index: usize, coef: Scalar) -> Self {
        if coef == 0 {
            Self::new()
        } else {
            Self {
                entries: vec![(index, coef)],
            }
        }
    }

    /// Build from an iterator of `(index, coef)`, combining duplicate
    /// indices and stripping zero results.
    pub fn from_terms(terms: impl IntoIterator<Item = (usize, Scalar)>, p: ValidPrime) -> Self {
        let mut v = Self::new();
        for (idx, coef) in terms {
            v.add_term(idx, coef, p);
        }
        v
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, Scalar)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Scalar {
        match self.entries.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => self.entries[pos].1,
            Err(_) => 0,
        }
    }

    /// `self[index] += coef`, dropping the entry if the result is zero.
    pub fn add_term(&mut self, index: usize, coef: Scalar, p: ValidPrime) {
        if coef == 0 {
            return;
        }
        match self.entries.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => {
                let sum = scalar::add(self.entries[pos].1, coef, p);
                if sum == 0 {
                    self.entries.remove(pos);
                } else {
                    self.entries[pos].1 = sum;
                }
            }
            Err(pos) => self.entries.insert(pos, (index, coef)),
        }
    }

    /// `self *= x`, clearing entirely if `x == 0`.
    pub fn scale(&mut self, x: Scalar, p: ValidPrime) {
        if x == 0 {
            self.entries.clear();
        } else if x != 1 {
            for (_, c) in &mut self.entries {
                *c = scalar::mul(*c, x, p);
            }
        }
    }

    pub fn scaled(&self, x: Scalar, p: ValidPrime) -> Self {
        let mut out = self.clone();
        out.scale(x, p);
        out
    }

    /// `self += other` (two-finger merge over sorted entries).
    pub fn add_in_place(&mut self, other: &Self, p: ValidPrime) {
        let mut merged = Vec::with_capacity(self.entries.len() + other.entries.len());
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (ia, ca) = self.entries[i];
            let (ib, cb) = other.entries[j];
            match ia.cmp(&ib) {
                std::cmp::Ordering::Less => {
                    merged.push((ia, ca));
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push((ib, cb));
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    let sum = scalar::add(ca, cb, p);
                    if sum != 0 {
                        merged.push((ia, sum));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.entries[i..]);
        merged.extend_from_slice(&other.entries[j..]);
        self.entries = merged;
    }

    /// `self += x * other`.
    pub fn add_scaled(&mut self, other: &Self, x: Scalar, p: ValidPrime) {
        if x == 0 || other.is_zero() {
            return;
        }
        let scaled = other.scaled(x, p);
        self.add_in_place(&scaled, p);
    }
}

/// A sparse matrix row. Semantically the same shape as [`SparseVec`] but
/// kept as a distinct alias so call sites read as "matrix row" vs. "algebra
/// element" even though both are sorted `(index, Scalar)` runs.
pub type SparseRow = SparseVec;
