//! Sparse row reduction over GF(p).
//!
//! Grounded on `spec.md` §4.6 / `SPEC_FULL.md` §4.6, generalizing the
//! design note from `original_source/CreateMatrix.cpp`'s `SparseFillTheMatrix`
//! (singly-linked row lists) into growable sorted `Vec`s with a two-finger
//! merge for row elimination.

use crate::prime::ValidPrime;
use crate::scalar::{self, InverseTable};
use crate::vector::SparseRow;

/// A sparse matrix over GF(p), stored as one [`SparseRow`] per row.
#[derive(Debug, Clone, Default)]
pub struct SparseMatrix {
    pub rows: Vec<SparseRow>,
    pub cols: usize,
}

impl SparseMatrix {
    pub fn new(cols: usize) -> Self {
        Self {
            rows: Vec::new(),
            cols,
        }
    }

    pub fn with_rows(rows: Vec<SparseRow>, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn push_row(&mut self, row: SparseRow) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_nonzero(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Reduce `self` in place to reduced row-echelon form over GF(p) and
    /// return the rank.
    ///
    /// Pivot sweep left to right over columns. For each column, the first
    /// row (at or below the current pivot index) whose *leading* entry sits
    /// in that column becomes the pivot row; it is scaled to a leading 1,
    /// then subtracted (suitably scaled) from *every other* row that has a
    /// nonzero entry in that column — both rows still below the pivot frontier
    /// and rows already fixed as earlier pivots, which is what makes this
    /// reduced rather than merely echelon form (see SPEC_FULL.md §4.6).
    pub fn reduce(&mut self, inv: &InverseTable) -> usize {
        let p = inv.prime();
        let mut pivot_row = 0usize;
        for col in 0..self.cols {
            if pivot_row >= self.rows.len() {
                break;
            }
            let found = (pivot_row..self.rows.len()).find(|&i| leading_col(&self.rows[i]) == Some(col));
            let Some(found) = found else { continue };
            self.rows.swap(pivot_row, found);

            let lead = self.rows[pivot_row].get(col);
            if lead != 1 {
                let scale = inv.inv(lead);
                self.rows[pivot_row].scale(scale, p);
            }

            let pivot = self.rows[pivot_row].clone();
            for k in 0..self.rows.len() {
                if k == pivot_row {
                    continue;
                }
                let coeff = self.rows[k].get(col);
                if coeff != 0 {
                    let neg_coeff = scalar::neg(coeff, p);
                    self.rows[k].add_scaled(&pivot, neg_coeff, p);
                }
            }
            pivot_row += 1;
        }
        pivot_row
    }
}

fn leading_col(row: &SparseRow) -> Option<usize> {
    row.iter_nonzero().next().map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prime::ValidPrime;
    use crate::vector::SparseVec;

    #[test]
    fn reduces_simple_system() {
        let p = ValidPrime::new(5).unwrap();
        let inv = InverseTable::new(p);
        // [ 1 1 ]   rank 1, row reduces to [1 1]
        let mut m = SparseMatrix::with_rows(vec![SparseVec::from_terms([(0, 1), (1, 1)], p)], 2);
        let rank = m.reduce(&inv);
        assert_eq!(rank, 1);
        assert_eq!(m.rows[0].iter_nonzero().collect::<Vec<_>>(), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn eliminates_above_and_below() {
        let p = ValidPrime::new(5).unwrap();
        let inv = InverseTable::new(p);
        // row0: col0=1, col1=2 ; row1: col0=0, col1=1
        // after reduction col1 pivot should also clear row0's col1 entry.
        let mut m = SparseMatrix::with_rows(
            vec![
                SparseVec::from_terms([(0, 1), (1, 2)], p),
                SparseVec::from_terms([(1, 1)], p),
            ],
            2,
        );
        let rank = m.reduce(&inv);
        assert_eq!(rank, 2);
        assert_eq!(m.rows[0].iter_nonzero().collect::<Vec<_>>(), vec![(0, 1)]);
        assert_eq!(m.rows[1].iter_nonzero().collect::<Vec<_>>(), vec![(1, 1)]);
    }

    #[test]
    fn dependent_rows_drop_rank() {
        let p = ValidPrime::new(5).unwrap();
        let inv = InverseTable::new(p);
        let mut m = SparseMatrix::with_rows(
            vec![
                SparseVec::from_terms([(0, 1), (1, 1)], p),
                SparseVec::from_terms([(0, 2), (1, 2)], p),
            ],
            2,
        );
        let rank = m.reduce(&inv);
        assert_eq!(rank, 1);
    }
}
