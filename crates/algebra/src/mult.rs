//! The multiplication table: a sparse map from an (ordered) pair of basis
//! elements to their product, expressed as a linear combination of basis
//! elements.

use crate::basis::Basis;
use fp::SparseVec;
use rustc_hash::FxHashMap;

/// `table[(i, j)] = i * j` expressed in the basis. Missing entries mean the
/// product is the zero element, which is also a valid sparse value (`i * 0`
/// or `0 * j` are never stored since [`Basis::ZERO`] never appears as a key).
#[derive(Debug, Default)]
pub struct MultiplicationTable {
    table: FxHashMap<(Basis, Basis), SparseVec>,
}

impl MultiplicationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, left: Basis, right: Basis, product: SparseVec) {
        if left.is_zero() || right.is_zero() || product.is_zero() {
            return;
        }
        self.table.insert((left, right), product);
    }

    /// Look up `left * right`, defaulting to zero for unset or zero-operand
    /// pairs — every product not yet resolved by the extractor is zero in
    /// the algebra built so far (it will be resolved once its degree is
    /// reached by the build driver).
    pub fn get(&self, left: Basis, right: Basis) -> SparseVec {
        if left.is_zero() || right.is_zero() {
            return SparseVec::new();
        }
        self.table.get(&(left, right)).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp::ValidPrime;

    #[test]
    fn unset_products_are_zero() {
        let t = MultiplicationTable::new();
        assert!(t.get(Basis(1), Basis(2)).is_zero());
        assert!(t.get(Basis::ZERO, Basis(2)).is_zero());
    }

    #[test]
    fn set_then_get_round_trips() {
        let p = ValidPrime::new(5).unwrap();
        let mut t = MultiplicationTable::new();
        let prod = SparseVec::from_terms([(3, 2)], p);
        t.set(Basis(1), Basis(2), prod.clone());
        assert_eq!(t.get(Basis(1), Basis(2)), prod);
    }
}
