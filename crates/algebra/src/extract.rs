//! Extract the new basis and fill the multiplication table for one target
//! degree/type from the reduced matrix.
//!
//! Grounded on `spec.md` §4.7: register every non-pivot column as a new
//! basis element first (a non-pivot column's pair is, by definition, not
//! forced to be a combination of earlier pairs by any relation), then
//! resolve each pivot row purely in terms of already-registered non-pivot
//! columns — valid because true reduced row-echelon form guarantees a pivot
//! row is zero at every *other* pivot column (see `SPEC_FULL.md` §4.6/§4.7).

use crate::basis::{Basis, BasisKind, BasisTable};
use crate::error::EngineError;
use crate::matrix_builder::ColumnSpace;
use crate::mult::MultiplicationTable;
use crate::types::Name;
use fp::{Scalar, SparseMatrix, SparseVec};

/// Which columns are pivots after reduction, keyed by column index.
fn pivot_columns(matrix: &SparseMatrix) -> Vec<Option<usize>> {
    // row index -> pivot column, in reduced rows the leading entry is the
    // pivot (and is 1, since `SparseMatrix::reduce` scales it).
    matrix
        .rows
        .iter()
        .map(|row| row.iter_nonzero().next().map(|(c, _)| c))
        .collect()
}

/// Install new basis elements for every non-pivot column, then resolve each
/// pivot row's product into the multiplication table.
///
/// Returns the list of newly installed basis elements at this degree/type.
pub fn extract(
    matrix: &SparseMatrix,
    columns: &ColumnSpace,
    basis_table: &mut BasisTable,
    mult: &mut MultiplicationTable,
    target_degree: u32,
    target_name: Name,
    p: fp::ValidPrime,
) -> Result<Vec<Basis>, EngineError> {
    let row_pivots = pivot_columns(matrix);
    let pivot_cols: std::collections::HashSet<usize> = row_pivots.iter().filter_map(|p| *p).collect();

    let mut column_basis: Vec<Option<Basis>> = vec![None; columns.len()];
    let mut new_elements = Vec::new();
    for col in 0..columns.len() {
        if !pivot_cols.contains(&col) {
            let (left, right) = columns.pairs[col];
            let b = basis_table.install(BasisKind::Product(left, right), target_degree, target_name);
            column_basis[col] = Some(b);
            new_elements.push(b);
            // A non-pivot pair's product is, by definition, the new basis
            // element installed for it.
            mult.set(left, right, SparseVec::single(b.0 as usize, fp::scalar::one()));
        }
    }

    for (row_idx, pivot) in row_pivots.iter().enumerate() {
        let Some(pivot_col) = *pivot else { continue };
        let row = &matrix.rows[row_idx];
        let mut expr = SparseVec::new();
        for (col, coef) in row.iter_nonzero() {
            if col == pivot_col {
                continue;
            }
            let b = column_basis[col].ok_or_else(|| {
                EngineError::InvariantViolation(format!(
                    "pivot row {row_idx} references unresolved column {col}; the reducer should guarantee \
                     every non-pivot-column entry of a pivot row is zero"
                ))
            })?;
            let neg_coef: Scalar = fp::scalar::neg(coef, p);
            expr.add_term(b.0 as usize, neg_coef, p);
        }
        let (left, right) = columns.pairs[pivot_col];
        mult.set(left, right, expr);
    }

    Ok(new_elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisKind;
    use crate::types::{Type, TypeTable};
    use fp::{SparseVec, ValidPrime};

    #[test]
    fn nonpivot_columns_become_new_basis() {
        let p = ValidPrime::new(5).unwrap();
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let t0 = types.intern(Type::generator(1, 0));
        let g = basis.install(BasisKind::Generator(0), 1, t0);
        let target_ty = Type(vec![2]);
        let target_name = types.intern(target_ty.clone());
        let cols = ColumnSpace::build(&basis, &types, 2, &target_ty).unwrap();
        assert_eq!(cols.len(), 1);
        // No equations: the matrix is empty, so the single column has no
        // pivot and becomes a new basis element.
        let matrix = SparseMatrix::new(cols.len());
        let mut mult = MultiplicationTable::new();
        let new_elems = extract(&matrix, &cols, &mut basis, &mut mult, 2, target_name, p).unwrap();
        assert_eq!(new_elems.len(), 1);
        assert_eq!(basis.degree(new_elems[0]), 2);
        let _ = g;
    }

    #[test]
    fn pivot_rows_resolve_against_nonpivot_basis() {
        let p = ValidPrime::new(5).unwrap();
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let t0 = types.intern(Type::generator(2, 0));
        let t1 = types.intern(Type::generator(2, 1));
        let g0 = basis.install(BasisKind::Generator(0), 1, t0);
        let g1 = basis.install(BasisKind::Generator(1), 1, t1);
        let target_ty = Type(vec![1, 1]);
        let target_name = types.intern(target_ty.clone());
        let cols = ColumnSpace::build(&basis, &types, 2, &target_ty).unwrap();
        assert_eq!(cols.len(), 2);
        // One relation: col(g0,g1) - col(g1,g0) = 0 (commutativity).
        let c01 = cols.column_of(g0, g1).unwrap();
        let c10 = cols.column_of(g1, g0).unwrap();
        let row = SparseVec::from_terms([(c01, 1), (c10, p.value() - 1)], p);
        let mut matrix = SparseMatrix::new(cols.len());
        matrix.push_row(row);
        let inv = fp::InverseTable::new(p);
        matrix.reduce(&inv);
        let mut mult = MultiplicationTable::new();
        let new_elems = extract(&matrix, &cols, &mut basis, &mut mult, 2, target_name, p).unwrap();
        // One non-pivot column remains a free basis element; the pivot
        // column's pair resolves to it in the multiplication table.
        assert_eq!(new_elems.len(), 1);
        let resolved = mult.get(g0, g1);
        assert!(!resolved.is_zero());
    }
}
