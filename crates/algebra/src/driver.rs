//! The build driver: grows the basis and multiplication table one degree at
//! a time, and within a degree, one active type at a time.
//!
//! Grounded on `original_source/Build.c`/`Build.cpp`'s outer loop (`for (deg
//! = 2; deg <= user_max_degree; deg++) for each active type at deg`), fitted
//! onto this crate's sparse, type-indexed tables. Degree 1 is special-cased:
//! one basis generator per declared generator slot, installed with no
//! equations to solve.

use crate::basis::{Basis, BasisKind, BasisTable};
use crate::equations::generate_equations;
use crate::error::EngineError;
use crate::matrix_builder::{build_matrix, ColumnSpace};
use crate::mult::MultiplicationTable;
use crate::poly::Identity;
use crate::types::{Type, TypeTable};
use fp::{InverseTable, ValidPrime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress reported after each degree/type is built, mirroring
/// `Build.c`'s per-degree `PrintProgress` (current dimension, elapsed wall
/// time since the build started) plus the matrix shape `Build.c` only
/// surfaces for the final degree's density report.
#[derive(Debug, Clone)]
pub struct BuildProgress {
    pub degree: u32,
    pub type_vector: Type,
    pub rows: usize,
    pub cols: usize,
    pub rank: usize,
    pub new_basis_elements: usize,
    /// Total basis elements installed so far, across every degree
    /// (`Build.c`'s `Current_dimension`).
    pub current_dimension: usize,
    /// Wall-clock time elapsed since this `build()` call started
    /// (`Build.c`'s `Current_time - Start_time`).
    pub elapsed: Duration,
}

pub struct Driver<'a> {
    pub basis: &'a mut BasisTable,
    pub types: &'a mut TypeTable,
    pub mult: &'a mut MultiplicationTable,
    pub p: ValidPrime,
    pub inv: &'a InverseTable,
    /// The declared generator word: a per-slot degree bound (e.g. `3a2b2c`
    /// declares slot `a` bounded to degree 3, `b` and `c` to 2), matching
    /// spec.md §1's "generators (with multiplicities)". Its slot count is
    /// the number of declared generators; `build`'s own `max_degree`
    /// argument is the separate, possibly smaller, degree actually grown.
    pub target: Type,
    pub identities: &'a [Identity],
    pub cancel: Arc<AtomicBool>,
}

impl<'a> Driver<'a> {
    fn num_slots(&self) -> usize {
        self.target.num_slots()
    }

    fn check_cancelled(&self) -> Result<(), EngineError> {
        if self.cancel.load(Ordering::Relaxed) {
            Err(EngineError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Install the degree-1 basis: one generator per declared slot, unless
    /// already installed (idempotent across repeated `build` calls).
    fn ensure_generators(&mut self) {
        if !self.basis.at_degree(1).is_empty() {
            return;
        }
        let num_slots = self.num_slots();
        let mut names = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            let ty = self.types.intern(Type::generator(num_slots, slot));
            let b = self.basis.install(BasisKind::Generator(slot), 1, ty);
            self.types.update_type_table(ty, Some((b, b)));
            names.push(ty);
        }
        self.types.record_degree(names);
    }

    /// Build every degree from the current frontier up through
    /// `max_degree`, inclusive, reporting progress via `on_progress` as each
    /// degree/type completes. Returns early with `Interrupted` if the
    /// cancellation flag is set between checkpoints.
    pub fn build(
        &mut self,
        max_degree: u32,
        mut on_progress: impl FnMut(BuildProgress),
    ) -> Result<(), EngineError> {
        self.ensure_generators();
        let start = Instant::now();
        let mut degree = self.highest_built_degree().max(1) + 1;
        while degree <= max_degree {
            self.check_cancelled()?;
            let types_here = TypeTable::all_types_at_degree(&self.target, degree);
            let names: Vec<_> = types_here.iter().map(|ty| self.types.intern(ty.clone())).collect();
            self.types.record_degree(names.clone());
            for (ty, name) in types_here.iter().zip(names.iter()) {
                self.check_cancelled()?;
                self.build_degree_type(degree, ty, *name, start, &mut on_progress)?;
            }
            degree += 1;
        }
        Ok(())
    }

    fn highest_built_degree(&self) -> u32 {
        self.basis.all().map(|b| self.basis.degree(b)).max().unwrap_or(0)
    }

    fn build_degree_type(
        &mut self,
        degree: u32,
        ty: &Type,
        target_name: crate::types::Name,
        start: Instant,
        on_progress: &mut impl FnMut(BuildProgress),
    ) -> Result<(), EngineError> {
        let columns = ColumnSpace::build(self.basis, self.types, degree, ty)?;
        if columns.is_empty() {
            on_progress(BuildProgress {
                degree,
                type_vector: ty.clone(),
                rows: 0,
                cols: 0,
                rank: 0,
                new_basis_elements: 0,
                current_dimension: self.basis.len(),
                elapsed: start.elapsed(),
            });
            return Ok(());
        }

        let mut equations = Vec::new();
        for identity in self.identities {
            self.check_cancelled()?;
            if identity.letter_degree() as u32 > degree {
                continue;
            }
            let candidates: Vec<Basis> = self.basis.all().filter(|&b| self.basis.degree(b) < degree).collect();
            let eqs = generate_equations(identity, target_name, self.basis, self.types, self.mult, self.p, &candidates);
            equations
                .try_reserve(eqs.len())
                .map_err(|_| EngineError::OutOfMemory)?;
            equations.extend(eqs.into_iter().filter(|e| !e.is_empty()));
        }

        let mut matrix = build_matrix(&equations, &columns, self.inv);
        let rank = matrix.reduce(self.inv);
        let new_elements =
            crate::extract::extract(&matrix, &columns, self.basis, self.mult, degree, target_name, self.p)?;
        let range = match (new_elements.first(), new_elements.last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        };
        self.types.update_type_table(target_name, range);

        on_progress(BuildProgress {
            degree,
            type_vector: ty.clone(),
            rows: matrix.num_rows(),
            cols: columns.len(),
            rank,
            new_basis_elements: new_elements.len(),
            current_dimension: self.basis.len(),
            elapsed: start.elapsed(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::commutator;
    use crate::poly::{TermTree, Var};

    #[test]
    fn free_algebra_with_no_identities_grows_full_basis() {
        let p = ValidPrime::new(2).unwrap();
        let inv = InverseTable::new(p);
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let mut mult = MultiplicationTable::new();
        let identities: Vec<Identity> = Vec::new();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut driver = Driver {
            basis: &mut basis,
            types: &mut types,
            mult: &mut mult,
            p,
            inv: &inv,
            target: Type(vec![3]),
            identities: &identities,
            cancel,
        };
        let mut progress = Vec::new();
        driver.build(3, |p| progress.push(p)).unwrap();
        // One generator, no identities: degree n has dimension = number of
        // distinct nonassociative binary trees with n leaves (Catalan
        // numbers): deg1=1, deg2=1, deg3=2.
        assert_eq!(basis.at_degree(1).len(), 1);
        assert_eq!(basis.at_degree(2).len(), 1);
        assert_eq!(basis.at_degree(3).len(), 2);
    }

    #[test]
    fn anticommutative_identity_collapses_degree_two() {
        let p = ValidPrime::new(5).unwrap();
        let inv = InverseTable::new(p);
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let mut mult = MultiplicationTable::new();
        let x = TermTree::leaf(Var(0));
        let y = TermTree::leaf(Var(1));
        let identities = vec![Identity::new("anticommutative", commutator(x, y)).unwrap()];
        let cancel = Arc::new(AtomicBool::new(false));
        let mut driver = Driver {
            basis: &mut basis,
            types: &mut types,
            mult: &mut mult,
            p,
            inv: &inv,
            target: Type(vec![2, 2]),
            identities: &identities,
            cancel,
        };
        driver.build(2, |_| {}).unwrap();
        // Free dimension at degree 2 over 2 generators is 4 (aa,ab,ba,bb).
        // [a,b]=0 only constrains the mixed type (1,1), where it forces
        // ab=ba and drops that sector's dimension from 2 to 1; the pure
        // types (2,0)/(0,2) each keep their single free element (aa / bb).
        let count = basis.all().filter(|&b| basis.degree(b) == 2).count();
        assert_eq!(count, 3);
    }

    #[test]
    fn cancellation_flag_stops_the_build() {
        let p = ValidPrime::new(2).unwrap();
        let inv = InverseTable::new(p);
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let mut mult = MultiplicationTable::new();
        let identities: Vec<Identity> = Vec::new();
        let cancel = Arc::new(AtomicBool::new(true));
        let mut driver = Driver {
            basis: &mut basis,
            types: &mut types,
            mult: &mut mult,
            p,
            inv: &inv,
            target: Type(vec![3]),
            identities: &identities,
            cancel,
        };
        let result = driver.build(3, |_| {});
        assert!(matches!(result, Err(EngineError::Interrupted)));
    }
}
