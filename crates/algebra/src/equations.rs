//! The equation generator: substitute basis elements for an identity's
//! variables and expand each resulting term into a linear combination of
//! basis pairs at the target degree.
//!
//! Grounded on the description of `GenerateEquations` in `spec.md` §4.4 (the
//! matching `original_source/GenerateEquations.c` was not available in the
//! retrieved reference material, so this is implemented directly from the
//! specification's algorithmic description rather than transliterated from
//! a teacher source file — see `DESIGN.md`).

use crate::basis::{Basis, BasisTable};
use crate::mult::MultiplicationTable;
use crate::poly::{Identity, Term, TermTree, Var};
use crate::types::{Name, Type, TypeTable};
use fp::{Scalar, ValidPrime};
use std::collections::BTreeMap;

/// One row of the matrix to be built: a linear combination of basis-element
/// pairs `(left, right)`, each pair contributing `coef * (left * right)` at
/// the target degree. Pairs are not yet resolved against the (incomplete)
/// multiplication table at the target degree — that is the matrix builder's
/// job once the column space is known.
#[derive(Debug, Clone, Default)]
pub struct Equation {
    pub terms: Vec<(Scalar, Basis, Basis)>,
}

impl Equation {
    fn add(&mut self, coef: Scalar, left: Basis, right: Basis, p: ValidPrime) {
        if coef == 0 || left.is_zero() || right.is_zero() {
            return;
        }
        if let Some(entry) = self.terms.iter_mut().find(|(_, l, r)| *l == left && *r == right) {
            entry.0 = fp::scalar::add(entry.0, coef, p);
        } else {
            self.terms.push((coef, left, right));
        }
        self.terms.retain(|(c, _, _)| *c != 0);
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Assigns each of an identity's variables to a basis element, checked
/// against the target multidegree as assignments are built up.
struct Assignment<'a> {
    vars: Vec<Var>,
    /// Each variable's leaf-occurrence count in the identity (e.g. `x` twice
    /// in `xx`): a repeated leaf reuses the same assigned basis element at
    /// every occurrence, so it must also count that many times toward the
    /// substituted term's real multidegree.
    multiplicities: BTreeMap<Var, u32>,
    basis: BTreeMap<Var, Basis>,
    basis_table: &'a BasisTable,
    type_table: &'a TypeTable,
    target: &'a Type,
}

impl<'a> Assignment<'a> {
    fn partial_type(&self) -> Option<Type> {
        let mut acc = Type::zero(self.target.num_slots());
        for (var, b) in &self.basis {
            let ty = self.type_table.lookup(self.basis_table.type_name(*b));
            let mult = self.multiplicities.get(var).copied().unwrap_or(1);
            for _ in 0..mult {
                acc = acc.checked_add(ty)?;
            }
        }
        Some(acc)
    }

    /// Whether the partial assignment could still extend to something
    /// matching `target`: every already-assigned slot must not exceed the
    /// target's corresponding slot.
    fn still_feasible(&self) -> bool {
        match self.partial_type() {
            Some(acc) => acc.le(self.target),
            None => false,
        }
    }
}

/// Enumerate every basis-element substitution for `identity`'s variables
/// that is compatible with `target`, expanding each term bottom-up through
/// `mult` (valid below the target degree), and emit one [`Equation`] per
/// substitution.
pub fn generate_equations(
    identity: &Identity,
    target_name: Name,
    basis_table: &BasisTable,
    type_table: &TypeTable,
    mult: &MultiplicationTable,
    p: ValidPrime,
    candidates: &[Basis],
) -> Vec<Equation> {
    let target = type_table.lookup(target_name).clone();
    let vars: Vec<Var> = identity.vars().into_iter().collect();
    let mut out = Vec::new();
    let mut assignment = Assignment {
        vars: vars.clone(),
        multiplicities: identity.var_multiplicities(),
        basis: BTreeMap::new(),
        basis_table,
        type_table,
        target: &target,
    };
    backtrack(0, &mut assignment, identity, candidates, mult, p, &mut out);
    out
}

fn backtrack(
    pos: usize,
    assignment: &mut Assignment,
    identity: &Identity,
    candidates: &[Basis],
    mult: &MultiplicationTable,
    p: ValidPrime,
    out: &mut Vec<Equation>,
) {
    if pos == assignment.vars.len() {
        if assignment.partial_type().as_ref() == Some(assignment.target) {
            out.push(expand_identity(identity, assignment, mult, p));
        }
        return;
    }
    let var = assignment.vars[pos];
    for &b in candidates {
        assignment.basis.insert(var, b);
        if assignment.still_feasible() {
            backtrack(pos + 1, assignment, identity, candidates, mult, p, out);
        }
        assignment.basis.remove(&var);
    }
}

fn expand_identity(identity: &Identity, assignment: &Assignment, mult: &MultiplicationTable, p: ValidPrime) -> Equation {
    let mut eq = Equation::default();
    for term in &identity.terms {
        expand_term(term, assignment, mult, p, &mut eq);
    }
    eq
}

/// Resolve everything strictly below the term's outermost multiplication
/// through `mult` (always complete there, since it is at a lower degree
/// than the target), then cross-multiply the two top-level factors directly
/// into `(coef, left, right)` equation terms, since the multiplication table
/// is not yet complete at the target degree.
fn expand_term(term: &Term, assignment: &Assignment, mult: &MultiplicationTable, p: ValidPrime, eq: &mut Equation) {
    match &term.tree {
        TermTree::Leaf(v) => {
            // A bare variable at the identity's own top level only arises
            // for degenerate degree-1 "identities"; there is no pair to
            // cross-multiply, so fold it against the reserved zero basis
            // element, which the matrix builder never assigns a column to
            // and which therefore contributes nothing.
            let b = assignment.basis[v];
            let coef = fp::scalar::from_i32(term.coef, p);
            eq.add(coef, b, Basis::ZERO, p);
        }
        TermTree::Mul(l, r) => {
            let left = resolve(l, assignment, mult, p);
            let right = resolve(r, assignment, mult, p);
            let term_coef = fp::scalar::from_i32(term.coef, p);
            for (lb, lc) in left.iter_nonzero() {
                for (rb, rc) in right.iter_nonzero() {
                    let coef = fp::scalar::mul(fp::scalar::mul(term_coef, lc, p), rc, p);
                    eq.add(coef, Basis(lb as u32), Basis(rb as u32), p);
                }
            }
        }
    }
}

/// Resolve a subtree strictly below the identity's top-level multiplication
/// into a linear combination of basis elements, via the (complete, at this
/// lower degree) multiplication table.
fn resolve(tree: &TermTree, assignment: &Assignment, mult: &MultiplicationTable, p: ValidPrime) -> fp::SparseVec {
    match tree {
        TermTree::Leaf(v) => {
            let b = assignment.basis[v];
            fp::SparseVec::single(b.0 as usize, fp::scalar::one())
        }
        TermTree::Mul(l, r) => {
            let left = resolve(l, assignment, mult, p);
            let right = resolve(r, assignment, mult, p);
            let mut out = fp::SparseVec::new();
            for (lb, lc) in left.iter_nonzero() {
                for (rb, rc) in right.iter_nonzero() {
                    let prod = mult.get(Basis(lb as u32), Basis(rb as u32));
                    out.add_scaled(&prod, fp::scalar::mul(lc, rc, p), p);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisKind;
    use crate::poly::commutator;

    fn setup_two_generators(p: ValidPrime) -> (BasisTable, TypeTable, MultiplicationTable, Name) {
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let mult = MultiplicationTable::new();
        let t0 = types.intern(Type::generator(2, 0));
        let t1 = types.intern(Type::generator(2, 1));
        basis.install(BasisKind::Generator(0), 1, t0);
        basis.install(BasisKind::Generator(1), 1, t1);
        let target = types.intern(Type(vec![1, 1]));
        (basis, types, mult, target)
    }

    #[test]
    fn generates_one_equation_per_valid_substitution() {
        let p = ValidPrime::new(5).unwrap();
        let (basis, types, mult, target) = setup_two_generators(p);
        let x = TermTree::leaf(Var(0));
        let y = TermTree::leaf(Var(1));
        let id = Identity::new("anticommutative", commutator(x, y)).unwrap();
        let candidates: Vec<Basis> = basis.at_degree(1);
        let eqs = generate_equations(&id, target, &basis, &types, &mult, p, &candidates);
        // x,y each range over the 2 degree-1 generators; only the assignment
        // with total type (1,1) survives: (x=g0,y=g1) and (x=g1,y=g0).
        assert_eq!(eqs.len(), 2);
        for eq in &eqs {
            assert_eq!(eq.terms.len(), 2);
        }
    }

    #[test]
    fn repeated_variable_counts_its_degree_once_per_occurrence() {
        // One generator `a` (deg 1), identity `xx=0`. At target degree 2,
        // x=a must weigh in as degree 1*2=2 (matching the target), not
        // degree 1 (as if x occurred only once) — otherwise this identity
        // would wrongly look inapplicable at degree 2 and never constrain
        // anything, per scenario 5 of the specification.
        let p = ValidPrime::new(5).unwrap();
        let mut basis = BasisTable::new();
        let mut types = TypeTable::new();
        let mult = MultiplicationTable::new();
        let t0 = types.intern(Type::generator(1, 0));
        basis.install(BasisKind::Generator(0), 1, t0);
        let target = types.intern(Type(vec![2]));
        let x = TermTree::leaf(Var(0));
        let xx = TermTree::mul(x.clone(), x);
        let id = Identity::new("nilpotent_square", vec![Term::new(1, xx).unwrap()]).unwrap();
        let candidates: Vec<Basis> = basis.at_degree(1);
        let eqs = generate_equations(&id, target, &basis, &types, &mult, p, &candidates);
        assert_eq!(eqs.len(), 1);
        assert_eq!(eqs[0].terms.len(), 1);
    }
}
