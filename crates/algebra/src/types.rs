//! Multidegree "types": vectors over generator slots, interned to small
//! integer names, and the degree-indexed table of which types have been
//! declared active at each degree.

use crate::basis::Basis;
use once::OnceBiVec;
use rustc_hash::FxHashMap;
use std::fmt;

/// A multidegree: one exponent per generator slot. `Type(vec![1,0,2])` means
/// "one copy of slot 0, zero of slot 1, two of slot 2".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Type(pub Vec<u32>);

impl Type {
    pub fn zero(num_slots: usize) -> Self {
        Self(vec![0; num_slots])
    }

    pub fn generator(num_slots: usize, slot: usize) -> Self {
        let mut v = vec![0; num_slots];
        v[slot] = 1;
        Self(v)
    }

    pub fn degree(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn num_slots(&self) -> usize {
        self.0.len()
    }

    pub fn checked_add(&self, other: &Type) -> Option<Type> {
        if self.0.len() != other.0.len() {
            return None;
        }
        Some(Type(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect()))
    }

    /// Componentwise `<=`: every slot of `self` is at most the corresponding
    /// slot of `other`. Used to prune a partial multidegree against a
    /// declared target bound, mirroring `driver.cpp`'s `Compatible` check
    /// (`Poly->deg_letter[i] > ptype.degrees[i]` fails compatibility).
    pub fn le(&self, other: &Type) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}

/// An interned handle to a [`Type`], cheap to copy and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(pub u32);

/// Interning table mapping [`Type`] values to [`Name`]s and back, plus the
/// degree-indexed set of names "active" (declared reachable) at each degree.
///
/// Grounded on the type-table description in the algebra build driver: the
/// engine enumerates all multidegrees reachable at a given total degree
/// under the declared generator slots, and only tracks bases for the
/// multidegrees actually requested by a `build` command.
///
/// `degree_order` and `ranges` realize spec.md §4.2's `FirstTypeDegree`/
/// `NextTypeSameDegree`/`UpdateTypeTable` directly: the build driver records,
/// once per degree it visits (in the same order `all_types_at_degree`
/// enumerated that degree, starting at degree 1's declared generators), the
/// ordered list of type names active there, and afterwards stamps each
/// type's basis-index range as extraction fills it in.
#[derive(Debug)]
pub struct TypeTable {
    names: FxHashMap<Type, Name>,
    types: Vec<Type>,
    degree_order: OnceBiVec<Vec<Name>>,
    ranges: FxHashMap<Name, (Basis, Basis)>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        Self {
            names: FxHashMap::default(),
            types: Vec::new(),
            degree_order: OnceBiVec::new(1),
            ranges: FxHashMap::default(),
        }
    }

    pub fn intern(&mut self, ty: Type) -> Name {
        if let Some(&name) = self.names.get(&ty) {
            return name;
        }
        let name = Name(self.types.len() as u32);
        self.types.push(ty.clone());
        self.names.insert(ty, name);
        name
    }

    pub fn lookup(&self, name: Name) -> &Type {
        &self.types[name.0 as usize]
    }

    pub fn find(&self, ty: &Type) -> Option<Name> {
        self.names.get(ty).copied()
    }

    pub fn degree_of_name(&self, name: Name) -> u32 {
        self.lookup(name).degree()
    }

    /// Record the ordered list of type names the build driver just finished
    /// visiting at `degree` (the order `all_types_at_degree` produced, in the
    /// names they were interned to). Must be called exactly once per degree,
    /// in increasing degree order starting at 1 — the same order the build
    /// driver itself advances in.
    pub fn record_degree(&mut self, names: Vec<Name>) {
        self.degree_order.push(names);
    }

    /// The first type name active at `degree`, per spec.md §4.2's
    /// `FirstTypeDegree`.
    pub fn first_type_degree(&self, degree: u32) -> Option<Name> {
        self.degree_order.get(degree as i32)?.first().copied()
    }

    /// The type name recorded immediately after `name` within its own
    /// degree's traversal order, per spec.md §4.2's `NextTypeSameDegree`.
    pub fn next_type_same_degree(&self, name: Name) -> Option<Name> {
        let degree = self.degree_of_name(name);
        let list = self.degree_order.get(degree as i32)?;
        let pos = list.iter().position(|&n| n == name)?;
        list.get(pos + 1).copied()
    }

    /// Stamp the basis-index range realizing `name`, per spec.md §4.2's
    /// `UpdateTypeTable(n, begin_basis, end_basis)`. `range` is `None` when
    /// this degree/type contributed no new basis elements (every pair was a
    /// dependent relation, e.g. scenario 5's nilpotent-square collapse).
    pub fn update_type_table(&mut self, name: Name, range: Option<(Basis, Basis)>) {
        if let Some(r) = range {
            self.ranges.insert(name, r);
        }
    }

    /// The basis-index range last stamped for `name` by [`Self::update_type_table`].
    pub fn basis_range(&self, name: Name) -> Option<(Basis, Basis)> {
        self.ranges.get(&name).copied()
    }

    /// Enumerate every multidegree at `degree` whose slots sum to `degree`
    /// and which stays componentwise `<= target`, via bounded stars-and-bars
    /// recursion. Grounded on `spec.md` §4.2 ("the table enumerates every
    /// vector V with `V ≤ T componentwise`") and on `driver.cpp`'s
    /// `CreateTargetType`/`Compatible`, which bound every sub-type explored
    /// during a build by the declared generator word's per-slot degrees.
    pub fn all_types_at_degree(target: &Type, degree: u32) -> Vec<Type> {
        let num_slots = target.num_slots();
        let mut out = Vec::new();
        let mut buf = vec![0u32; num_slots];
        fn rec(buf: &mut [u32], bound: &[u32], remaining: u32, pos: usize, out: &mut Vec<Type>) {
            if pos == buf.len() {
                if remaining == 0 {
                    out.push(Type(buf.to_vec()));
                }
                return;
            }
            let max_here = remaining.min(bound[pos]);
            for v in 0..=max_here {
                buf[pos] = v;
                rec(buf, bound, remaining - v, pos + 1, out);
            }
        }
        if num_slots == 0 {
            return out;
        }
        rec(&mut buf, &target.0, degree, 0, &mut out);
        out
    }
}
