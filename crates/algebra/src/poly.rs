//! The nonassociative polynomial / identity model.
//!
//! An identity is a homogeneous polynomial in a handful of abstract
//! variables (bound names local to the identity, independent of any
//! declared generator). Each term is a signed monomial: a binary tree of
//! variable leaves built purely from (nonassociative) multiplication.
//! `[x,y]` and `<x,y,z>` are notation, not new node kinds: the parser
//! expands a commutator or Jordan associator into its two-term multiplication
//! expansion as soon as it is read, so everything downstream (the equation
//! generator) only ever sees plain `Mul` trees with signed coefficients.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A bound variable local to one identity, e.g. `x`, `y`, `z` in `xy - yx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub u32);

/// A binary tree of variable leaves joined by nonassociative multiplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermTree {
    Leaf(Var),
    Mul(Box<TermTree>, Box<TermTree>),
}

impl TermTree {
    pub fn leaf(v: Var) -> Self {
        TermTree::Leaf(v)
    }

    pub fn mul(l: TermTree, r: TermTree) -> Self {
        TermTree::Mul(Box::new(l), Box::new(r))
    }

    /// Total number of variable occurrences (with multiplicity) — the
    /// monomial's degree in "number of letters".
    pub fn num_leaves(&self) -> usize {
        match self {
            TermTree::Leaf(_) => 1,
            TermTree::Mul(l, r) => l.num_leaves() + r.num_leaves(),
        }
    }

    pub fn vars(&self, out: &mut BTreeSet<Var>) {
        match self {
            TermTree::Leaf(v) => {
                out.insert(*v);
            }
            TermTree::Mul(l, r) => {
                l.vars(out);
                r.vars(out);
            }
        }
    }

    /// Count each variable's number of leaf occurrences in this tree, e.g.
    /// `xx` counts `x` twice. A substituted term's real multidegree is this
    /// count times the assigned basis element's multidegree at every
    /// occurrence, not once per distinct variable.
    pub fn var_multiplicities(&self, out: &mut BTreeMap<Var, u32>) {
        match self {
            TermTree::Leaf(v) => {
                *out.entry(*v).or_insert(0) += 1;
            }
            TermTree::Mul(l, r) => {
                l.var_multiplicities(out);
                r.var_multiplicities(out);
            }
        }
    }
}

impl fmt::Display for TermTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermTree::Leaf(v) => write!(f, "{}", var_name(*v)),
            TermTree::Mul(l, r) => write!(f, "({l}{r})"),
        }
    }
}

/// Letters beyond `z` are named `v26`, `v27`, ... — identities in practice
/// use a handful of single letters, but nothing bounds the variable count.
pub fn var_name(v: Var) -> String {
    if v.0 < 26 {
        ((b'a' + v.0 as u8) as char).to_string()
    } else {
        format!("v{}", v.0)
    }
}

/// The coefficient magnitude an identity term's integer literal may carry,
/// per the REPL grammar: "Coefficients must lie in (-65535, 65535) before
/// reduction mod p."
pub const COEFFICIENT_BOUND: i32 = 65535;

/// A signed monomial: `coef * tree`. `coef` is a plain signed integer (not
/// yet reduced mod any field), matching the REPL grammar's `2xy - 3yx`-style
/// literal coefficients; reduction into GF(p) happens at expansion time, once
/// the field is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub coef: i32,
    pub tree: TermTree,
}

impl Term {
    pub fn new(coef: i32, tree: TermTree) -> anyhow::Result<Self> {
        if coef == 0 {
            anyhow::bail!("a term's coefficient must be nonzero");
        }
        if coef <= -COEFFICIENT_BOUND || coef >= COEFFICIENT_BOUND {
            anyhow::bail!("coefficient {coef} is out of range (-{COEFFICIENT_BOUND}, {COEFFICIENT_BOUND})");
        }
        Ok(Self { coef, tree })
    }

    /// Build a unit-coefficient term directly, for call sites (commutator and
    /// Jordan-associator expansion, and every existing in-crate test) that
    /// only ever need coefficient `1` or `-1`, which are always in range.
    fn unit(sign: i32, tree: TermTree) -> Self {
        debug_assert!(sign == 1 || sign == -1);
        Self { coef: sign, tree }
    }

    /// The same term with its coefficient's sign flipped, used when a
    /// parsed identity's right-hand side is moved to the left. Always valid:
    /// negating a coefficient already inside `(-COEFFICIENT_BOUND,
    /// COEFFICIENT_BOUND)` stays inside that range.
    pub fn negated(&self) -> Self {
        Self {
            coef: -self.coef,
            tree: self.tree.clone(),
        }
    }
}

/// A homogeneous identity: a named sum of [`Term`]s, all built from the same
/// set of bound variables and all of the same letter-degree.
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub terms: Vec<Term>,
}

impl Identity {
    pub fn new(name: impl Into<String>, terms: Vec<Term>) -> anyhow::Result<Self> {
        let identity = Self {
            name: name.into(),
            terms,
        };
        identity.check_homogeneous()?;
        if identity.letter_degree() < 2 {
            anyhow::bail!("identity `{}`: total degree must be at least 2", identity.name);
        }
        Ok(identity)
    }

    pub fn letter_degree(&self) -> usize {
        self.terms.first().map(|t| t.tree.num_leaves()).unwrap_or(0)
    }

    pub fn vars(&self) -> BTreeSet<Var> {
        let mut out = BTreeSet::new();
        for t in &self.terms {
            t.tree.vars(&mut out);
        }
        out
    }

    /// Each variable's leaf-occurrence count, read off a representative term
    /// (the first). Homogeneity guarantees every term shares the same
    /// variable set; a repeated leaf like `xx` in scenario 5's `xx=0` must
    /// count `x` twice when checking a substitution's multidegree.
    pub fn var_multiplicities(&self) -> BTreeMap<Var, u32> {
        let mut out = BTreeMap::new();
        if let Some(first) = self.terms.first() {
            first.tree.var_multiplicities(&mut out);
        }
        out
    }

    fn check_homogeneous(&self) -> anyhow::Result<()> {
        let degrees: BTreeSet<usize> = self.terms.iter().map(|t| t.tree.num_leaves()).collect();
        if degrees.len() > 1 {
            anyhow::bail!(
                "identity `{}` is not homogeneous: terms have letter-degrees {:?}",
                self.name,
                degrees
            );
        }
        let var_sets: Vec<BTreeSet<Var>> = self
            .terms
            .iter()
            .map(|t| {
                let mut s = BTreeSet::new();
                t.tree.vars(&mut s);
                s
            })
            .collect();
        if let Some(first) = var_sets.first() {
            if var_sets.iter().any(|s| s != first) {
                anyhow::bail!(
                    "identity `{}` uses different variables across its terms",
                    self.name
                );
            }
        }
        Ok(())
    }
}

/// Expand `[x,y] = xy - yx` into its two signed multiplication terms.
pub fn commutator(x: TermTree, y: TermTree) -> Vec<Term> {
    vec![
        Term::unit(1, TermTree::mul(x.clone(), y.clone())),
        Term::unit(-1, TermTree::mul(y, x)),
    ]
}

/// Expand the Jordan associator `<x,y,z> = (xy)z - x(yz)` into its two
/// signed multiplication terms.
pub fn jordan_associator(x: TermTree, y: TermTree, z: TermTree) -> Vec<Term> {
    vec![
        Term::unit(1, TermTree::mul(TermTree::mul(x.clone(), y.clone()), z.clone())),
        Term::unit(-1, TermTree::mul(x, TermTree::mul(y, z))),
    ]
}
