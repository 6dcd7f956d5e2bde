//! Grammar for identity strings, e.g. `xy=yx`, `[x,y]`, `<x,y,z>=0`.
//!
//! Grounded on `original_source/Po_parse_poly.h` (a recursive-descent
//! polynomial parser) and on `algebra::GeneratedAlgebra::string_to_generator`
//! in the Steenrod-algebra tooling this crate is styled after, which parses
//! a small domain grammar with `nom` rather than hand-rolled char scanning.
//! Commutator `[x,y]` and Jordan associator `<x,y,z>` notation are expanded
//! to plain signed multiplication terms right here, at parse time, so every
//! later stage only ever sees [`crate::poly::TermTree::Mul`] trees.

use crate::poly::{commutator, jordan_associator, Identity, Term, TermTree, Var};
use crate::types::Type;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, map_res, opt},
    multi::many0,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use rustc_hash::FxHashMap;

/// An optional integer literal magnitude immediately preceding a monomial,
/// e.g. the `2` in `2xy`. Absent means a unit coefficient.
fn coef_magnitude(input: &str) -> IResult<&str, i32> {
    map_res(opt(digit1), |d: Option<&str>| match d {
        Some(s) => s.parse::<i32>().map_err(|e| e.to_string()),
        None => Ok(1),
    })(input)
}

/// Parse a generator-declaration word like `3a2b2c`, mirroring
/// `driver.cpp`'s `Parse_generator_word`/`CreateTargetType`: a run of
/// `<count><letter>` pairs (count optional, default 1) giving, in order, the
/// degree bound for each generator slot — e.g. `3a2b2c` bounds slot `a` to
/// degree 3, `b` to 2, `c` to 2, for a total target degree of 7. Generators
/// must be declared consecutively starting at `a` with no gaps, since every
/// other part of this crate assumes generator slot `i` is letter `a + i`
/// (`parser::parse_alg_expression`'s fixed `a..z` interning, in particular).
pub fn parse_generator_word(word: &str) -> anyhow::Result<Type> {
    let mut bounds = Vec::new();
    let mut input = word.trim();
    let mut expected = b'a';
    while !input.is_empty() {
        let (rest, count) =
            coef_magnitude(input).map_err(|_| anyhow::anyhow!("invalid generator word `{word}`"))?;
        let (rest, letter) = satisfy::<_, _, nom::error::Error<&str>>(|c: char| c.is_ascii_lowercase())(rest)
            .map_err(|_| anyhow::anyhow!("invalid generator word `{word}`: expected a lowercase letter"))?;
        if letter != expected as char {
            anyhow::bail!(
                "generators must be declared consecutively from `a`; expected `{}` but found `{letter}`",
                expected as char
            );
        }
        if count <= 0 {
            anyhow::bail!("generator `{letter}` must have a positive degree bound");
        }
        bounds.push(count as u32);
        expected += 1;
        input = rest.trim_start();
    }
    if bounds.is_empty() {
        anyhow::bail!("generator word must declare at least one generator");
    }
    Ok(Type(bounds))
}

struct VarEnv {
    ids: FxHashMap<char, u32>,
}

impl VarEnv {
    fn new() -> Self {
        Self { ids: FxHashMap::default() }
    }

    fn intern(&mut self, c: char) -> Var {
        let next = self.ids.len() as u32;
        let id = *self.ids.entry(c).or_insert(next);
        Var(id)
    }
}

fn ws<'a, O>(inner: impl FnMut(&'a str) -> IResult<&'a str, O>) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn variable<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, TermTree> {
    move |input: &str| {
        let (rest, c) = satisfy(|c: char| c.is_ascii_lowercase())(input)?;
        Ok((rest, TermTree::leaf(env.borrow_mut().intern(c))))
    }
}

/// A single atom: one variable, or a fully parenthesized subproduct.
fn atom<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, TermTree> {
    move |input: &str| {
        alt((
            variable(env),
            delimited(ws(char('(')), |i| mul_expr(env)(i), ws(char(')'))),
        ))(input)
    }
}

/// A monomial: one or more atoms concatenated without an operator (`xy`,
/// `x(yz)`, `(xy)z`, `xyz`), read as their nonassociative product. Runs of
/// three or more unparenthesized atoms (`xyz`) fold left-associatively,
/// i.e. `xyz` reads as `(xy)z` — parentheses are how an input overrides
/// that default grouping.
fn mul_expr<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, TermTree> {
    move |input: &str| {
        let (mut input, mut acc) = atom(env)(input)?;
        while let (rest, Some(next)) = opt(|i| atom(env)(i))(input)? {
            acc = TermTree::mul(acc, next);
            input = rest;
        }
        Ok((input, acc))
    }
}

fn signed_mul_expr<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, Term> {
    move |input: &str| {
        let (input, sign) = opt(ws(char('-')))(input)?;
        let (input, magnitude) = coef_magnitude(input)?;
        let (input, tree) = mul_expr(env)(input)?;
        let coef = if sign.is_some() { -magnitude } else { magnitude };
        let term = Term::new(coef, tree).map_err(|e| nom_failure(input, e))?;
        Ok((input, term))
    }
}

fn poly<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<Term>> {
    move |input: &str| {
        let (input, first) = signed_mul_expr(env)(input)?;
        let (input, rest) = many0(tuple((
            ws(alt((char('+'), char('-')))),
            coef_magnitude,
            |i| mul_expr(env)(i),
        )))(input)?;
        let mut terms = vec![first];
        for (op, magnitude, tree) in rest {
            let sign = if op == '+' { 1 } else { -1 };
            let term = Term::new(sign * magnitude, tree).map_err(|e| nom_failure(input, e))?;
            terms.push(term);
        }
        Ok((input, terms))
    }
}

/// Lift a [`Term::new`] validation failure (coefficient zero or out of
/// range) into a hard parse failure so it doesn't get silently backtracked
/// past by an outer `alt`.
fn nom_failure(input: &str, e: anyhow::Error) -> nom::Err<nom::error::Error<&str>> {
    let _ = e;
    nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

fn commutator_expr<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<Term>> {
    move |input: &str| {
        map(
            delimited(
                ws(char('[')),
                tuple((|i| mul_expr(env)(i), ws(char(',')), |i| mul_expr(env)(i))),
                ws(char(']')),
            ),
            |(x, _, y)| commutator(x, y),
        )(input)
    }
}

fn jordan_expr<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<Term>> {
    move |input: &str| {
        map(
            delimited(
                ws(char('<')),
                tuple((
                    |i| mul_expr(env)(i),
                    ws(char(',')),
                    |i| mul_expr(env)(i),
                    ws(char(',')),
                    |i| mul_expr(env)(i),
                )),
                ws(char('>')),
            ),
            |(x, _, y, _, z)| jordan_associator(x, y, z),
        )(input)
    }
}

fn side<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<Term>> {
    move |input: &str| alt((commutator_expr(env), jordan_expr(env), poly(env)))(input)
}

fn rhs<'a>(env: &'a std::cell::RefCell<VarEnv>) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<Term>> {
    move |input: &str| alt((map(ws(char('0')), |_| Vec::new()), |i| side(env)(i)))(input)
}

fn negate(terms: Vec<Term>) -> Vec<Term> {
    terms.into_iter().map(|t| t.negated()).collect()
}

/// Parse an identity body (without its name) such as `xy=yx`, `[x,y]`, or
/// `(xy)z-x(yz)=0`, returning the fully expanded, signed term list.
pub fn parse_identity(name: &str, input: &str) -> anyhow::Result<Identity> {
    let env = std::cell::RefCell::new(VarEnv::new());
    let parsed = tuple((
        ws(|i| side(&env)(i)),
        opt(preceded(ws(tag("=")), ws(|i| rhs(&env)(i)))),
    ))(input);
    match parsed {
        Ok((rest, (lhs, rhs))) if rest.trim().is_empty() => {
            let mut terms = lhs;
            if let Some(rhs) = rhs {
                terms.extend(negate(rhs));
            }
            Identity::new(name, terms)
        }
        Ok((rest, _)) => anyhow::bail!("unexpected trailing input in identity `{name}`: `{rest}`"),
        Err(e) => anyhow::bail!("failed to parse identity `{name}`: {e}"),
    }
}

/// Parse an algebra-element expression such as `ab+ba` or `(ab)c`, where
/// each letter names a declared generator directly (`a` is slot 0, `b` slot
/// 1, ...) rather than an identity-local bound variable. Used by the
/// `expand` and `is_identity` commands, which evaluate against the algebra
/// actually built so far.
pub fn parse_alg_expression(input: &str) -> anyhow::Result<Vec<Term>> {
    let env = std::cell::RefCell::new(VarEnv::new());
    // Pre-intern `a`..`z` in order so each letter's Var id equals its
    // generator slot regardless of which letters actually occur in `input`.
    for c in 'a'..='z' {
        env.borrow_mut().intern(c);
    }
    match poly(&env)(input) {
        Ok((rest, terms)) if rest.trim().is_empty() => Ok(terms),
        Ok((rest, _)) => anyhow::bail!("unexpected trailing input in expression: `{rest}`"),
        Err(e) => anyhow::bail!("failed to parse expression: {e}"),
    }
}
