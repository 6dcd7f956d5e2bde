//! Scalar arithmetic in GF(p) and the precomputed inverse table.
//!
//! Grounded on `original_source/Scalar_arithmetic.cpp`: the inverse table is
//! built once per field by trial search, exactly as `S_init` does (`for i in
//! 1..p, for j in 1..p, if i*j % p == 1 { Inverse_table[i] = j }`).

use crate::prime::ValidPrime;

pub type Scalar = u32;

pub fn zero() -> Scalar {
    0
}

pub fn one() -> Scalar {
    1
}

pub fn minus_one(p: ValidPrime) -> Scalar {
    p.value() - 1
}

pub fn add(x: Scalar, y: Scalar, p: ValidPrime) -> Scalar {
    (x + y) % p.value()
}

pub fn neg(x: Scalar, p: ValidPrime) -> Scalar {
    if x == 0 {
        0
    } else {
        p.value() - x
    }
}

pub fn sub(x: Scalar, y: Scalar, p: ValidPrime) -> Scalar {
    add(x, neg(y, p), p)
}

pub fn mul(x: Scalar, y: Scalar, p: ValidPrime) -> Scalar {
    (x as u64 * y as u64 % p.value() as u64) as Scalar
}

/// Reduce a signed integer coefficient (as accepted by the identity parser,
/// `-65535 < c < 65535` per the REPL grammar) into GF(p).
pub fn from_i32(x: i32, p: ValidPrime) -> Scalar {
    let m = p.value() as i32;
    (((x % m) + m) % m) as Scalar
}

/// Table of multiplicative inverses for a single field, indexed `1..p`.
///
/// Index 0 is unused (division by zero is a caller error, never looked up
/// here); `inv_table[0]` is left as `0` as a sentinel.
#[derive(Debug, Clone)]
pub struct InverseTable {
    p: ValidPrime,
    table: Vec<Scalar>,
}

impl InverseTable {
    pub fn new(p: ValidPrime) -> Self {
        let n = p.value() as usize;
        let mut table = vec![0; n];
        for i in 1..n as Scalar {
            for j in 1..n as Scalar {
                if mul(i, j, p) == 1 {
                    table[i as usize] = j;
                    break;
                }
            }
        }
        Self { p, table }
    }

    pub fn prime(&self) -> ValidPrime {
        self.p
    }

    pub fn inv(&self, x: Scalar) -> Scalar {
        assert!(x != 0, "division by zero in GF({})", self.p);
        self.table[x as usize]
    }

    pub fn div(&self, x: Scalar, y: Scalar) -> Scalar {
        mul(x, self.inv(y), self.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(5)]
    #[case(7)]
    #[case(251)]
    fn inverse_table_round_trips(#[case] p: u32) {
        let p = ValidPrime::new(p).unwrap();
        let inv = InverseTable::new(p);
        for x in 1..p.value() {
            assert_eq!(mul(x, inv.inv(x), p), 1, "x={x}");
        }
    }

    #[test]
    fn from_i32_reduces_negative_and_large_coefficients() {
        let p = ValidPrime::new(5).unwrap();
        assert_eq!(from_i32(-1, p), 4);
        assert_eq!(from_i32(7, p), 2);
        assert_eq!(from_i32(-7, p), 3);
        assert_eq!(from_i32(0, p), 0);
    }

    #[test]
    fn basic_ops_mod_5() {
        let p = ValidPrime::new(5).unwrap();
        assert_eq!(add(3, 4, p), 2);
        assert_eq!(sub(1, 4, p), 2);
        assert_eq!(neg(1, p), 4);
        assert_eq!(mul(3, 4, p), 2);
        assert_eq!(minus_one(p), 4);
    }
}
