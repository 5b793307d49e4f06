//! Dense coefficient polynomial core (spec.md §3 "Polynomial", §4.6-4.7).
//!
//! Grounded in the teacher's exact-arithmetic discipline (`noyau/number.rs`'s
//! integer-square-root helpers, `noyau/expr.rs`'s rational power-by-squaring)
//! but the dense-coefficient-vector shape itself has no teacher counterpart —
//! the teacher never extracts or solves polynomials — so this module is
//! built directly from the spec's data model, using the crate's own
//! `Number` tower for every coefficient instead of a dedicated integer type.
//!
//! Coefficients are stored ascending by degree (`coeffs[0]` is the constant
//! term) and always trimmed: no trailing zero coefficient survives unless
//! the polynomial is exactly `[0]` (degree −1 by convention, spec.md §3).

pub mod extract;
pub mod factor;
pub mod solve;

use crate::number::Number;

#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    /// Ascending degree order; always trimmed.
    pub coeffs: Vec<Number>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Polynomial { coeffs: vec![Number::zero()] }
    }

    pub fn constant(n: Number) -> Self {
        let mut p = Polynomial { coeffs: vec![n] };
        p.trim();
        p
    }

    /// `x` as a degree-1 polynomial.
    pub fn variable() -> Self {
        Polynomial { coeffs: vec![Number::zero(), Number::one()] }
    }

    pub(crate) fn trim(&mut self) {
        while self.coeffs.len() > 1 && self.coeffs.last().unwrap().is_zero() {
            self.coeffs.pop();
        }
        if self.coeffs.is_empty() {
            self.coeffs.push(Number::zero());
        }
    }

    /// −1 for the zero polynomial, by the spec's convention.
    pub fn degree(&self) -> i64 {
        if self.coeffs.len() == 1 && self.coeffs[0].is_zero() {
            -1
        } else {
            (self.coeffs.len() - 1) as i64
        }
    }

    pub fn is_zero(&self) -> bool {
        self.degree() < 0
    }

    pub fn leading(&self) -> &Number {
        self.coeffs.last().unwrap()
    }

    pub fn constant_term(&self) -> &Number {
        &self.coeffs[0]
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let n = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let a = self.coeffs.get(i).cloned().unwrap_or(Number::zero());
            let b = other.coeffs.get(i).cloned().unwrap_or(Number::zero());
            out.push(a.add(&b));
        }
        let mut p = Polynomial { coeffs: out };
        p.trim();
        p
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.negate())
    }

    pub fn negate(&self) -> Polynomial {
        Polynomial {
            coeffs: self.coeffs.iter().map(|c| c.neg()).collect(),
        }
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }
        let mut out = vec![Number::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] = out[i + j].add(&a.multiply(b));
            }
        }
        let mut p = Polynomial { coeffs: out };
        p.trim();
        p
    }

    pub fn scale(&self, factor: &Number) -> Polynomial {
        let mut p = Polynomial {
            coeffs: self.coeffs.iter().map(|c| c.multiply(factor)).collect(),
        };
        p.trim();
        p
    }

    /// Horner evaluation at `x`.
    pub fn eval(&self, x: &Number) -> Number {
        let mut acc = Number::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc.multiply(x).add(c);
        }
        acc
    }

    /// Synthetic division by `(x - r)`: returns `(quotient, remainder)` such
    /// that `self == (x - r) * quotient + remainder` (spec.md §8, "Division
    /// identity").
    pub fn synthetic_divide(&self, r: &Number) -> (Polynomial, Number) {
        if self.coeffs.len() <= 1 {
            return (Polynomial::zero(), self.coeffs[0].clone());
        }
        let n = self.coeffs.len();
        let mut q = vec![Number::zero(); n - 1];
        let mut carry = self.coeffs[n - 1].clone();
        q[n - 2] = carry.clone();
        for i in (0..n - 1).rev() {
            let term = carry.multiply(r);
            carry = self.coeffs[i].add(&term);
            if i > 0 {
                q[i - 1] = carry.clone();
            }
        }
        let mut quotient = Polynomial { coeffs: q };
        quotient.trim();
        (quotient, carry)
    }

    pub fn all_exact(&self) -> bool {
        self.coeffs.iter().all(Number::is_exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_drops_trailing_zeros() {
        let p = Polynomial {
            coeffs: vec![Number::Int(1), Number::Int(0), Number::Int(0)],
        };
        let mut p = p;
        p.trim();
        assert_eq!(p.coeffs, vec![Number::Int(1)]);
        assert_eq!(p.degree(), 0);
    }

    #[test]
    fn zero_polynomial_has_degree_minus_one() {
        assert_eq!(Polynomial::zero().degree(), -1);
    }

    #[test]
    fn synthetic_division_matches_division_identity() {
        // x^2 - 5x + 6 = (x - 2)(x - 3)
        let p = Polynomial {
            coeffs: vec![Number::Int(6), Number::Int(-5), Number::Int(1)],
        };
        let (q, r) = p.synthetic_divide(&Number::Int(2));
        assert_eq!(r, Number::Int(0));
        assert_eq!(q.coeffs, vec![Number::Int(-3), Number::Int(1)]);

        // rebuild: (x - 2) * q + r should equal p
        let factor = Polynomial {
            coeffs: vec![Number::Int(-2), Number::Int(1)],
        };
        let rebuilt = factor.mul(&q).add(&Polynomial::constant(r));
        assert_eq!(rebuilt, p);
    }

    #[test]
    fn eval_matches_direct_computation() {
        // 2x^2 + 3x + 1 at x=2 -> 8+6+1=15
        let p = Polynomial {
            coeffs: vec![Number::Int(1), Number::Int(3), Number::Int(2)],
        };
        assert_eq!(p.eval(&Number::Int(2)), Number::Int(15));
    }

    #[test]
    fn mul_distributes_degrees() {
        // (x - 1)(x + 1) = x^2 - 1
        let a = Polynomial { coeffs: vec![Number::Int(-1), Number::Int(1)] };
        let b = Polynomial { coeffs: vec![Number::Int(1), Number::Int(1)] };
        let p = a.mul(&b);
        assert_eq!(p.coeffs, vec![Number::Int(-1), Number::Int(0), Number::Int(1)]);
    }
}
