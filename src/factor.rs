//! Deterministic Function Adapter
//!
//! The expensive function every strategy memoizes: prime factorization by
//! trial division over arbitrary-precision integers.
//!
//! # Contract
//!
//! [`Evaluator::evaluate`] must be pure. The same input yields the same
//! [`Factors`] for every caller, every time, with no observable side effects.
//! The caches rely on this: a cached output is only meaningful because
//! recomputing it would produce the same value.
//!
//! # Algorithm
//!
//! ```text
//! remaining = n, divisor = 2
//! while divisor² <= remaining:
//!     while divisor | remaining: emit divisor, remaining /= divisor
//!     divisor += 1
//! if remaining > 1: emit remaining
//! ```
//!
//! Factors are emitted with multiplicity in non-decreasing order. `1` (and
//! the out-of-domain `0`) produce the empty sequence. The cost grows with the
//! square root of the largest prime factor, so large semiprimes are the
//! expensive requests in a workload.

use core::fmt;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Input domain of the factorizer: a positive arbitrary-precision integer.
pub type Input = BigUint;

/// Output of the factorizer: prime factors with multiplicity, ascending.
///
/// `Display` renders the response wire format:
///
/// ```
/// use memo_factor::factor::{factorize, Factors};
/// use num_bigint::BigUint;
///
/// assert_eq!(factorize(&BigUint::from(12u32)).to_string(), "Factors: 2 2 3 \n");
/// assert_eq!(Factors::default().to_string(), "Factors: \n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Factors(Vec<BigUint>);

impl Factors {
    /// Returns the factors as a slice.
    pub fn as_slice(&self) -> &[BigUint] {
        &self.0
    }

    /// Returns the number of factors, counting multiplicity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the factorization of `1`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the factors in ascending order.
    pub fn iter(&self) -> core::slice::Iter<'_, BigUint> {
        self.0.iter()
    }

    /// Multiplies the factors back together. The empty product is `1`.
    pub fn product(&self) -> BigUint {
        self.0.iter().fold(BigUint::one(), |acc, f| acc * f)
    }

    /// Consumes the sequence, returning the underlying vector.
    pub fn into_inner(self) -> Vec<BigUint> {
        self.0
    }
}

impl From<Vec<BigUint>> for Factors {
    fn from(factors: Vec<BigUint>) -> Self {
        Self(factors)
    }
}

impl<'a> IntoIterator for &'a Factors {
    type Item = &'a BigUint;
    type IntoIter = core::slice::Iter<'a, BigUint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Factors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factors: ")?;
        for factor in &self.0 {
            write!(f, "{factor} ")?;
        }
        f.write_str("\n")
    }
}

/// A pure function from [`Input`] to [`Factors`].
///
/// Implemented by [`TrialDivision`] and by any `Fn(&Input) -> Factors`
/// closure, so tests can substitute instrumented or deliberately slow
/// evaluators.
pub trait Evaluator: Send + Sync {
    /// Computes the output for `input`.
    fn evaluate(&self, input: &Input) -> Factors;
}

impl<F> Evaluator for F
where
    F: Fn(&Input) -> Factors + Send + Sync,
{
    fn evaluate(&self, input: &Input) -> Factors {
        self(input)
    }
}

/// Trial-division factorization, the default evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialDivision;

impl Evaluator for TrialDivision {
    #[inline]
    fn evaluate(&self, input: &Input) -> Factors {
        factorize(input)
    }
}

/// Factors `n` by trial division.
pub fn factorize(n: &BigUint) -> Factors {
    let mut factors = Vec::new();
    if n.is_zero() {
        return Factors(factors);
    }

    let mut remaining = n.clone();
    let mut divisor = BigUint::from(2u32);
    while &divisor * &divisor <= remaining {
        while (&remaining % &divisor).is_zero() {
            remaining /= &divisor;
            factors.push(divisor.clone());
        }
        divisor += 1u32;
    }
    if remaining > BigUint::one() {
        factors.push(remaining);
    }

    Factors(factors)
}
