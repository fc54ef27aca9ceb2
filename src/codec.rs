//! Request Codec
//!
//! Converts the raw request parameter into an [`Input`] and defines the error
//! taxonomy for inputs that fall outside the factorization domain.
//!
//! # Parsing Rules
//!
//! | Raw parameter | Strict ([`parse_input`]) | Lenient ([`parse_input_or_identity`]) |
//! |---------------|--------------------------|---------------------------------------|
//! | absent / `""` | `Err(Missing)`           | `1`                                   |
//! | `"12"`, `"+12"` | `Ok(12)`               | `12`                                  |
//! | `"abc"`, `" 12"`, `"1_000"` | `Err(Malformed)` | `1`                          |
//! | `"0"`, `"-7"` | `Err(OutOfDomain)`       | `1`                                   |
//! | more bits than the limit | `Err(TooLarge)` | `1`                                 |
//!
//! Whitespace is never trimmed: the request layer hands over the parameter
//! exactly as received, and anything that is not a signed decimal integer is
//! malformed.
//!
//! The lenient path is what every [`Factorizer`](crate::concurrent::Factorizer)
//! entry point uses, so no error ever crosses the factorizer boundary. The
//! response side of the codec is the `Display` impl of
//! [`Factors`](crate::factor::Factors).

use crate::factor::Input;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use thiserror::Error;
use tracing::debug;

/// Reasons a raw request parameter cannot be turned into an [`Input`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// No parameter, or an empty one.
    #[error("no input parameter was supplied")]
    Missing,

    /// The parameter is not a signed decimal integer.
    #[error("input {0:?} is not a decimal integer")]
    Malformed(String),

    /// The parameter is an integer but not a positive one.
    #[error("input {0} is not a positive integer")]
    OutOfDomain(String),

    /// The parameter exceeds the configured bit limit.
    #[error("input has {bits} bits, the configured limit is {limit}")]
    TooLarge {
        /// Bit length of the rejected value
        bits: u64,
        /// Configured maximum
        limit: u64,
    },
}

/// Parses a raw request parameter, reporting why it was rejected.
///
/// `max_bits` bounds the bit length of accepted values; pass `u64::MAX` for
/// no limit.
pub fn parse_input(raw: Option<&str>, max_bits: u64) -> Result<Input, InputError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(InputError::Missing),
    };

    let (negative, digits) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    // num-bigint tolerates `_` separators, requests do not.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::Malformed(raw.to_string()));
    }

    let value = BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| InputError::Malformed(raw.to_string()))?;

    if value.is_zero() || negative {
        return Err(InputError::OutOfDomain(raw.to_string()));
    }

    let bits = value.bits();
    if bits > max_bits {
        return Err(InputError::TooLarge {
            bits,
            limit: max_bits,
        });
    }

    Ok(value)
}

/// Parses a raw request parameter, substituting the multiplicative identity
/// for anything [`parse_input`] would reject.
pub fn parse_input_or_identity(raw: Option<&str>, max_bits: u64) -> Input {
    match parse_input(raw, max_bits) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "normalizing rejected input to 1");
            BigUint::one()
        }
    }
}
