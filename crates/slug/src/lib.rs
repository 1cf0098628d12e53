//! Reversible short identifiers.
//!
//! A short ID is a record's numeric ID written as a base-K numeral using the
//! characters of an [`Alphabet`] as digits. It hides sequential IDs from
//! casual inspection but is **not** a security boundary: anyone who knows
//! the alphabet can decode it.

mod alphabet;
pub mod error;

pub use crate::alphabet::{Alphabet, DEFAULT_ALPHABET};
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::sync::LazyLock;
use tracing::instrument;

static DEFAULT: LazyLock<Shortener> = LazyLock::new(Shortener::default);

/// Converts numeric IDs to short strings and back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortener {
    alphabet: Alphabet,
}

impl Shortener {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Encode an ID. Zero encodes to the first digit of the alphabet.
    pub fn encode(&self, id: u64) -> String {
        let base = self.alphabet.base();
        let mut id = id;
        let mut digits = Vec::new();
        loop {
            digits.push(self.alphabet.digit(id % base));
            id /= base;
            if id == 0 {
                break;
            }
        }
        digits.iter().rev().collect()
    }

    /// Decode a short ID back into the numeric ID it was encoded from.
    ///
    /// Leading "zero" digits are accepted and ignored, so several strings
    /// can decode to the same ID; only [`encode`](Self::encode) output is
    /// canonical.
    #[instrument(level = "trace", skip(self))]
    pub fn decode(&self, short: &str) -> Result<u64> {
        if short.is_empty() {
            exn::bail!(ErrorKind::Empty);
        }
        let base = self.alphabet.base();
        short.chars().try_fold(0u64, |value, c| {
            let digit = self.alphabet.position(c).ok_or_raise(|| ErrorKind::InvalidCharacter(c))?;
            value
                .checked_mul(base)
                .and_then(|v| v.checked_add(digit))
                .ok_or_raise(|| ErrorKind::Overflow)
        })
    }
}

impl From<Alphabet> for Shortener {
    fn from(alphabet: Alphabet) -> Self {
        Self::new(alphabet)
    }
}

/// Encode with the [default alphabet](DEFAULT_ALPHABET).
pub fn encode(id: u64) -> String {
    DEFAULT.encode(id)
}

/// Decode with the [default alphabet](DEFAULT_ALPHABET).
pub fn decode(short: &str) -> Result<u64> {
    DEFAULT.decode(short)
}
