use crate::error::{Error, ErrorKind, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Default digit set (64 characters: letters, digits, `-` and `_`).
///
/// Changing it changes every short ID already handed out.
pub const DEFAULT_ALPHABET: &str = "kJrMZwBbP-1AjW6HuEaxXeTVQU0dy8p29N7g4mYqDlGR_c5nCiIOtozhSsfKL3Fv";

/// An ordered set of distinct characters used as the digits of a base-K
/// numeral system, where K is the alphabet length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    digits: Vec<char>,
    positions: HashMap<char, u64>,
}

impl Alphabet {
    pub fn new(chars: impl AsRef<str>) -> Result<Self> {
        let digits: Vec<char> = chars.as_ref().chars().collect();
        if digits.len() < 2 {
            exn::bail!(ErrorKind::AlphabetTooShort);
        }
        let mut positions = HashMap::with_capacity(digits.len());
        for (index, c) in digits.iter().enumerate() {
            if positions.insert(*c, index as u64).is_some() {
                exn::bail!(ErrorKind::DuplicateCharacter(*c));
            }
        }
        Ok(Self { digits, positions })
    }

    /// Numeral base (K).
    pub fn base(&self) -> u64 {
        self.digits.len() as u64
    }

    pub(crate) fn digit(&self, value: u64) -> char {
        // `value` is always a remainder modulo `base()`.
        self.digits[value as usize]
    }

    pub(crate) fn position(&self, c: char) -> Option<u64> {
        self.positions.get(&c).copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        // Infallible: the default alphabet is validated by tests.
        Self::new(DEFAULT_ALPHABET).expect("default alphabet is valid")
    }
}

impl FromStr for Alphabet {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.digits.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
