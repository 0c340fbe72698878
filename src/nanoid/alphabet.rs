//! Alphabet validation and classification.
//!
//! An alphabet is an ordered set of 2 to 256 unique Unicode scalar values.
//! Alphabets made only of ASCII characters are stored as bytes, which lets
//! the generator append symbols without UTF-8 encoding work; every other
//! alphabet is stored as code points.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Smallest accepted alphabet.
pub const MIN_ALPHABET_LEN: usize = 2;

/// Largest accepted alphabet; one random byte can index it.
pub const MAX_ALPHABET_LEN: usize = 256;

/// URL-safe default alphabet (64 symbols).
pub const DEFAULT_ALPHABET: &str =
    "_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Symbol table in the representation used by the sampler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Symbols {
    Ascii(Box<[u8]>),
    Unicode(Box<[char]>),
}

/// A validated, immutable alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    text: Box<str>,
    symbols: Symbols,
}

impl Alphabet {
    /// Validates `text` as an alphabet.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyAlphabet`] for an empty string
    /// - [`Error::AlphabetTooLong`] for more than 256 characters
    /// - [`Error::DuplicateCharacters`] if any character repeats
    /// - [`Error::AlphabetTooShort`] for a single character
    pub fn new(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Err(Error::EmptyAlphabet);
        }

        let chars: Vec<char> = text.chars().collect();

        if chars.len() > MAX_ALPHABET_LEN {
            return Err(Error::AlphabetTooLong {
                max: MAX_ALPHABET_LEN,
            });
        }

        let mut seen = HashSet::with_capacity(chars.len());
        if !chars.iter().all(|c| seen.insert(*c)) {
            return Err(Error::DuplicateCharacters);
        }

        if chars.len() < MIN_ALPHABET_LEN {
            return Err(Error::AlphabetTooShort {
                min: MIN_ALPHABET_LEN,
            });
        }

        let symbols = if text.is_ascii() {
            Symbols::Ascii(text.as_bytes().into())
        } else {
            Symbols::Unicode(chars.into_boxed_slice())
        };

        Ok(Self {
            text: text.into(),
            symbols,
        })
    }

    /// Validates raw bytes as a UTF-8 alphabet.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUtf8`] if the bytes are not UTF-8, otherwise the
    /// same errors as [`Alphabet::new`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
        Self::new(text)
    }

    /// The default URL-safe alphabet.
    pub fn url_safe() -> Self {
        Self {
            text: DEFAULT_ALPHABET.into(),
            symbols: Symbols::Ascii(DEFAULT_ALPHABET.as_bytes().into()),
        }
    }

    /// Number of symbols.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match &self.symbols {
            Symbols::Ascii(table) => table.len(),
            Symbols::Unicode(table) => table.len(),
        }
    }

    /// Whether every symbol is ASCII.
    pub fn is_ascii(&self) -> bool {
        matches!(self.symbols, Symbols::Ascii(_))
    }

    /// Longest UTF-8 encoding of any symbol, in bytes.
    pub fn max_symbol_len(&self) -> usize {
        match &self.symbols {
            Symbols::Ascii(_) => 1,
            Symbols::Unicode(table) => table.iter().map(|c| c.len_utf8()).max().unwrap_or(1),
        }
    }

    /// Whether `c` belongs to the alphabet.
    pub fn contains(&self, c: char) -> bool {
        match &self.symbols {
            Symbols::Ascii(table) => c.is_ascii() && table.contains(&(c as u8)),
            Symbols::Unicode(table) => table.contains(&c),
        }
    }

    /// The alphabet as text, in its original order.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn symbols(&self) -> &Symbols {
        &self.symbols
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::url_safe()
    }
}

impl FromStr for Alphabet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
