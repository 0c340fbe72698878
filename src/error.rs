//! Crate-wide error type.
//!
//! Errors fall into three groups:
//!
//! - configuration errors, returned synchronously by constructors and
//!   builders
//! - generation errors, returned per call
//! - instantiation errors, raised when a DRBG cannot be seeded at all
//!
//! Key rotation failures never appear here: they are retried internally
//! and, if they persist, the affected instance keeps its previous key.

use std::io;

use thiserror::Error;

/// Errors produced by identifier generation and the underlying DRBG.
#[derive(Debug, Error)]
pub enum Error {
    /// The alphabet is empty.
    #[error("alphabet must not be empty")]
    EmptyAlphabet,

    /// The alphabet bytes are not valid UTF-8.
    #[error("alphabet is not valid UTF-8")]
    InvalidUtf8,

    /// The alphabet contains the same character more than once.
    #[error("alphabet contains duplicate characters")]
    DuplicateCharacters,

    /// The alphabet has fewer than two characters.
    #[error("alphabet must contain at least {min} characters")]
    AlphabetTooShort {
        /// Minimum accepted alphabet size.
        min: usize,
    },

    /// The alphabet has more than 256 characters.
    #[error("alphabet must contain at most {max} characters")]
    AlphabetTooLong {
        /// Maximum accepted alphabet size.
        max: usize,
    },

    /// The requested identifier length is zero.
    #[error("identifier length must be greater than zero")]
    InvalidLength,

    /// The rejection sampler ran out of attempts before filling the
    /// identifier.
    ///
    /// This only happens when the random source is broken or degenerate.
    #[error("exceeded maximum attempts ({attempts}) while generating identifier")]
    ExceededMaxAttempts {
        /// Number of draws consumed before giving up.
        attempts: usize,
    },

    /// AES key size is not 16, 24 or 32 bytes.
    #[error("invalid key size {0}: expected 16, 24 or 32 bytes")]
    InvalidKeySize(usize),

    /// A DRBG configuration value is out of range.
    #[error("invalid DRBG configuration: {0}")]
    InvalidConfig(&'static str),

    /// The operating system could not provide entropy.
    #[error("operating system entropy unavailable: {0}")]
    Entropy(#[from] getrandom::Error),

    /// The block cipher rejected the derived key.
    #[error("block cipher construction failed")]
    Cipher,

    /// A user-supplied random source failed.
    #[error("random source failed: {0}")]
    Source(#[from] io::Error),

    /// A DRBG instance could not be seeded after every allowed attempt.
    ///
    /// A secure random source is a hard prerequisite for this crate, so
    /// callers should treat this as a process-level fault rather than a
    /// condition to retry around.
    #[error("DRBG instantiation failed after {attempts} attempt(s): {source}")]
    Instantiation {
        /// Number of seeding attempts made.
        attempts: u32,
        /// Failure of the last attempt.
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` for errors that indicate the process has no usable
    /// source of secure randomness.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Instantiation { .. })
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Source(inner) => inner,
            other => io::Error::other(other),
        }
    }
}
