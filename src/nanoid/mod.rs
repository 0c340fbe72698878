//! Random identifier generation
//!
//! This module turns the byte stream of a [`RandomSource`] into short,
//! collision-resistant identifiers over a user-defined alphabet.
//!
//! - [`alphabet`]
//!   Validation (encoding, size bounds, duplicates) and classification of
//!   the symbol set as ASCII or general Unicode.
//!
//! - [`config`]
//!   [`RuntimeConfig`]: mask, bit width and buffer sizes derived once per
//!   generator.
//!
//! - `buffers`
//!   Bounded pools of scratch and output buffers.
//!
//! - [`generator`]
//!   The rejection sampler and the [`Generator`] / [`GeneratorBuilder`]
//!   surface.
//!
//! For the common case, [`new`] and [`new_with_length`] use a shared
//! generator over [`DEFAULT_ALPHABET`] backed by the process-wide
//! [`Reader`].
//!
//! [`RandomSource`]: crate::rng::RandomSource
//! [`Reader`]: crate::rng::Reader

use std::sync::OnceLock;

use crate::Error;

pub mod alphabet;
pub(crate) mod buffers;
pub mod config;
pub mod generator;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET, MAX_ALPHABET_LEN, MIN_ALPHABET_LEN};
pub use config::{MAX_ATTEMPTS_MULTIPLIER, RuntimeConfig};
pub use generator::{DEFAULT_LENGTH, Generator, GeneratorBuilder, MAX_LENGTH};

static DEFAULT_GENERATOR: OnceLock<Generator> = OnceLock::new();

fn default_generator() -> &'static Generator {
    DEFAULT_GENERATOR.get_or_init(Generator::default)
}

/// Generates an identifier of [`DEFAULT_LENGTH`] symbols over the default
/// alphabet.
pub fn new() -> Result<String, Error> {
    default_generator().new_default_id()
}

/// Generates an identifier of `length` symbols over the default alphabet.
pub fn new_with_length(length: usize) -> Result<String, Error> {
    default_generator().new_id(length)
}
