//! Identifier assembly by rejection sampling.
//!
//! To produce an identifier of length `L` the generator repeatedly draws
//! `bytes_needed`-byte chunks from its random source, reads each chunk as
//! a little-endian unsigned integer and applies the alphabet mask:
//!
//! - power-of-two alphabets accept every masked value
//! - other alphabets accept a value only if it is below the alphabet size
//!
//! Rejected draws are discarded, which removes the modulo bias a plain
//! `value % len` would introduce. At most `L * 10` draws are consumed;
//! past that the call fails with [`Error::ExceededMaxAttempts`] instead of
//! looping on a broken source.
//!
//! The ASCII and Unicode symbol tables are separate monomorphized loops;
//! the representation is fixed when the alphabet is validated.

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::nanoid::alphabet::{Alphabet, Symbols};
use crate::nanoid::buffers::BufferPool;
use crate::nanoid::config::RuntimeConfig;
use crate::rng::{self, RandomSource};

/// Default identifier length.
pub const DEFAULT_LENGTH: usize = 21;

/// Longest identifier a generator will produce, in symbols.
pub const MAX_LENGTH: usize = 1 << 24;

/// One entry of a symbol table.
trait Symbol: Copy {
    fn push_to(self, out: &mut String);
}

impl Symbol for u8 {
    #[inline]
    fn push_to(self, out: &mut String) {
        out.push(char::from(self));
    }
}

impl Symbol for char {
    #[inline]
    fn push_to(self, out: &mut String) {
        out.push(self);
    }
}

/// Produces random identifiers over a fixed alphabet.
///
/// A generator is immutable after construction and can be shared freely
/// between threads.
pub struct Generator {
    alphabet: Alphabet,
    config: RuntimeConfig,
    source: Arc<dyn RandomSource>,
    scratch: BufferPool<Vec<u8>>,
    output: BufferPool<String>,
}

impl Generator {
    /// Starts configuring a generator.
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::default()
    }

    fn from_parts(alphabet: Alphabet, source: Arc<dyn RandomSource>, length_hint: usize) -> Self {
        let config = RuntimeConfig::new(&alphabet, length_hint);

        Self {
            scratch: BufferPool::new(config.scratch_capacity()),
            output: BufferPool::new(config.output_capacity()),
            alphabet,
            config,
            source,
        }
    }

    /// Generates an identifier of `length` symbols.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLength`] when `length` is zero or above
    ///   [`MAX_LENGTH`]
    /// - [`Error::ExceededMaxAttempts`] when the source never produced
    ///   enough in-range draws
    /// - any error returned by the random source
    pub fn new_id(&self, length: usize) -> Result<String, Error> {
        if length == 0 || length > MAX_LENGTH {
            return Err(Error::InvalidLength);
        }

        match self.alphabet.symbols() {
            Symbols::Ascii(table) => self.assemble(table, length),
            Symbols::Unicode(table) => self.assemble(table, length),
        }
    }

    /// Generates an identifier of [`DEFAULT_LENGTH`] symbols.
    pub fn new_default_id(&self) -> Result<String, Error> {
        self.new_id(DEFAULT_LENGTH)
    }

    /// Parameters derived from the alphabet.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The alphabet identifiers are drawn from.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn assemble<S: Symbol>(&self, table: &[S], length: usize) -> Result<String, Error> {
        let max_attempts = self.config.max_attempts(length);
        let first_draw = self
            .config
            .draws_for(length)
            .min(self.config.refill_draws())
            .min(max_attempts);

        let mut scratch = self
            .scratch
            .get(first_draw.saturating_mul(self.config.bytes_needed()));
        let mut out = self
            .output
            .get(length.saturating_mul(self.config.max_symbol_len()));

        let result = self
            .sample(table, length, max_attempts, &mut scratch, &mut out)
            .map(|()| String::from(out.as_str()));

        self.scratch.put(scratch);
        self.output.put(out);

        result
    }

    fn sample<S: Symbol>(
        &self,
        table: &[S],
        length: usize,
        max_attempts: usize,
        scratch: &mut Vec<u8>,
        out: &mut String,
    ) -> Result<(), Error> {
        let config = &self.config;
        let bytes_needed = config.bytes_needed();
        let mask = config.mask();

        let mut produced = 0;
        let mut attempts = 0;

        while produced < length {
            if attempts >= max_attempts {
                tracing::warn!(
                    length,
                    attempts,
                    alphabet_len = config.alphabet_len(),
                    "identifier generation exceeded its draw budget"
                );
                return Err(Error::ExceededMaxAttempts { attempts });
            }

            let draws = config
                .draws_for(length - produced)
                .min(config.refill_draws())
                .min(max_attempts - attempts);

            scratch.clear();
            scratch.resize(draws * bytes_needed, 0);
            self.source.fill_bytes(scratch)?;

            for chunk in scratch.chunks_exact(bytes_needed) {
                attempts += 1;

                let value = chunk
                    .iter()
                    .rev()
                    .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
                    & mask;

                if !config.accepts(value) {
                    continue;
                }

                if let Some(&symbol) = table.get(value) {
                    symbol.push_to(out);
                    produced += 1;

                    if produced == length {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for Generator {
    /// URL-safe alphabet, default length hint, default random source.
    fn default() -> Self {
        Self::from_parts(Alphabet::url_safe(), rng::default_source(), DEFAULT_LENGTH)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("alphabet", &self.alphabet.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

enum AlphabetInput {
    Default,
    Validated(Alphabet),
    Bytes(Vec<u8>),
}

/// Builder for [`Generator`].
///
/// Validation happens in [`GeneratorBuilder::build`], so misconfigured
/// alphabets are reported synchronously there.
pub struct GeneratorBuilder {
    alphabet: AlphabetInput,
    source: Option<Arc<dyn RandomSource>>,
    length_hint: usize,
}

impl GeneratorBuilder {
    /// Uses `alphabet` as the symbol set.
    pub fn alphabet(mut self, alphabet: &str) -> Self {
        self.alphabet = AlphabetInput::Bytes(alphabet.as_bytes().to_vec());
        self
    }

    /// Uses raw bytes, validated as UTF-8 at build time, as the symbol set.
    pub fn alphabet_bytes(mut self, alphabet: &[u8]) -> Self {
        self.alphabet = AlphabetInput::Bytes(alphabet.to_vec());
        self
    }

    /// Uses an already validated alphabet.
    pub fn validated_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = AlphabetInput::Validated(alphabet);
        self
    }

    /// Draws randomness from `source` instead of the default source.
    pub fn random_source(mut self, source: Arc<dyn RandomSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Expected identifier length; only used to size buffers.
    pub fn length_hint(mut self, length_hint: usize) -> Self {
        self.length_hint = length_hint;
        self
    }

    /// Validates the configuration and builds the generator.
    ///
    /// # Errors
    ///
    /// Alphabet validation errors, see [`Alphabet::new`] and
    /// [`Alphabet::from_bytes`].
    pub fn build(self) -> Result<Generator, Error> {
        let alphabet = match self.alphabet {
            AlphabetInput::Default => Alphabet::url_safe(),
            AlphabetInput::Validated(alphabet) => alphabet,
            AlphabetInput::Bytes(bytes) => Alphabet::from_bytes(&bytes)?,
        };

        let source = self.source.unwrap_or_else(rng::default_source);

        Ok(Generator::from_parts(alphabet, source, self.length_hint))
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            alphabet: AlphabetInput::Default,
            source: None,
            length_hint: DEFAULT_LENGTH,
        }
    }
}
