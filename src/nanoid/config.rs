//! Runtime parameters derived from an alphabet.
//!
//! A [`RuntimeConfig`] is computed once when a generator is built and is
//! read-only afterwards. It carries the bit mask used by the rejection
//! sampler and the buffer sizes used by the pools.
//!
//! # Buffer sizing
//!
//! Scratch buffers hold enough draws to fill `length_hint` symbols in one
//! read on average: `length_hint * 2^bits / alphabet_len` draws, plus a
//! slack of `log2(length_hint) + 1` draws for alphabets that need
//! rejection. This is a throughput knob only; identifiers of any length
//! are produced correctly whatever the hint.
//!
//! Long identifiers are filled in several reads of at most
//! `refill_draws` draws each, so scratch memory never scales with the
//! requested length.

use crate::nanoid::alphabet::Alphabet;

/// Multiplier bounding rejection sampling: an identifier of length `L`
/// may consume at most `L * MAX_ATTEMPTS_MULTIPLIER` draws.
pub const MAX_ATTEMPTS_MULTIPLIER: usize = 10;

/// Floor for the number of draws fetched by one read of the random source.
const MIN_REFILL_DRAWS: usize = 4096;

/// Immutable parameters bound to one generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    alphabet_len: usize,
    bits_needed: u32,
    mask: usize,
    bytes_needed: usize,
    is_power_of_two: bool,
    is_ascii: bool,
    max_symbol_len: usize,
    length_hint: usize,
    scratch_capacity: usize,
    output_capacity: usize,
    refill_draws: usize,
}

impl RuntimeConfig {
    pub(crate) fn new(alphabet: &Alphabet, length_hint: usize) -> Self {
        let alphabet_len = alphabet.len();
        let bits_needed = usize::BITS - (alphabet_len - 1).leading_zeros();
        let bytes_needed = bits_needed.div_ceil(8) as usize;
        let length_hint = length_hint.max(1);

        let mut config = Self {
            alphabet_len,
            bits_needed,
            mask: (1usize << bits_needed) - 1,
            bytes_needed,
            is_power_of_two: alphabet_len.is_power_of_two(),
            is_ascii: alphabet.is_ascii(),
            max_symbol_len: alphabet.max_symbol_len(),
            length_hint,
            scratch_capacity: 0,
            output_capacity: 0,
            refill_draws: 0,
        };

        let hint_draws = config.draws_for(length_hint);
        config.refill_draws = hint_draws.max(MIN_REFILL_DRAWS);
        config.scratch_capacity = hint_draws * bytes_needed;
        config.output_capacity = length_hint * config.max_symbol_len;
        config
    }

    /// Number of symbols in the alphabet.
    pub fn alphabet_len(&self) -> usize {
        self.alphabet_len
    }

    /// `ceil(log2(alphabet_len))`.
    pub fn bits_needed(&self) -> u32 {
        self.bits_needed
    }

    /// `(1 << bits_needed) - 1`.
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Bytes consumed per draw.
    pub fn bytes_needed(&self) -> usize {
        self.bytes_needed
    }

    /// Whether every masked draw is a valid index.
    pub fn is_power_of_two(&self) -> bool {
        self.is_power_of_two
    }

    /// Whether the ASCII fast path is in use.
    pub fn is_ascii(&self) -> bool {
        self.is_ascii
    }

    /// Longest UTF-8 encoding of any symbol.
    pub fn max_symbol_len(&self) -> usize {
        self.max_symbol_len
    }

    /// Identifier length the buffers are sized for.
    pub fn length_hint(&self) -> usize {
        self.length_hint
    }

    /// Standard capacity of pooled scratch buffers, in bytes.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch_capacity
    }

    /// Standard capacity of pooled output buffers, in bytes.
    pub fn output_capacity(&self) -> usize {
        self.output_capacity
    }

    /// Upper bound on draws fetched by one read of the random source.
    pub(crate) fn refill_draws(&self) -> usize {
        self.refill_draws
    }

    /// Draw budget for an identifier of `length` symbols.
    pub fn max_attempts(&self, length: usize) -> usize {
        length.saturating_mul(MAX_ATTEMPTS_MULTIPLIER)
    }

    /// Whether a masked draw maps to a symbol.
    #[inline]
    pub fn accepts(&self, value: usize) -> bool {
        self.is_power_of_two || value < self.alphabet_len
    }

    /// Expected number of draws needed to accept `symbols` values.
    pub(crate) fn draws_for(&self, symbols: usize) -> usize {
        if self.is_power_of_two {
            return symbols.max(1);
        }

        let range = 1usize << self.bits_needed;
        let expected = symbols.saturating_mul(range).div_ceil(self.alphabet_len);
        let slack = (usize::BITS - symbols.leading_zeros()) as usize;

        expected.saturating_add(slack).max(1)
    }
}
