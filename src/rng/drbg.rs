//! AES-CTR deterministic random bit generator
//!
//! This module implements a single DRBG instance in the style of NIST
//! SP 800-90A CTR_DRBG (without derivation function):
//!
//! - seed material (`key_size + 16` bytes) is drawn from the configured
//!   entropy source and optionally XOR-ed with a personalization string
//! - the seed is split into an AES key and an initial 128-bit counter `V`
//! - output is the encryption of `V + 1`, `V + 2`, ...
//!
//! # Concurrency
//!
//! The key schedule and the working counter form one `Epoch` behind a
//! single mutex, held only for the duration of one request. The key
//! schedule is never mutated: a rekey replaces the whole epoch, so a read
//! always pairs a key with its own counter.
//!
//! Usage is accounted with an atomic counter. Once it reaches
//! `max_bytes_per_key`, exactly one background rekey is admitted through a
//! compare-and-swap on the rekey flag; reads continue on the old key until
//! the new state is installed.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::Error;
use crate::rng::cipher::BlockCipher;
use crate::rng::config::{BLOCK_SIZE, DrbgConfig};
use crate::rng::{RandomSource, rekey};

/// Immutable cryptographic state of one key epoch.
pub(crate) struct DrbgState {
    cipher: BlockCipher,
    /// Counter value the epoch starts from.
    v: u128,
}

impl DrbgState {
    /// Draws fresh seed material and derives a key and initial counter.
    pub(crate) fn instantiate(config: &DrbgConfig) -> Result<Self, Error> {
        let mut seed = vec![0u8; config.seed_len()];

        let result = config
            .entropy
            .fill_bytes(&mut seed)
            .and_then(|()| Self::from_seed(&mut seed, config));

        seed.fill(0);
        result
    }

    fn from_seed(seed: &mut [u8], config: &DrbgConfig) -> Result<Self, Error> {
        if let Some(personalization) = &config.personalization {
            let len = seed.len();
            for (i, b) in personalization.iter().enumerate() {
                seed[i % len] ^= b;
            }
        }

        let (key, v_bytes) = seed.split_at(config.key_size);

        let mut v = [0u8; BLOCK_SIZE];
        v.copy_from_slice(v_bytes);
        let cipher = BlockCipher::new(key)?;

        let state = Self {
            cipher,
            v: u128::from_be_bytes(v),
        };
        v.fill(0);

        Ok(state)
    }

    /// Seeds a state, retrying up to `max_init_retries` times.
    pub(crate) fn instantiate_with_retries(config: &DrbgConfig) -> Result<Self, Error> {
        let mut last = None;

        for attempt in 1..=config.max_init_retries {
            match Self::instantiate(config) {
                Ok(state) => return Ok(state),
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = config.max_init_retries,
                        error = %err,
                        "DRBG seeding attempt failed"
                    );
                    last = Some(err);
                }
            }
        }

        Err(Error::Instantiation {
            attempts: config.max_init_retries,
            source: Box::new(last.unwrap_or(Error::InvalidConfig(
                "max_init_retries must be at least 1",
            ))),
        })
    }
}

/// Key schedule paired with the counter advancing under it.
struct Epoch {
    state: DrbgState,
    counter: u128,
}

impl Epoch {
    fn new(state: DrbgState) -> Self {
        Self {
            counter: state.v,
            state,
        }
    }
}

/// State shared between an instance and its background rekey task.
pub(crate) struct DrbgShared {
    pub(crate) config: Arc<DrbgConfig>,
    epoch: Mutex<Epoch>,
    usage: AtomicU64,
    pub(crate) rekeying: AtomicBool,
    generation: AtomicU64,
}

impl DrbgShared {
    /// Replaces the epoch with a freshly seeded state and resets usage.
    pub(crate) fn install(&self, state: DrbgState) {
        let mut epoch = self.epoch.lock();

        *epoch = Epoch::new(state);
        self.usage.store(0, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// A single AES-CTR DRBG instance.
///
/// Instances are cheap to share by reference: every method takes `&self`.
/// For many concurrent callers prefer the pooled [`Reader`], which hands
/// each caller its own instance.
///
/// [`Reader`]: crate::rng::Reader
pub struct Drbg {
    shared: Arc<DrbgShared>,
}

impl Drbg {
    /// Creates and seeds a new instance.
    ///
    /// # Errors
    ///
    /// - configuration errors from [`DrbgConfig`] validation
    /// - [`Error::Instantiation`] when every seeding attempt failed
    pub fn new(config: DrbgConfig) -> Result<Self, Error> {
        config.validate()?;
        Self::from_config(Arc::new(config))
    }

    /// Seeds an instance from an already validated configuration.
    pub(crate) fn from_config(config: Arc<DrbgConfig>) -> Result<Self, Error> {
        let state = DrbgState::instantiate_with_retries(&config)?;

        tracing::trace!(key_size = config.key_size, "DRBG instantiated");

        Ok(Self {
            shared: Arc::new(DrbgShared {
                config,
                epoch: Mutex::new(Epoch::new(state)),
                usage: AtomicU64::new(0),
                rekeying: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Configuration this instance was built with.
    pub fn config(&self) -> &DrbgConfig {
        &self.shared.config
    }

    /// Bytes produced since the current key was installed.
    pub fn usage(&self) -> u64 {
        self.shared.usage.load(Ordering::Acquire)
    }

    /// Number of keys installed by rotation since instantiation.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Whether a background rekey is currently in flight.
    pub fn is_rekeying(&self) -> bool {
        self.shared.rekeying.load(Ordering::Acquire)
    }

    /// Fills `out` with keystream from the current key.
    fn generate(&self, out: &mut [u8]) {
        if out.is_empty() {
            return;
        }

        {
            let mut epoch = self.shared.epoch.lock();
            let Epoch { state, counter } = &mut *epoch;

            let mut v = *counter;
            state.cipher.fill_blocks(&mut v, out);
            *counter = v;
        }

        let produced = out.len() as u64;
        let used = self
            .shared
            .usage
            .fetch_add(produced, Ordering::AcqRel)
            .saturating_add(produced);

        let config = &self.shared.config;
        if config.enable_key_rotation && used >= config.max_bytes_per_key {
            rekey::schedule(&self.shared);
        }
    }

    #[cfg(test)]
    pub(crate) fn prime_counter(&self, value: u128) {
        self.shared.epoch.lock().counter = value;
    }

    #[cfg(test)]
    pub(crate) fn counter(&self) -> u128 {
        self.shared.epoch.lock().counter
    }
}

impl RandomSource for Drbg {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        self.generate(dest);
        Ok(())
    }
}

impl io::Read for Drbg {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.generate(buf);
        Ok(buf.len())
    }
}

impl fmt::Debug for Drbg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drbg")
            .field("key_size", &self.shared.config.key_size)
            .field("usage", &self.usage())
            .field("generation", &self.generation())
            .field("rekeying", &self.is_rekeying())
            .finish()
    }
}
