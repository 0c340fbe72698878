//! Parameter definitions and validation for the DRBG.
//!
//! This module defines the configurable parameters for [`Drbg`] instances
//! and the pooled [`Reader`], and validates them before anything is
//! seeded.
//!
//! [`Drbg`]: crate::rng::Drbg
//! [`Reader`]: crate::rng::Reader

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::Error;
use crate::os::OsRandom;
use crate::rng::RandomSource;

/// AES block size in bytes; also the size of the CTR counter.
pub const BLOCK_SIZE: usize = 16;

/// Default number of bytes produced under one key before rotation (1 GiB).
pub const DEFAULT_MAX_BYTES_PER_KEY: u64 = 1 << 30;

/// Configuration parameters for the AES-CTR DRBG.
///
/// # Defaults
///
/// - `key_size`: 16 bytes (AES-128)
/// - `max_bytes_per_key`: 1 GiB
/// - `max_init_retries`: 3
/// - `max_rekey_attempts`: 5
/// - `rekey_backoff` / `max_rekey_backoff`: 100 ms / 2 s
/// - `enable_key_rotation`: `true`
/// - `personalization`: none
/// - `shards`: available parallelism
/// - `entropy`: operating system
#[derive(Clone)]
pub struct DrbgConfig {
    /// AES key size in bytes: 16, 24 or 32.
    pub key_size: usize,
    /// Bytes produced under one key before a rekey is scheduled.
    ///
    /// This is a soft bound: the check runs after each read, so a single
    /// large read may overshoot it.
    pub max_bytes_per_key: u64,
    /// Seeding attempts made before instantiation is declared failed.
    pub max_init_retries: u32,
    /// Seeding attempts made by one background rekey.
    pub max_rekey_attempts: u32,
    /// Delay before the first rekey retry; doubled after each failure.
    pub rekey_backoff: Duration,
    /// Upper bound for the rekey retry delay.
    pub max_rekey_backoff: Duration,
    /// Rotate keys once `max_bytes_per_key` is reached.
    pub enable_key_rotation: bool,
    /// Application-specific bytes mixed into every seed for domain
    /// separation between instances.
    pub personalization: Option<Vec<u8>>,
    /// Number of independent instance pools in a [`Reader`].
    ///
    /// [`Reader`]: crate::rng::Reader
    pub shards: usize,
    /// Source of seed material.
    pub entropy: Arc<dyn RandomSource>,
}

impl DrbgConfig {
    /// Replaces the seed source.
    pub fn with_entropy(mut self, entropy: Arc<dyn RandomSource>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Sets the personalization string.
    pub fn with_personalization(mut self, personalization: impl Into<Vec<u8>>) -> Self {
        self.personalization = Some(personalization.into());
        self
    }

    /// Number of seed bytes drawn per instantiation: one key plus one
    /// initial counter block.
    pub fn seed_len(&self) -> usize {
        self.key_size + BLOCK_SIZE
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !matches!(self.key_size, 16 | 24 | 32) {
            return Err(Error::InvalidKeySize(self.key_size));
        }

        if self.max_bytes_per_key == 0 {
            return Err(Error::InvalidConfig("max_bytes_per_key must be non-zero"));
        }

        if self.max_init_retries == 0 {
            return Err(Error::InvalidConfig("max_init_retries must be at least 1"));
        }

        if self.enable_key_rotation && self.max_rekey_attempts == 0 {
            return Err(Error::InvalidConfig("max_rekey_attempts must be at least 1"));
        }

        if self.rekey_backoff > self.max_rekey_backoff {
            return Err(Error::InvalidConfig(
                "rekey_backoff must not exceed max_rekey_backoff",
            ));
        }

        if self.shards == 0 {
            return Err(Error::InvalidConfig("shards must be at least 1"));
        }

        Ok(())
    }
}

impl Default for DrbgConfig {
    fn default() -> Self {
        Self {
            key_size: 16,
            max_bytes_per_key: DEFAULT_MAX_BYTES_PER_KEY,
            max_init_retries: 3,
            max_rekey_attempts: 5,
            rekey_backoff: Duration::from_millis(100),
            max_rekey_backoff: Duration::from_secs(2),
            enable_key_rotation: true,
            personalization: None,
            shards: thread::available_parallelism().map_or(1, |n| n.get()),
            entropy: Arc::new(OsRandom),
        }
    }
}

impl fmt::Debug for DrbgConfig {
    // Personalization bytes are redacted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrbgConfig")
            .field("key_size", &self.key_size)
            .field("max_bytes_per_key", &self.max_bytes_per_key)
            .field("max_init_retries", &self.max_init_retries)
            .field("max_rekey_attempts", &self.max_rekey_attempts)
            .field("rekey_backoff", &self.rekey_backoff)
            .field("max_rekey_backoff", &self.max_rekey_backoff)
            .field("enable_key_rotation", &self.enable_key_rotation)
            .field("personalized", &self.personalization.is_some())
            .field("shards", &self.shards)
            .finish()
    }
}
