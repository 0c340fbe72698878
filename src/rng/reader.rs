//! Sharded, pooled DRBG front end
//!
//! A [`Reader`] owns a fixed set of shards, each a pool of [`Drbg`]
//! instances. Every read picks a shard with a fast non-cryptographic index
//! generator (skipped when there is only one shard), checks out an
//! instance exclusively, delegates the read and returns the instance.
//!
//! # Initialization failures
//!
//! [`Reader::new`] runs one checkout per shard before returning, so a
//! missing entropy source or a broken cipher is reported immediately.
//!
//! Instances created later, when a shard runs dry under load, are seeded
//! lazily. If that seeding fails after `max_init_retries` attempts the
//! read returns [`Error::Instantiation`]. This is the same error class as
//! a failed explicit construction and callers should treat it as a
//! process-level fault: without a secure random source no identifier can
//! be produced.
//!
//! [`Drbg`]: crate::rng::Drbg

use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};

use crate::Error;
use crate::rng::RandomSource;
use crate::rng::config::DrbgConfig;
use crate::rng::pool::DrbgPool;

static GLOBAL: OnceLock<Reader> = OnceLock::new();

/// Concurrency-safe source of DRBG output.
pub struct Reader {
    shards: Box<[DrbgPool]>,
}

impl Reader {
    /// Builds a reader and seeds one instance per shard.
    ///
    /// # Errors
    ///
    /// - configuration errors from [`DrbgConfig`] validation
    /// - [`Error::Instantiation`] when a shard cannot seed its first
    ///   instance
    pub fn new(config: DrbgConfig) -> Result<Self, Error> {
        config.validate()?;

        let reader = Self::lazy(Arc::new(config));
        for shard in reader.shards.iter() {
            shard.with(|_| ())?;
        }

        tracing::debug!(shards = reader.shards.len(), "DRBG reader ready");
        Ok(reader)
    }

    fn lazy(config: Arc<DrbgConfig>) -> Self {
        let shards = (0..config.shards)
            .map(|_| DrbgPool::new(Arc::clone(&config)))
            .collect();

        Self { shards }
    }

    /// Process-wide reader with the default configuration.
    ///
    /// Initialized on first use. Its shards are seeded lazily, so a seeding
    /// failure surfaces from the first read as [`Error::Instantiation`].
    pub fn global() -> &'static Reader {
        GLOBAL.get_or_init(|| Self::lazy(Arc::new(DrbgConfig::default())))
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of seeded instances currently parked across all shards.
    pub fn idle_instances(&self) -> usize {
        self.shards.iter().map(DrbgPool::idle).sum()
    }

    fn shard(&self) -> &DrbgPool {
        let index = match self.shards.len() {
            1 => 0,
            n => fastrand::usize(..n),
        };

        &self.shards[index]
    }
}

impl RandomSource for Reader {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        self.shard().with(|drbg| drbg.fill_bytes(dest))?
    }
}

impl io::Read for &Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill_bytes(buf)?;
        Ok(buf.len())
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("shards", &self.shards.len())
            .field("idle_instances", &self.idle_instances())
            .finish()
    }
}
