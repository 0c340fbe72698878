//! Random number generation module
//!
//! This module provides the cryptographically secure randomness that
//! backs identifier generation.
//!
//! It is built around an AES-CTR deterministic random bit generator
//! ([`Drbg`]) and exposes a sharded, pooled front end ([`Reader`])
//! suitable for many concurrent callers.
//!
//! # Layers
//!
//! - [`config`]
//!   Tunables: key size, rotation threshold, retry and backoff policy,
//!   personalization, shard count and the entropy source used for seeding.
//!
//! - `cipher`
//!   The AES block function in CTR mode over a 128-bit big-endian
//!   counter.
//!
//! - [`drbg`]
//!   A single generator instance: immutable key state swapped wholesale on
//!   rekey, a mutex-protected working counter, and usage accounting.
//!
//! - `rekey`
//!   Background key rotation with bounded, exponentially backed-off
//!   retries. Readers are never blocked while it runs.
//!
//! - `pool` / [`reader`]
//!   Lazily populated pools of instances, grouped into shards to spread
//!   lock contention, behind a single streaming-read surface.

use std::sync::Arc;

use crate::Error;

pub(crate) mod cipher;
pub mod config;
pub mod drbg;
pub(crate) mod pool;
pub mod reader;
pub(crate) mod rekey;

pub use config::DrbgConfig;
pub use drbg::Drbg;
pub use reader::Reader;

/// Streaming source of cryptographically secure random bytes.
///
/// This is the seam between identifier generation and randomness: the
/// generator only ever calls [`RandomSource::fill_bytes`], so any secure
/// source can be substituted transparently. Implementations must be safe
/// to share across threads; each call is independent and no ordering is
/// implied between concurrent calls.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` entirely with random bytes, or fails without a partial
    /// result being meaningful to the caller.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error>;
}

impl<T: RandomSource + ?Sized> RandomSource for Arc<T> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &T {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

/// Handle to the process-wide [`Reader`].
///
/// Lets the global reader be stored wherever an owned
/// `Arc<dyn RandomSource>` is expected.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalReader;

impl RandomSource for GlobalReader {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        Reader::global().fill_bytes(dest)
    }
}

/// Returns the random source used when none is configured explicitly.
///
/// This is the process-wide DRBG reader, or the operating system generator
/// when the crate is built with the `fips` feature.
pub fn default_source() -> Arc<dyn RandomSource> {
    if cfg!(feature = "fips") {
        Arc::new(crate::os::OsRandom)
    } else {
        Arc::new(GlobalReader)
    }
}
