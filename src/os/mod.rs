//! Operating system abstraction layer
//!
//! This module provides a unified, platform-independent interface to the
//! entropy services of the operating system.
//!
//! Platform selection is delegated to the `getrandom` crate, which picks
//! the preferred kernel interface at compile time (`getrandom(2)` on
//! Linux, `getentropy` on macOS, `ProcessPrng` on Windows, ...). The
//! surface exposed here is the same on every target.
//!
//! Unlike the rest of the crate, failures here are not retried: callers
//! that need retries (DRBG instantiation, key rotation) apply their own
//! policy on top of [`sys_random`].

use crate::Error;
use crate::rng::RandomSource;

/// Fills a buffer with cryptographically secure random bytes from the OS.
///
/// Partial reads and interrupted system calls are handled by `getrandom`;
/// on success the whole buffer is initialized.
///
/// # Errors
/// Returns [`Error::Entropy`] if the kernel refuses to provide entropy.
pub fn sys_random(buf: &mut [u8]) -> Result<(), Error> {
    if buf.is_empty() {
        return Ok(());
    }

    getrandom::fill(buf)?;
    Ok(())
}

/// Random source backed directly by the operating system.
///
/// This is the default entropy source used to seed every DRBG, and the
/// process-wide identifier source when the `fips` feature is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        sys_random(dest)
    }
}
