//! Background key rotation
//!
//! A rekey is scheduled by the read path once an instance has produced
//! `max_bytes_per_key` bytes under its current key. It runs on a detached
//! thread, so readers keep using the old key until the new state is
//! installed.
//!
//! Failures are never reported to callers. Seeding is retried up to
//! `max_rekey_attempts` times with exponential backoff capped at
//! `max_rekey_backoff`; if every attempt fails the instance stays on its
//! previous key and the next threshold crossing may try again.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;

use crate::rng::drbg::{DrbgShared, DrbgState};

/// Starts a background rekey unless one is already in flight.
pub(crate) fn schedule(shared: &Arc<DrbgShared>) {
    if shared
        .rekeying
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return;
    }

    let task = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name("nebula-id-rekey".into())
        .spawn(move || run(&task));

    if let Err(err) = spawned {
        tracing::warn!(error = %err, "could not spawn rekey thread");
        shared.rekeying.store(false, Ordering::Release);
    }
}

fn run(shared: &DrbgShared) {
    let config = &shared.config;
    let mut backoff = config.rekey_backoff;

    for attempt in 1..=config.max_rekey_attempts {
        match DrbgState::instantiate(config) {
            Ok(state) => {
                shared.install(state);
                shared.rekeying.store(false, Ordering::Release);

                tracing::debug!(attempt, "DRBG rekeyed");
                return;
            }
            Err(err) => {
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_rekey_attempts,
                    error = %err,
                    "DRBG rekey attempt failed"
                );

                if attempt < config.max_rekey_attempts {
                    thread::sleep(backoff);
                    backoff = backoff.saturating_mul(2).min(config.max_rekey_backoff);
                }
            }
        }
    }

    tracing::error!(
        attempts = config.max_rekey_attempts,
        "DRBG rekey exhausted; continuing on previous key"
    );
    shared.rekeying.store(false, Ordering::Release);
}
