//! Lazily populated pool of DRBG instances.
//!
//! Instances are created on demand when the pool is empty and returned
//! after every use, so the pool grows to the peak number of concurrent
//! callers of its shard and never shrinks. An instance is only ever held
//! by one caller at a time.

use std::sync::Arc;

use crossbeam_queue::SegQueue;

use crate::Error;
use crate::rng::config::DrbgConfig;
use crate::rng::drbg::Drbg;

pub(crate) struct DrbgPool {
    idle: SegQueue<Drbg>,
    config: Arc<DrbgConfig>,
}

impl DrbgPool {
    pub(crate) fn new(config: Arc<DrbgConfig>) -> Self {
        Self {
            idle: SegQueue::new(),
            config,
        }
    }

    /// Checks out an instance, runs `f` on it and puts it back.
    ///
    /// The instance is returned to the pool whatever `f` returns. Fails only
    /// when the pool is empty and a new instance cannot be seeded, in which
    /// case [`Error::Instantiation`] is surfaced.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&Drbg) -> R) -> Result<R, Error> {
        let drbg = match self.idle.pop() {
            Some(drbg) => drbg,
            None => Drbg::from_config(Arc::clone(&self.config))?,
        };

        let out = f(&drbg);
        self.idle.push(drbg);

        Ok(out)
    }

    /// Number of instances currently parked in the pool.
    pub(crate) fn idle(&self) -> usize {
        self.idle.len()
    }
}
