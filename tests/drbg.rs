use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use nebula_id::Error;
use nebula_id::os::OsRandom;
use nebula_id::rng::{Drbg, DrbgConfig, RandomSource};

/// Entropy source that always returns the same byte.
struct FixedEntropy(u8);

impl RandomSource for FixedEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest.fill(self.0);
        Ok(())
    }
}

/// Entropy source that serves `healthy` requests from the OS, then fails.
struct FlakyEntropy {
    calls: AtomicUsize,
    healthy: usize,
}

impl FlakyEntropy {
    fn new(healthy: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            healthy,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RandomSource for FlakyEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.healthy {
            OsRandom.fill_bytes(dest)
        } else {
            Err(Error::Source(io::Error::other("entropy offline")))
        }
    }
}

fn no_rotation() -> DrbgConfig {
    DrbgConfig {
        enable_key_rotation: false,
        ..DrbgConfig::default()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_drbg_consecutive_reads_differ() {
    let drbg = Drbg::new(no_rotation()).unwrap();

    let mut a = [0u8; 64];
    let mut b = [0u8; 64];

    drbg.fill_bytes(&mut a).unwrap();
    drbg.fill_bytes(&mut b).unwrap();

    assert_ne!(a, b);
    assert!(a.iter().any(|&x| x != 0));
    assert!(b.iter().any(|&x| x != 0));
}

#[test]
fn test_drbg_same_seed_same_stream() {
    let config = no_rotation().with_entropy(Arc::new(FixedEntropy(0x42)));

    let rng1 = Drbg::new(config.clone()).unwrap();
    let rng2 = Drbg::new(config).unwrap();

    let mut a = [0u8; 100];
    let mut b = [0u8; 100];

    rng1.fill_bytes(&mut a).unwrap();
    rng2.fill_bytes(&mut b).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_drbg_personalization_separates_streams() {
    let entropy: Arc<dyn RandomSource> = Arc::new(FixedEntropy(0x42));

    let rng1 = Drbg::new(
        no_rotation()
            .with_entropy(Arc::clone(&entropy))
            .with_personalization("orders"),
    )
    .unwrap();
    let rng2 = Drbg::new(
        no_rotation()
            .with_entropy(entropy)
            .with_personalization("sessions"),
    )
    .unwrap();

    let mut a = [0u8; 64];
    let mut b = [0u8; 64];

    rng1.fill_bytes(&mut a).unwrap();
    rng2.fill_bytes(&mut b).unwrap();

    assert_ne!(a, b);
}

#[test]
fn test_drbg_split_reads_match_one_block_aligned_read() {
    let config = no_rotation().with_entropy(Arc::new(FixedEntropy(7)));

    let whole = Drbg::new(config.clone()).unwrap();
    let split = Drbg::new(config).unwrap();

    let mut a = [0u8; 48];
    whole.fill_bytes(&mut a).unwrap();

    let mut b = [0u8; 48];
    split.fill_bytes(&mut b[..16]).unwrap();
    split.fill_bytes(&mut b[16..]).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_drbg_every_key_size_is_supported() {
    for key_size in [16, 24, 32] {
        let drbg = Drbg::new(DrbgConfig {
            key_size,
            ..no_rotation()
        })
        .unwrap();

        let mut out = [0u8; 33];
        drbg.fill_bytes(&mut out).unwrap();

        assert!(out.iter().any(|&x| x != 0), "key size {key_size}");
    }
}

#[test]
fn test_drbg_invalid_key_size_is_rejected() {
    let err = Drbg::new(DrbgConfig {
        key_size: 20,
        ..DrbgConfig::default()
    })
    .unwrap_err();

    assert!(matches!(err, Error::InvalidKeySize(20)));
}

#[test]
fn test_drbg_invalid_config_is_rejected() {
    let zero_threshold = DrbgConfig {
        max_bytes_per_key: 0,
        ..DrbgConfig::default()
    };
    assert!(matches!(
        Drbg::new(zero_threshold),
        Err(Error::InvalidConfig(_))
    ));

    let inverted_backoff = DrbgConfig {
        rekey_backoff: Duration::from_secs(5),
        max_rekey_backoff: Duration::from_secs(1),
        ..DrbgConfig::default()
    };
    assert!(matches!(
        Drbg::new(inverted_backoff),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_drbg_seeding_failure_is_fatal_after_retries() {
    init_tracing();

    let entropy = Arc::new(FlakyEntropy::new(0));
    let config = DrbgConfig {
        max_init_retries: 3,
        ..no_rotation()
    }
    .with_entropy(entropy.clone());

    let err = Drbg::new(config).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, Error::Instantiation { attempts: 3, .. }));
    assert_eq!(entropy.calls(), 3);
}

#[test]
fn test_drbg_seeding_recovers_within_retries() {
    struct FailOnce(AtomicBool);

    impl RandomSource for FailOnce {
        fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
            if self.0.swap(true, Ordering::SeqCst) {
                OsRandom.fill_bytes(dest)
            } else {
                Err(Error::Source(io::Error::other("transient")))
            }
        }
    }

    let config = no_rotation().with_entropy(Arc::new(FailOnce(AtomicBool::new(false))));

    assert!(Drbg::new(config).is_ok());
}

#[test]
fn test_drbg_io_read_fills_the_whole_buffer() {
    let mut drbg = Drbg::new(no_rotation()).unwrap();

    let mut buf = [0u8; 37];
    drbg.read_exact(&mut buf).unwrap();

    assert!(buf.iter().any(|&x| x != 0));
}

#[test]
fn test_drbg_usage_is_accounted_per_byte() {
    let drbg = Drbg::new(no_rotation()).unwrap();

    let mut out = [0u8; 10];
    drbg.fill_bytes(&mut out).unwrap();
    drbg.fill_bytes(&mut out).unwrap();

    assert_eq!(drbg.usage(), 20);
    assert_eq!(drbg.generation(), 0);
}

#[test]
fn test_drbg_rotation_replaces_key_without_blocking_reads() {
    init_tracing();

    let drbg = Arc::new(
        Drbg::new(DrbgConfig {
            max_bytes_per_key: 64,
            enable_key_rotation: true,
            ..DrbgConfig::default()
        })
        .unwrap(),
    );

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let drbg = Arc::clone(&drbg);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut reads = 0usize;
                let mut buf = [0u8; 32];
                while !stop.load(Ordering::Relaxed) {
                    drbg.fill_bytes(&mut buf).unwrap();
                    assert!(buf.iter().any(|&x| x != 0));
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    let rotated = wait_until(Duration::from_secs(5), || drbg.generation() >= 1);
    stop.store(true, Ordering::Relaxed);

    let total: usize = readers.into_iter().map(|h| h.join().unwrap()).sum();

    assert!(rotated, "key was never rotated");
    assert!(total > 0);
}

#[test]
fn test_drbg_rotation_resets_usage() {
    let drbg = Drbg::new(DrbgConfig {
        max_bytes_per_key: 16,
        ..DrbgConfig::default()
    })
    .unwrap();

    let mut out = [0u8; 16];
    drbg.fill_bytes(&mut out).unwrap();

    assert!(wait_until(Duration::from_secs(5), || drbg.generation() == 1
        && !drbg.is_rekeying()));
    assert_eq!(drbg.usage(), 0);
}

#[test]
fn test_drbg_failed_rotation_keeps_previous_key() {
    init_tracing();

    let entropy = Arc::new(FlakyEntropy::new(1));
    let drbg = Drbg::new(
        DrbgConfig {
            max_bytes_per_key: 16,
            max_rekey_attempts: 2,
            rekey_backoff: Duration::from_millis(1),
            max_rekey_backoff: Duration::from_millis(2),
            ..DrbgConfig::default()
        }
        .with_entropy(entropy.clone()),
    )
    .unwrap();

    let mut first = [0u8; 16];
    drbg.fill_bytes(&mut first).unwrap();

    assert!(wait_until(Duration::from_secs(5), || entropy.calls() >= 3
        && !drbg.is_rekeying()));
    assert_eq!(drbg.generation(), 0);

    let mut second = [0u8; 16];
    drbg.fill_bytes(&mut second).unwrap();

    assert_ne!(first, second);
    assert!(second.iter().any(|&x| x != 0));
}
