use std::collections::HashSet;
use std::io::{self, Read};
use std::sync::Arc;
use std::thread;

use nebula_id::Error;
use nebula_id::rng::{DrbgConfig, RandomSource, Reader};

struct BrokenEntropy;

impl RandomSource for BrokenEntropy {
    fn fill_bytes(&self, _dest: &mut [u8]) -> Result<(), Error> {
        Err(Error::Source(io::Error::other("no entropy")))
    }
}

fn reader(shards: usize) -> Reader {
    Reader::new(DrbgConfig {
        shards,
        ..DrbgConfig::default()
    })
    .unwrap()
}

#[test]
fn test_reader_construction_seeds_one_instance_per_shard() {
    let reader = reader(4);

    assert_eq!(reader.shard_count(), 4);
    assert_eq!(reader.idle_instances(), 4);
}

#[test]
fn test_reader_construction_surfaces_entropy_failure() {
    let config = DrbgConfig {
        shards: 2,
        ..DrbgConfig::default()
    }
    .with_entropy(Arc::new(BrokenEntropy));

    let err = Reader::new(config).unwrap_err();

    assert!(err.is_fatal());
}

#[test]
fn test_reader_zero_shards_is_rejected() {
    let err = Reader::new(DrbgConfig {
        shards: 0,
        ..DrbgConfig::default()
    })
    .unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_reader_reads_of_any_size() {
    let reader = reader(1);

    for len in [1usize, 15, 16, 17, 31, 1000] {
        let mut buf = vec![0u8; len];
        reader.fill_bytes(&mut buf).unwrap();

        if len >= 16 {
            assert!(buf.iter().any(|&b| b != 0), "len {len}");
        }
    }
}

#[test]
fn test_reader_consecutive_reads_differ() {
    let reader = reader(2);

    let mut a = [0u8; 32];
    let mut b = [0u8; 32];

    reader.fill_bytes(&mut a).unwrap();
    reader.fill_bytes(&mut b).unwrap();

    assert_ne!(a, b);
}

#[test]
fn test_reader_concurrent_reads_never_repeat() {
    let reader = reader(4);
    const THREADS: usize = 8;
    const READS: usize = 2_000;

    let outputs: Vec<Vec<[u8; 16]>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..READS)
                        .map(|_| {
                            let mut buf = [0u8; 16];
                            reader.fill_bytes(&mut buf).unwrap();
                            buf
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(THREADS * READS);
    for buf in outputs.into_iter().flatten() {
        assert!(seen.insert(buf), "duplicate output block");
    }

    assert_eq!(seen.len(), THREADS * READS);
    assert!(reader.idle_instances() >= reader.shard_count());
}

#[test]
fn test_reader_io_read_on_shared_reference() {
    let reader = reader(1);

    let mut buf = [0u8; 64];
    (&reader).read_exact(&mut buf).unwrap();

    assert!(buf.iter().any(|&b| b != 0));
}

#[test]
fn test_reader_global_is_a_singleton() {
    let a = Reader::global();
    let b = Reader::global();

    assert!(std::ptr::eq(a, b));

    let mut buf = [0u8; 32];
    a.fill_bytes(&mut buf).unwrap();

    assert!(buf.iter().any(|&x| x != 0));
}
