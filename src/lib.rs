//! Secure identifier generation for Nebula
//!
//! This crate produces short, collision-resistant identifiers over an
//! arbitrary alphabet, together with the randomness source that backs
//! them.
//!
//! The focus is on **predictable security properties under concurrency**:
//! every identifier is drawn from a cryptographically secure generator,
//! mapped onto the alphabet without modulo bias, and produced without
//! global locks on the hot path.
//!
//! # Module overview
//!
//! - `os`
//!   Access to operating system entropy. Everything else in the crate is
//!   ultimately seeded from here.
//!
//! - `rng`
//!   An AES-CTR deterministic random bit generator (DRBG) in the style of
//!   NIST SP 800-90A. Each instance keeps its cryptographic state behind
//!   an atomically swapped handle and its 128-bit counter behind a short
//!   mutex, rotates its key in the background once a usage threshold is
//!   reached, and is served to callers through a sharded pool
//!   ([`rng::Reader`]).
//!
//!   The [`rng::RandomSource`] trait is the streaming-read contract the
//!   rest of the crate consumes. Any other secure source can be plugged in
//!   through it, and the DRBG can be reused by unrelated consumers that
//!   just need secure bytes.
//!
//! - `nanoid`
//!   Alphabet validation, derived runtime parameters, pooled scratch
//!   buffers and the rejection sampler that assembles identifiers.
//!
//! # Quick example
//!
//! ```
//! let id = nebula_id::nanoid::new()?;
//! assert_eq!(id.chars().count(), nebula_id::nanoid::DEFAULT_LENGTH);
//! # Ok::<(), nebula_id::Error>(())
//! ```
//!
//! # Design goals
//!
//! - No modulo bias: out-of-range draws are rejected, never folded
//! - Bounded loops everywhere: generation either succeeds or errors
//! - Readers are never blocked by key rotation
//! - Explicit, synchronous errors for every misconfiguration

mod error;

pub mod nanoid;
pub mod os;
pub mod rng;

pub use error::Error;
