//! AES-CTR keystream
//!
//! The DRBG output is the AES encryption of successive values of a 128-bit
//! big-endian counter. The counter is pre-incremented, so the first block
//! produced after seeding encrypts `V + 1`, and it wraps from all-ones to
//! all-zero.

use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use aes::{Aes128, Aes192, Aes256};

use crate::Error;
use crate::rng::config::BLOCK_SIZE;

/// AES instance keyed for one of the three supported key sizes.
pub(crate) enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    /// Expands `key` into an AES key schedule.
    ///
    /// The key length selects the variant.
    pub(crate) fn new(key: &[u8]) -> Result<Self, Error> {
        let cipher = match key.len() {
            16 => Self::Aes128(Aes128::new_from_slice(key).map_err(|_| Error::Cipher)?),
            24 => Self::Aes192(Aes192::new_from_slice(key).map_err(|_| Error::Cipher)?),
            32 => Self::Aes256(Aes256::new_from_slice(key).map_err(|_| Error::Cipher)?),
            other => return Err(Error::InvalidKeySize(other)),
        };

        Ok(cipher)
    }

    /// Encrypts one 16-byte block in place.
    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block.as_mut_slice());

        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    /// Fills `out` with keystream, advancing `counter` once per block.
    ///
    /// A trailing partial block is produced in a temporary buffer and
    /// truncated on copy; the unused part of that block is discarded, never
    /// carried over to the next call.
    pub(crate) fn fill_blocks(&self, counter: &mut u128, out: &mut [u8]) {
        let mut block = [0u8; BLOCK_SIZE];
        let mut chunks = out.chunks_exact_mut(BLOCK_SIZE);

        for chunk in &mut chunks {
            *counter = counter.wrapping_add(1);
            block = counter.to_be_bytes();
            self.encrypt_block(&mut block);
            chunk.copy_from_slice(&block);
        }

        let tail = chunks.into_remainder();
        if !tail.is_empty() {
            *counter = counter.wrapping_add(1);
            block = counter.to_be_bytes();
            self.encrypt_block(&mut block);
            tail.copy_from_slice(&block[..tail.len()]);
        }

        block.fill(0);
    }
}
