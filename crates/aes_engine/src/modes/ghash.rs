// Copyright (C) Microsoft Corporation. All rights reserved.

//! GHASH universal hash over GF(2^128).

use super::*;

/// Reduction polynomial x^128 + x^7 + x^2 + x + 1 in GCM bit order.
const GHASH_R: u128 = 0xe1 << 120;

/// GHASH accumulator keyed by the hash subkey `H = E(K, 0^128)`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Ghash {
    h: u128,
    acc: u128,
}

impl Ghash {
    pub(crate) fn new(schedule: &AesKeySchedule) -> Self {
        let mut h = [0u8; AES_BLOCK_LEN];
        schedule.encrypt_block(&mut h);
        let ghash = Self {
            h: u128::from_be_bytes(h),
            acc: 0,
        };
        h.zeroize();
        ghash
    }

    pub(crate) fn update_block(&mut self, block: &[u8; AES_BLOCK_LEN]) {
        self.acc = gf_mul(self.acc ^ u128::from_be_bytes(*block), self.h);
    }

    /// Hashes `data`, zero-padding the final partial block.
    pub(crate) fn update_padded(&mut self, data: &[u8]) {
        for chunk in data.chunks(AES_BLOCK_LEN) {
            let mut block = [0u8; AES_BLOCK_LEN];
            block[..chunk.len()].copy_from_slice(chunk);
            self.update_block(&block);
        }
    }

    /// Hashes the length block and returns the digest.
    pub(crate) fn finish(&mut self, aad_len: usize, text_len: usize) -> [u8; AES_BLOCK_LEN] {
        let bits = ((aad_len as u128 * 8) << 64) | (text_len as u128 * 8);
        self.update_block(&bits.to_be_bytes());
        self.acc.to_be_bytes()
    }

    /// Clears the accumulator, keeping the hash subkey.
    pub(crate) fn reset(&mut self) {
        self.acc = 0;
    }
}

/// Multiplication in GF(2^128) with the GCM bit ordering.
fn gf_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in 0..128 {
        if (x >> (127 - i)) & 1 == 1 {
            z ^= v;
        }
        v = if v & 1 == 1 { (v >> 1) ^ GHASH_R } else { v >> 1 };
    }
    z
}
