// Copyright (C) Microsoft Corporation. All rights reserved.

//! CMAC (NIST SP 800-38B).
//!
//! Blocks are chained through the cipher as in CBC with a zero IV. The final
//! block is held back by the remainder buffer so it can be masked with the
//! first subkey when complete, or padded and masked with the second subkey
//! when partial.

use super::*;

/// Reduction constant for doubling in GF(2^128).
const CMAC_RB: u128 = 0x87;

/// CMAC accumulator and subkeys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CmacState {
    mac: [u8; AES_BLOCK_LEN],
    k1: [u8; AES_BLOCK_LEN],
    k2: [u8; AES_BLOCK_LEN],
}

impl CmacState {
    pub(crate) fn new(schedule: &AesKeySchedule) -> Self {
        let mut l = [0u8; AES_BLOCK_LEN];
        schedule.encrypt_block(&mut l);
        let k1 = dbl(&l);
        let k2 = dbl(&k1);
        l.zeroize();

        Self {
            mac: [0u8; AES_BLOCK_LEN],
            k1,
            k2,
        }
    }

    pub(crate) fn absorb(
        &mut self,
        schedule: &AesKeySchedule,
        remainder: &mut BlockBuffer,
        input: &[u8],
    ) -> Result<(), AesEngineError> {
        remainder.feed_deferred(input, |block| {
            xor_block(&mut self.mac, block);
            schedule.encrypt_block(&mut self.mac);
            Ok(())
        })
    }

    pub(crate) fn finalize(
        &mut self,
        schedule: &AesKeySchedule,
        remainder: &mut BlockBuffer,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        let tail = remainder.as_slice();
        let mut last = [0u8; AES_BLOCK_LEN];
        last[..tail.len()].copy_from_slice(tail);

        if tail.len() == AES_BLOCK_LEN {
            xor_block(&mut last, &self.k1);
        } else {
            last[tail.len()] = 0x80;
            xor_block(&mut last, &self.k2);
        }
        remainder.clear();

        xor_block(&mut self.mac, &last);
        schedule.encrypt_block(&mut self.mac);
        last.zeroize();

        out.write(&self.mac)
    }
}

/// Multiplication by x in GF(2^128).
fn dbl(block: &[u8; AES_BLOCK_LEN]) -> [u8; AES_BLOCK_LEN] {
    let value = u128::from_be_bytes(*block);
    let carry = if value >> 127 == 1 { CMAC_RB } else { 0 };
    ((value << 1) ^ carry).to_be_bytes()
}
