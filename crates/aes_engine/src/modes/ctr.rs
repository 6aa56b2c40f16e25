// Copyright (C) Microsoft Corporation. All rights reserved.

//! Counter-mode keystream.
//!
//! The counter occupies the low-order bits of a 16-byte big-endian block and
//! wraps within them; the remaining high-order bits never change. CTR, CCM
//! and GCM all draw their keystream from [`Keystream`], with counter widths
//! of the caller's choosing, `8 * (15 - nonce_len)` bits and 32 bits
//! respectively.

use super::*;

/// Keystream generator over an incrementing counter block.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Keystream {
    counter: u128,
    mask: u128,
    block: [u8; AES_BLOCK_LEN],
    used: usize,
}

impl Keystream {
    /// Starts a keystream whose first block encrypts `counter_block`.
    pub(crate) fn new(counter_block: [u8; AES_BLOCK_LEN], counter_bits: u32) -> Self {
        let mask = match counter_bits {
            128.. => u128::MAX,
            bits => (1u128 << bits) - 1,
        };
        Self {
            counter: u128::from_be_bytes(counter_block),
            mask,
            block: [0u8; AES_BLOCK_LEN],
            used: AES_BLOCK_LEN,
        }
    }

    /// XORs the next `data.len()` keystream bytes into `data`.
    pub(crate) fn apply(&mut self, schedule: &AesKeySchedule, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.used == AES_BLOCK_LEN {
                self.refill(schedule);
            }
            *byte ^= self.block[self.used];
            self.used += 1;
        }
    }

    fn refill(&mut self, schedule: &AesKeySchedule) {
        self.block = self.counter.to_be_bytes();
        schedule.encrypt_block(&mut self.block);
        self.counter = (self.counter & !self.mask) | (self.counter.wrapping_add(1) & self.mask);
        self.used = 0;
    }
}

/// CTR mode state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CtrState {
    keystream: Keystream,
}

impl CtrState {
    pub(crate) fn new(params: &CtrParams) -> Self {
        Self {
            keystream: Keystream::new(params.counter_block, params.counter_bits),
        }
    }

    pub(crate) fn absorb(
        &mut self,
        schedule: &AesKeySchedule,
        input: &[u8],
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        let mut block = [0u8; AES_BLOCK_LEN];
        for piece in input.chunks(AES_BLOCK_LEN) {
            let buf = &mut block[..piece.len()];
            buf.copy_from_slice(piece);
            self.keystream.apply(schedule, buf);
            out.write(buf)?;
        }
        block.zeroize();
        Ok(())
    }
}
