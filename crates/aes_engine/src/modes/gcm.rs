// Copyright (C) Microsoft Corporation. All rights reserved.

//! GCM and GMAC (NIST SP 800-38D).
//!
//! Encryption keystreams full blocks as they arrive and hashes the resulting
//! ciphertext; the ciphertext is staged and emitted with the tag at
//! finalize. Decryption stages all input because the tag occupies the last
//! `tag_len` bytes, which cannot be told apart from ciphertext until the
//! input ends. Staged ciphertext is decrypted and released only after the
//! tag has been verified.
//!
//! GMAC is GCM with empty plaintext: all authenticated data comes from the
//! parameters and the output is the tag alone.

use subtle::ConstantTimeEq;

use super::*;

/// GCM/GMAC running state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct GcmState {
    tag_len: usize,
    aad_len: usize,
    ghash: Ghash,
    keystream: Keystream,
    tag_mask: [u8; AES_BLOCK_LEN],
    staging: Vec<u8>,
}

impl GcmState {
    pub(crate) fn new(
        schedule: &AesKeySchedule,
        iv: &[u8],
        aad: &[u8],
        tag_len: usize,
    ) -> Self {
        let mut ghash = Ghash::new(schedule);

        let j0 = if iv.len() == 12 {
            let mut j0 = [0u8; AES_BLOCK_LEN];
            j0[..12].copy_from_slice(iv);
            j0[AES_BLOCK_LEN - 1] = 1;
            j0
        } else {
            ghash.update_padded(iv);
            let j0 = ghash.finish(0, iv.len());
            ghash.reset();
            j0
        };

        // the first keystream block, E(K, J0), masks the tag
        let mut keystream = Keystream::new(j0, 32);
        let mut tag_mask = [0u8; AES_BLOCK_LEN];
        keystream.apply(schedule, &mut tag_mask);

        ghash.update_padded(aad);

        Self {
            tag_len,
            aad_len: aad.len(),
            ghash,
            keystream,
            tag_mask,
            staging: Vec::new(),
        }
    }

    pub(crate) fn tag_len(&self) -> usize {
        self.tag_len
    }

    pub(crate) fn staged_len(&self) -> usize {
        self.staging.len()
    }

    pub(crate) fn absorb(
        &mut self,
        schedule: &AesKeySchedule,
        direction: Direction,
        remainder: &mut BlockBuffer,
        input: &[u8],
    ) -> Result<(), AesEngineError> {
        match direction {
            Direction::Encrypt => {
                reserve(&mut self.staging, remainder.emitted_len(input.len()))?;
                remainder.feed(input, |block| {
                    self.keystream.apply(schedule, block);
                    self.ghash.update_block(block);
                    self.staging.extend_from_slice(&block[..]);
                    Ok(())
                })?;
            }
            Direction::Decrypt => {
                reserve(&mut self.staging, input.len())?;
                self.staging.extend_from_slice(input);
            }
        }
        Ok(())
    }

    pub(crate) fn finalize(
        &mut self,
        schedule: &AesKeySchedule,
        direction: Direction,
        remainder: &mut BlockBuffer,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        match direction {
            Direction::Encrypt => self.finalize_encrypt(schedule, remainder, out),
            Direction::Decrypt => self.finalize_decrypt(schedule, out),
        }
    }

    fn finalize_encrypt(
        &mut self,
        schedule: &AesKeySchedule,
        remainder: &mut BlockBuffer,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        if remainder.len() > 0 {
            let start = self.staging.len();
            reserve(&mut self.staging, remainder.len())?;
            self.staging.extend_from_slice(remainder.as_slice());
            remainder.clear();

            let tail = &mut self.staging[start..];
            self.keystream.apply(schedule, tail);
            self.ghash.update_padded(tail);
        }

        let tag = self.compute_tag(self.staging.len());
        out.write(&self.staging)?;
        out.write(&tag[..self.tag_len])
    }

    fn finalize_decrypt(
        &mut self,
        schedule: &AesKeySchedule,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        let ct_len = self
            .staging
            .len()
            .checked_sub(self.tag_len)
            .ok_or(AesEngineError::EncryptedDataLenRange)?;

        self.ghash.update_padded(&self.staging[..ct_len]);
        let tag = self.compute_tag(ct_len);

        let (ciphertext, received) = self.staging.split_at_mut(ct_len);
        if !bool::from(tag[..self.tag_len].ct_eq(received)) {
            tracing::debug!("GCM tag verification failed");
            return Err(AesEngineError::InvalidMac);
        }

        self.keystream.apply(schedule, ciphertext);
        out.write(ciphertext)
    }

    fn compute_tag(&mut self, text_len: usize) -> [u8; AES_BLOCK_LEN] {
        let mut tag = self.ghash.finish(self.aad_len, text_len);
        xor_block(&mut tag, &self.tag_mask);
        tag
    }
}
