// Copyright (C) Microsoft Corporation. All rights reserved.

//! CCM (NIST SP 800-38C).
//!
//! The CBC-MAC runs over the formatted block `B0`, the length-prefixed
//! associated data and the payload; the payload is encrypted with a counter
//! keystream starting at `A1`, and `E(K, A0)` masks the MAC.
//!
//! Payload and associated-data lengths are declared up front in `B0`, so a
//! stream that ends short of or runs past the declared payload length fails.
//! Decryption stages the recovered plaintext and releases it only once the
//! received MAC has been verified.

use subtle::ConstantTimeEq;

use super::*;

/// CCM running state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CcmState {
    mac_len: usize,
    payload_len: usize,
    processed_data_len: usize,
    processed_mac_len: usize,
    mac: [u8; AES_BLOCK_LEN],
    tag_mask: [u8; AES_BLOCK_LEN],
    keystream: Keystream,
    staging: Vec<u8>,
    received_mac: Vec<u8>,
}

impl CcmState {
    pub(crate) fn new(
        schedule: &AesKeySchedule,
        params: &CcmParams,
        direction: Direction,
    ) -> Result<Self, AesEngineError> {
        let q = params.length_field_len();
        let payload_len = params.payload_len(direction);
        let nonce = &params.nonce;

        let mut b0 = [0u8; AES_BLOCK_LEN];
        b0[0] = (((params.mac_len - 2) / 2) << 3 | (q - 1)) as u8;
        if !params.aad.is_empty() {
            b0[0] |= 0x40;
        }
        b0[1..=nonce.len()].copy_from_slice(nonce);
        b0[AES_BLOCK_LEN - q..].copy_from_slice(&(payload_len as u64).to_be_bytes()[8 - q..]);

        let mut mac = b0;
        schedule.encrypt_block(&mut mac);
        cbc_mac_padded(schedule, &mut mac, &encode_aad(&params.aad)?);

        let mut a0 = [0u8; AES_BLOCK_LEN];
        a0[0] = (q - 1) as u8;
        a0[1..=nonce.len()].copy_from_slice(nonce);

        // the first keystream block, E(K, A0), masks the MAC
        let mut keystream = Keystream::new(a0, (8 * q) as u32);
        let mut tag_mask = [0u8; AES_BLOCK_LEN];
        keystream.apply(schedule, &mut tag_mask);

        let mut staging = Vec::new();
        if direction == Direction::Decrypt {
            staging
                .try_reserve_exact(payload_len)
                .map_err(|_| AesEngineError::HostMemory)?;
        }

        Ok(Self {
            mac_len: params.mac_len,
            payload_len,
            processed_data_len: 0,
            processed_mac_len: 0,
            mac,
            tag_mask,
            keystream,
            staging,
            received_mac: Vec::with_capacity(params.mac_len),
        })
    }

    pub(crate) fn mac_len(&self) -> usize {
        self.mac_len
    }

    pub(crate) fn payload_len(&self) -> usize {
        self.payload_len
    }

    pub(crate) fn staged_len(&self) -> usize {
        self.staging.len()
    }

    /// Rejects input that would run past the declared lengths.
    pub(crate) fn check_absorb(&self, direction: Direction, input_len: usize) -> Result<(), AesEngineError> {
        match direction {
            Direction::Encrypt => {
                if input_len > self.payload_len - self.processed_data_len {
                    Err(AesEngineError::DataLenRange)?;
                }
            }
            Direction::Decrypt => {
                let expected = self.payload_len + self.mac_len;
                let received = self.processed_data_len + self.processed_mac_len;
                if input_len > expected - received {
                    Err(AesEngineError::EncryptedDataLenRange)?;
                }
            }
        }
        Ok(())
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
                    xor_block(&mut self.mac, block);
                    schedule.encrypt_block(&mut self.mac);
                    self.keystream.apply(schedule, block);
                    self.staging.extend_from_slice(&block[..]);
                    Ok(())
                })?;
                self.processed_data_len += input.len();
            }
            Direction::Decrypt => {
                let data_len = (self.payload_len - self.processed_data_len).min(input.len());
                let (data, mac) = input.split_at(data_len);

                let start = self.staging.len();
                self.staging.extend_from_slice(data);
                self.keystream.apply(schedule, &mut self.staging[start..]);
                self.processed_data_len += data.len();

                self.received_mac.extend_from_slice(mac);
                self.processed_mac_len += mac.len();
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
        if self.processed_data_len != self.payload_len {
            return Err(AesEngineError::DataLenRange);
        }

        if remainder.len() > 0 {
            cbc_mac_padded(schedule, &mut self.mac, remainder.as_slice());

            let start = self.staging.len();
            reserve(&mut self.staging, remainder.len())?;
            self.staging.extend_from_slice(remainder.as_slice());
            remainder.clear();
            self.keystream.apply(schedule, &mut self.staging[start..]);
        }

        let mut tag = self.mac;
        xor_block(&mut tag, &self.tag_mask);
        out.write(&self.staging)?;
        out.write(&tag[..self.mac_len])
    }

    fn finalize_decrypt(
        &mut self,
        schedule: &AesKeySchedule,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        if self.processed_data_len != self.payload_len || self.processed_mac_len != self.mac_len {
            return Err(AesEngineError::EncryptedDataLenRange);
        }

        cbc_mac_padded(schedule, &mut self.mac, &self.staging);
        let mut tag = self.mac;
        xor_block(&mut tag, &self.tag_mask);

        if !bool::from(tag[..self.mac_len].ct_eq(&self.received_mac)) {
            tracing::debug!("CCM MAC verification failed");
            return Err(AesEngineError::InvalidMac);
        }

        out.write(&self.staging)
    }
}

/// Runs the CBC-MAC over `data`, zero-padding the final partial block.
fn cbc_mac_padded(schedule: &AesKeySchedule, mac: &mut [u8; AES_BLOCK_LEN], data: &[u8]) {
    for chunk in data.chunks(AES_BLOCK_LEN) {
        for (m, b) in mac.iter_mut().zip(chunk) {
            *m ^= b;
        }
        schedule.encrypt_block(mac);
    }
}

/// Prefixes associated data with its encoded length.
fn encode_aad(aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, AesEngineError> {
    let mut encoded = Zeroizing::new(Vec::new());
    if aad.is_empty() {
        return Ok(encoded);
    }

    reserve(&mut encoded, aad.len() + 10)?;
    let len = aad.len() as u64;
    if len < 0xff00 {
        encoded.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u64::from(u32::MAX) {
        encoded.extend_from_slice(&[0xff, 0xfe]);
        encoded.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        encoded.extend_from_slice(&[0xff, 0xff]);
        encoded.extend_from_slice(&len.to_be_bytes());
    }
    encoded.extend_from_slice(aad);
    Ok(encoded)
}
