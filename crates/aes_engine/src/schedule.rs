// Copyright (C) Microsoft Corporation. All rights reserved.

//! Expanded AES key schedules.
//!
//! [`AesKeySchedule`] is the single-block primitive every mode is built on.
//! Block operations take `&self`, so one schedule can be shared read-only by
//! any number of operation contexts, on any number of threads, as a
//! pre-expanded template.

use aes::cipher::BlockDecrypt;
use aes::cipher::BlockEncrypt;
use aes::cipher::KeyInit;
use aes::Aes128;
use aes::Aes192;
use aes::Aes256;
use aes::Block;

use super::*;

/// Expanded AES key schedule for a 128, 192 or 256-bit key.
///
/// # Security
///
/// Round keys are zeroized when the schedule is dropped.
#[derive(Clone)]
pub enum AesKeySchedule {
    /// AES-128 round keys.
    Aes128(Aes128),
    /// AES-192 round keys.
    Aes192(Aes192),
    /// AES-256 round keys.
    Aes256(Aes256),
}

impl AesKeySchedule {
    /// Expands a key schedule from a raw AES key.
    ///
    /// # Errors
    ///
    /// * [`AesEngineError::KeyTypeInconsistent`] - the key is not in raw format
    /// * [`AesEngineError::KeySizeRange`] - the key is not 128, 192 or 256 bits,
    ///   or its material does not match the declared length
    pub fn new(key: &AesKey) -> Result<Self, AesEngineError> {
        if key.format() != KeyFormat::Raw {
            return Err(AesEngineError::KeyTypeInconsistent);
        }

        let bytes = key.bytes();
        if bytes.len() * 8 != key.bits() {
            return Err(AesEngineError::KeySizeRange);
        }

        let schedule = match key.bits() {
            128 => Aes128::new_from_slice(bytes).map(Self::Aes128),
            192 => Aes192::new_from_slice(bytes).map(Self::Aes192),
            256 => Aes256::new_from_slice(bytes).map(Self::Aes256),
            _ => return Err(AesEngineError::KeySizeRange),
        };

        schedule.map_err(|_| AesEngineError::KeySizeRange)
    }

    /// Pre-expands a key schedule to be shared by operations on `mechanism`.
    ///
    /// The mechanism parameters are not inspected; any of the seven AES
    /// mechanisms accepts a template.
    pub fn create_template(mechanism: &AesMechanism, key: &AesKey) -> Result<Self, AesEngineError> {
        let schedule = Self::new(key)?;
        tracing::debug!(mode = ?mechanism.mode(), key_bits = schedule.key_bits(), "Created key schedule template");
        Ok(schedule)
    }

    /// Returns the key length in bits.
    pub fn key_bits(&self) -> usize {
        match self {
            Self::Aes128(_) => 128,
            Self::Aes192(_) => 192,
            Self::Aes256(_) => 256,
        }
    }

    pub(crate) fn encrypt_block(&self, block: &mut [u8; AES_BLOCK_LEN]) {
        let mut aes_block = Block::from(*block);
        match self {
            Self::Aes128(cipher) => cipher.encrypt_block(&mut aes_block),
            Self::Aes192(cipher) => cipher.encrypt_block(&mut aes_block),
            Self::Aes256(cipher) => cipher.encrypt_block(&mut aes_block),
        }
        block.copy_from_slice(&aes_block);
        aes_block.as_mut_slice().zeroize();
    }

    pub(crate) fn decrypt_block(&self, block: &mut [u8; AES_BLOCK_LEN]) {
        let mut aes_block = Block::from(*block);
        match self {
            Self::Aes128(cipher) => cipher.decrypt_block(&mut aes_block),
            Self::Aes192(cipher) => cipher.decrypt_block(&mut aes_block),
            Self::Aes256(cipher) => cipher.decrypt_block(&mut aes_block),
        }
        block.copy_from_slice(&aes_block);
        aes_block.as_mut_slice().zeroize();
    }
}

impl std::fmt::Debug for AesKeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesKeySchedule")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

/// Key schedule held by an operation context.
///
/// A context either expands and owns its schedule, or borrows a caller's
/// template. Only an owned schedule is released (and zeroized) with the
/// context; a borrowed template outlives every context referencing it.
pub(crate) enum KeyScheduleSlot<'t> {
    Owned(Box<AesKeySchedule>),
    Shared(&'t AesKeySchedule),
}

impl<'t> KeyScheduleSlot<'t> {
    pub(crate) fn new(key: &AesKey, template: Option<&'t AesKeySchedule>) -> Result<Self, AesEngineError> {
        match template {
            Some(template) => Ok(Self::Shared(template)),
            None => Ok(Self::Owned(Box::new(AesKeySchedule::new(key)?))),
        }
    }

    pub(crate) fn owns_key_schedule(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl std::ops::Deref for KeyScheduleSlot<'_> {
    type Target = AesKeySchedule;

    fn deref(&self) -> &AesKeySchedule {
        match self {
            Self::Owned(schedule) => schedule,
            Self::Shared(schedule) => schedule,
        }
    }
}
