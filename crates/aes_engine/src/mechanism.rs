// Copyright (C) Microsoft Corporation. All rights reserved.

//! AES mechanisms and their parameters.
//!
//! A mechanism names a mode of operation together with the parameters that
//! mode needs. Parameters are validated when an operation is initialized;
//! invalid parameters fail with [`AesEngineError::MechanismParamInvalid`]
//! before any key material is expanded.

use super::*;

/// Length of the GMAC initialization vector in bytes.
pub const AES_GMAC_IV_LEN: usize = 12;

/// Length of the GMAC tag in bits.
pub const AES_GMAC_TAG_BITS: usize = 128;

/// GCM tag lengths accepted, in bits.
const GCM_TAG_BITS: [usize; 7] = [32, 64, 96, 104, 112, 120, 128];

/// AES mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesMode {
    /// Electronic codebook.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Counter mode.
    Ctr,
    /// Cipher-based message authentication code.
    Cmac,
    /// Counter with CBC-MAC.
    Ccm,
    /// Galois/counter mode.
    Gcm,
    /// Galois message authentication code.
    Gmac,
}

impl AesMode {
    /// Returns `true` if input must be a whole number of blocks.
    pub fn requires_block_alignment(&self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc)
    }

    /// Returns `true` if the mode can decrypt.
    pub fn supports_decrypt(&self) -> bool {
        !matches!(self, Self::Cmac)
    }

    /// Returns `true` if the mode can produce a standalone MAC.
    pub fn supports_mac(&self) -> bool {
        matches!(self, Self::Cmac | Self::Gmac)
    }
}

/// CTR mode parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtrParams {
    /// Number of low-order bits of `counter_block` that form the counter (1..=128).
    pub counter_bits: u32,
    /// Initial counter block.
    pub counter_block: [u8; AES_BLOCK_LEN],
}

/// CCM mode parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcmParams {
    /// MAC length in bytes: 4, 6, 8, 10, 12, 14 or 16.
    pub mac_len: usize,
    /// Nonce of 7 to 13 bytes.
    pub nonce: Vec<u8>,
    /// Associated data.
    pub aad: Vec<u8>,
    /// Payload length. For decryption this is the ciphertext length
    /// including the trailing MAC.
    pub data_len: usize,
}

/// GCM mode parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmParams {
    /// Initialization vector, at least one byte.
    pub iv: Vec<u8>,
    /// Associated data.
    pub aad: Vec<u8>,
    /// Tag length in bits: 32, 64, 96, 104, 112, 120 or 128.
    pub tag_bits: usize,
}

/// GMAC parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmacParams {
    /// Initialization vector of [`AES_GMAC_IV_LEN`] bytes.
    pub iv: Vec<u8>,
    /// Data to authenticate when used as a cipher mechanism.
    pub aad: Vec<u8>,
}

/// AES mechanism: a mode of operation and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AesMechanism {
    /// ECB, no parameters.
    Ecb,
    /// CBC with a 16-byte initialization vector.
    Cbc {
        /// Initialization vector.
        iv: Vec<u8>,
    },
    /// CTR mode.
    Ctr(CtrParams),
    /// CMAC, no parameters.
    Cmac,
    /// CCM mode.
    Ccm(CcmParams),
    /// GCM mode.
    Gcm(GcmParams),
    /// GMAC.
    Gmac(GmacParams),
}

impl AesMechanism {
    /// Returns the mode of operation.
    pub fn mode(&self) -> AesMode {
        match self {
            Self::Ecb => AesMode::Ecb,
            Self::Cbc { .. } => AesMode::Cbc,
            Self::Ctr(_) => AesMode::Ctr,
            Self::Cmac => AesMode::Cmac,
            Self::Ccm(_) => AesMode::Ccm,
            Self::Gcm(_) => AesMode::Gcm,
            Self::Gmac(_) => AesMode::Gmac,
        }
    }

    /// Checks the mechanism parameters without touching key material.
    pub(crate) fn validate(&self, direction: Direction) -> Result<(), AesEngineError> {
        match self {
            Self::Ecb | Self::Cmac => Ok(()),
            Self::Cbc { iv } => check(iv.len() == AES_BLOCK_LEN),
            Self::Ctr(params) => check((1..=128).contains(&params.counter_bits)),
            Self::Ccm(params) => params.validate(direction),
            Self::Gcm(params) => params.validate(),
            Self::Gmac(params) => check(params.iv.len() == AES_GMAC_IV_LEN),
        }
    }

    /// Re-expresses a GMAC mechanism as GCM over `aad` with no plaintext.
    ///
    /// The GCM parameter block is built fresh: a fixed [`AES_GMAC_IV_LEN`]-byte
    /// IV and a fixed [`AES_GMAC_TAG_BITS`]-bit tag.
    ///
    /// # Errors
    ///
    /// * [`AesEngineError::MechanismInvalid`] - the mechanism is not GMAC
    /// * [`AesEngineError::MechanismParamInvalid`] - the IV has the wrong length
    /// * [`AesEngineError::ArgumentsBad`] - `aad` is not contiguous
    pub(crate) fn gmac_as_gcm(&self, aad: &CryptoData<'_>) -> Result<AesMechanism, AesEngineError> {
        let Self::Gmac(params) = self else {
            return Err(AesEngineError::MechanismInvalid);
        };
        check(params.iv.len() == AES_GMAC_IV_LEN)?;
        let aad = aad.as_contiguous()?;

        Ok(Self::Gcm(GcmParams {
            iv: params.iv.clone(),
            aad: aad.to_vec(),
            tag_bits: AES_GMAC_TAG_BITS,
        }))
    }
}

impl CcmParams {
    /// Payload length excluding the MAC.
    pub(crate) fn payload_len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Encrypt => self.data_len,
            Direction::Decrypt => self.data_len.saturating_sub(self.mac_len),
        }
    }

    /// Width of the length field, `15 - nonce_len`.
    pub(crate) fn length_field_len(&self) -> usize {
        AES_BLOCK_LEN - 1 - self.nonce.len()
    }

    fn validate(&self, direction: Direction) -> Result<(), AesEngineError> {
        check((4..=16).contains(&self.mac_len) && self.mac_len.is_multiple_of(2))?;
        check((7..=13).contains(&self.nonce.len()))?;
        if direction == Direction::Decrypt {
            check(self.data_len >= self.mac_len)?;
        }

        let q = self.length_field_len();
        let payload_len = self.payload_len(direction) as u64;
        check(q >= 8 || payload_len < 1u64 << (8 * q))
    }
}

impl GcmParams {
    /// Tag length in bytes.
    pub(crate) fn tag_len(&self) -> usize {
        self.tag_bits / 8
    }

    fn validate(&self) -> Result<(), AesEngineError> {
        check(!self.iv.is_empty())?;
        check(GCM_TAG_BITS.contains(&self.tag_bits))
    }
}

fn check(valid: bool) -> Result<(), AesEngineError> {
    if valid {
        Ok(())
    } else {
        Err(AesEngineError::MechanismParamInvalid)
    }
}
