// Copyright (C) Microsoft Corporation. All rights reserved.

//! Single-call AES operations.
//!
//! Each entry point builds a transient operation context, runs init, update
//! and finalize against it, and drops it before returning, whatever the
//! outcome. The context never escapes the call, so atomic operations are
//! safe to run concurrently, including over a shared key schedule template.

use subtle::ConstantTimeEq;

use super::*;

/// Encrypts `input` in a single call.
///
/// # Arguments
///
/// * `mechanism` - Mode and parameters
/// * `key` - Raw AES key; ignored when `template` is supplied
/// * `template` - Optional pre-expanded key schedule
/// * `input` - Plaintext
/// * `output` - Ciphertext buffer. If `None`, only calculates required size.
///
/// # Returns
///
/// The number of bytes written, or the required size if `output` is `None`.
///
/// # Errors
///
/// * [`AesEngineError::DataLenRange`] - ECB or CBC input is not block aligned
/// * [`AesEngineError::BufferTooSmall`] - `output` cannot hold the result
/// * [`AesEngineError::ArgumentsBad`] - GMAC was given plaintext
/// * Mechanism and key errors from operation init
pub fn encrypt_atomic(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    input: &CryptoData<'_>,
    output: Option<&mut CryptoDataMut<'_>>,
) -> Result<usize, AesEngineError> {
    run_atomic(mechanism, key, template, Direction::Encrypt, input, output)
}

/// Decrypts `input` in a single call.
///
/// Authenticated modes verify the tag before any plaintext is written.
///
/// # Errors
///
/// * [`AesEngineError::EncryptedDataLenRange`] - ECB or CBC input is not
///   block aligned, or AEAD input is shorter than its tag
/// * [`AesEngineError::InvalidMac`] - CCM, GCM or GMAC tag mismatch
/// * [`AesEngineError::MechanismInvalid`] - the mechanism cannot decrypt
pub fn decrypt_atomic(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    input: &CryptoData<'_>,
    output: Option<&mut CryptoDataMut<'_>>,
) -> Result<usize, AesEngineError> {
    run_atomic(mechanism, key, template, Direction::Decrypt, input, output)
}

/// Encrypts the first `len` bytes of `data` in place.
///
/// The whole of `data` is available for output, so authenticated modes need
/// room past `len` for the tag.
pub fn encrypt_atomic_in_place(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    data: &mut CryptoDataMut<'_>,
    len: usize,
) -> Result<usize, AesEngineError> {
    let input = data.read_prefix(len)?;
    encrypt_atomic(mechanism, key, template, &CryptoData::raw(&input), Some(data))
}

/// Decrypts the first `len` bytes of `data` in place.
pub fn decrypt_atomic_in_place(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    data: &mut CryptoDataMut<'_>,
    len: usize,
) -> Result<usize, AesEngineError> {
    let input = data.read_prefix(len)?;
    decrypt_atomic(mechanism, key, template, &CryptoData::raw(&input), Some(data))
}

/// Computes a CMAC or GMAC over `data`.
///
/// GMAC authenticates `data` as the associated data of a GCM encryption with
/// no plaintext; `data` must then be contiguous.
///
/// # Errors
///
/// * [`AesEngineError::MechanismInvalid`] - the mechanism is not CMAC or GMAC
/// * [`AesEngineError::ArgumentsBad`] - GMAC data is not contiguous
pub fn mac_atomic(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    data: &CryptoData<'_>,
    mac: Option<&mut CryptoDataMut<'_>>,
) -> Result<usize, AesEngineError> {
    if !mechanism.mode().supports_mac() {
        return Err(AesEngineError::MechanismInvalid);
    }

    if mechanism.mode() == AesMode::Gmac {
        let gcm = mechanism.gmac_as_gcm(data)?;
        return encrypt_atomic(&gcm, key, template, &CryptoData::raw(&[]), mac);
    }
    encrypt_atomic(mechanism, key, template, data, mac)
}

/// Verifies a CMAC or GMAC over `data` against `mac`.
///
/// # Errors
///
/// * [`AesEngineError::InvalidMac`] - `mac` does not match; which bytes
///   differ is not revealed
/// * [`AesEngineError::MechanismInvalid`] - the mechanism is not CMAC or GMAC
pub fn mac_verify_atomic(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    data: &CryptoData<'_>,
    mac: &CryptoData<'_>,
) -> Result<(), AesEngineError> {
    if !mechanism.mode().supports_mac() {
        return Err(AesEngineError::MechanismInvalid);
    }

    if mechanism.mode() == AesMode::Gmac {
        let gcm = mechanism.gmac_as_gcm(data)?;
        if mac.len() != AES_GMAC_TAG_BITS / 8 {
            return Err(AesEngineError::InvalidMac);
        }
        decrypt_atomic(&gcm, key, template, mac, Some(&mut CryptoDataMut::raw(&mut [])))?;
        return Ok(());
    }

    let mut computed = Zeroizing::new([0u8; AES_BLOCK_LEN]);
    encrypt_atomic(
        mechanism,
        key,
        template,
        data,
        Some(&mut CryptoDataMut::raw(&mut computed[..])),
    )?;

    let received = mac.to_zeroizing_vec()?;
    if !bool::from(computed[..].ct_eq(&received[..])) {
        tracing::debug!("CMAC verification failed");
        return Err(AesEngineError::InvalidMac);
    }
    Ok(())
}

fn run_atomic(
    mechanism: &AesMechanism,
    key: &AesKey,
    template: Option<&AesKeySchedule>,
    direction: Direction,
    input: &CryptoData<'_>,
    output: Option<&mut CryptoDataMut<'_>>,
) -> Result<usize, AesEngineError> {
    check_alignment(mechanism.mode(), direction, input.len())?;

    let mut ctx = ModeContext::init(mechanism, key, template, direction)?;
    run_context(&mut ctx, input, output)
}

/// ECB and CBC take whole blocks only when the complete input is known.
pub(crate) fn check_alignment(
    mode: AesMode,
    direction: Direction,
    input_len: usize,
) -> Result<(), AesEngineError> {
    if mode.requires_block_alignment() && !input_len.is_multiple_of(AES_BLOCK_LEN) {
        return Err(match direction {
            Direction::Encrypt => AesEngineError::DataLenRange,
            Direction::Decrypt => AesEngineError::EncryptedDataLenRange,
        });
    }
    Ok(())
}

/// Runs a context that has seen no input over the whole of `input`.
pub(crate) fn run_context(
    ctx: &mut ModeContext<'_>,
    input: &CryptoData<'_>,
    output: Option<&mut CryptoDataMut<'_>>,
) -> Result<usize, AesEngineError> {
    let required = ctx.atomic_output_len(input.len())?;
    let Some(output) = output else {
        return Ok(required);
    };
    if output.capacity() < required {
        return Err(AesEngineError::BufferTooSmall { required });
    }

    let mut writer = DataWriter::new(output)?;
    ctx.absorb(input, &mut writer)?;
    ctx.finalize(&mut writer)?;
    Ok(writer.written())
}
