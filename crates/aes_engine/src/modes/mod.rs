// Copyright (C) Microsoft Corporation. All rights reserved.

//! AES modes of operation.
//!
//! Each mode supplies three things: the bytes an update or finalize will
//! emit, the per-block transform applied as input arrives, and the
//! finalize step. [`ModeState`] dispatches over the seven modes with a
//! closed `match`; the length functions are pure and are consulted before
//! any state is mutated.

mod cbc;
mod ccm;
mod cmac;
mod ctr;
mod ecb;
mod gcm;
mod ghash;

pub(crate) use cbc::*;
pub(crate) use ccm::*;
pub(crate) use cmac::*;
pub(crate) use ctr::*;
pub(crate) use ecb::*;
pub(crate) use gcm::*;
pub(crate) use ghash::*;

use super::*;

/// Direction of a cipher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Encrypt,
    Decrypt,
}

/// Mode-specific operation state.
pub(crate) enum ModeState {
    Ecb,
    Cbc(CbcState),
    Ctr(CtrState),
    Cmac(CmacState),
    Ccm(CcmState),
    Gcm(GcmState),
    Gmac(GcmState),
}

impl ModeState {
    /// Builds the state for a validated mechanism.
    pub(crate) fn new(
        mechanism: &AesMechanism,
        schedule: &AesKeySchedule,
        direction: Direction,
    ) -> Result<Self, AesEngineError> {
        let state = match mechanism {
            AesMechanism::Ecb => Self::Ecb,
            AesMechanism::Cbc { iv } => Self::Cbc(CbcState::new(iv)?),
            AesMechanism::Ctr(params) => Self::Ctr(CtrState::new(params)),
            AesMechanism::Cmac => Self::Cmac(CmacState::new(schedule)),
            AesMechanism::Ccm(params) => Self::Ccm(CcmState::new(schedule, params, direction)?),
            AesMechanism::Gcm(params) => Self::Gcm(GcmState::new(
                schedule,
                &params.iv,
                &params.aad,
                params.tag_len(),
            )),
            AesMechanism::Gmac(params) => Self::Gmac(GcmState::new(
                schedule,
                &params.iv,
                &params.aad,
                AES_GMAC_TAG_BITS / 8,
            )),
        };
        Ok(state)
    }

    pub(crate) fn mode(&self) -> AesMode {
        match self {
            Self::Ecb => AesMode::Ecb,
            Self::Cbc(_) => AesMode::Cbc,
            Self::Ctr(_) => AesMode::Ctr,
            Self::Cmac(_) => AesMode::Cmac,
            Self::Ccm(_) => AesMode::Ccm,
            Self::Gcm(_) => AesMode::Gcm,
            Self::Gmac(_) => AesMode::Gmac,
        }
    }

    /// Rejects input the mode cannot accept, without mutating state.
    pub(crate) fn check_absorb(&self, direction: Direction, input_len: usize) -> Result<(), AesEngineError> {
        match (self, direction) {
            (Self::Ccm(state), _) => state.check_absorb(direction, input_len),
            (Self::Gmac(_), Direction::Encrypt) if input_len > 0 => Err(AesEngineError::ArgumentsBad),
            (Self::Gmac(state), Direction::Decrypt)
                if input_len > state.tag_len() - state.staged_len() =>
            {
                Err(AesEngineError::ArgumentsBad)
            }
            _ => Ok(()),
        }
    }

    /// Bytes an update with `input_len` bytes will emit.
    pub(crate) fn update_output_len(&self, remainder: &BlockBuffer, input_len: usize) -> usize {
        match self {
            Self::Ecb | Self::Cbc(_) => remainder.emitted_len(input_len),
            Self::Ctr(_) => input_len,
            Self::Cmac(_) | Self::Ccm(_) | Self::Gcm(_) | Self::Gmac(_) => 0,
        }
    }

    /// Bytes finalize will emit.
    pub(crate) fn final_output_len(&self, direction: Direction, remainder: &BlockBuffer) -> usize {
        match (self, direction) {
            (Self::Ecb | Self::Cbc(_) | Self::Ctr(_), _) => 0,
            (Self::Cmac(_), _) => AES_BLOCK_LEN,
            (Self::Ccm(state), Direction::Encrypt) => {
                state.staged_len() + remainder.len() + state.mac_len()
            }
            (Self::Ccm(state), Direction::Decrypt) => state.payload_len(),
            (Self::Gcm(state) | Self::Gmac(state), Direction::Encrypt) => {
                state.staged_len() + remainder.len() + state.tag_len()
            }
            (Self::Gcm(state) | Self::Gmac(state), Direction::Decrypt) => {
                state.staged_len().saturating_sub(state.tag_len())
            }
        }
    }

    /// Bytes a single-call operation over `input_len` bytes will emit.
    pub(crate) fn atomic_output_len(
        &self,
        direction: Direction,
        input_len: usize,
    ) -> Result<usize, AesEngineError> {
        let len = match (self, direction) {
            (Self::Ecb | Self::Cbc(_) | Self::Ctr(_), _) => input_len,
            (Self::Cmac(_), _) => AES_BLOCK_LEN,
            (Self::Ccm(state), Direction::Encrypt) => input_len + state.mac_len(),
            (Self::Ccm(state), Direction::Decrypt) => state.payload_len(),
            (Self::Gcm(state), Direction::Encrypt) => input_len + state.tag_len(),
            (Self::Gcm(state), Direction::Decrypt) => input_len
                .checked_sub(state.tag_len())
                .ok_or(AesEngineError::EncryptedDataLenRange)?,
            (Self::Gmac(state), Direction::Encrypt) => {
                if input_len != 0 {
                    Err(AesEngineError::ArgumentsBad)?;
                }
                state.tag_len()
            }
            (Self::Gmac(state), Direction::Decrypt) => {
                if input_len > state.tag_len() {
                    Err(AesEngineError::ArgumentsBad)?;
                }
                if input_len < state.tag_len() {
                    Err(AesEngineError::EncryptedDataLenRange)?;
                }
                0
            }
        };
        Ok(len)
    }

    /// Runs the mode over `input`, writing whatever it emits to `out`.
    pub(crate) fn absorb(
        &mut self,
        schedule: &AesKeySchedule,
        direction: Direction,
        remainder: &mut BlockBuffer,
        input: &[u8],
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        match self {
            Self::Ecb => remainder.feed(input, |block| {
                ecb_block(schedule, direction, block);
                out.write(&block[..])
            }),
            Self::Cbc(state) => remainder.feed(input, |block| {
                state.process_block(schedule, direction, block);
                out.write(&block[..])
            }),
            Self::Ctr(state) => state.absorb(schedule, input, out),
            Self::Cmac(state) => state.absorb(schedule, remainder, input),
            Self::Ccm(state) => state.absorb(schedule, direction, remainder, input),
            Self::Gcm(state) | Self::Gmac(state) => state.absorb(schedule, direction, remainder, input),
        }
    }

    /// Completes the operation, writing the trailing output to `out`.
    pub(crate) fn finalize(
        &mut self,
        schedule: &AesKeySchedule,
        direction: Direction,
        remainder: &mut BlockBuffer,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        match self {
            Self::Ecb | Self::Cbc(_) => match (remainder.len(), direction) {
                (0, _) => Ok(()),
                (_, Direction::Encrypt) => Err(AesEngineError::DataLenRange),
                (_, Direction::Decrypt) => Err(AesEngineError::EncryptedDataLenRange),
            },
            Self::Ctr(_) => Ok(()),
            Self::Cmac(state) => state.finalize(schedule, remainder, out),
            Self::Ccm(state) => state.finalize(schedule, direction, remainder, out),
            Self::Gcm(state) | Self::Gmac(state) => state.finalize(schedule, direction, remainder, out),
        }
    }
}

pub(crate) fn xor_block(dst: &mut [u8; AES_BLOCK_LEN], src: &[u8; AES_BLOCK_LEN]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// Makes room for `additional` more bytes in `buf`, reporting allocation
/// failure.
///
/// Growth never goes through `realloc`: the contents move to a fresh
/// allocation and the old one is zeroized before it is freed.
pub(crate) fn reserve(buf: &mut Vec<u8>, additional: usize) -> Result<(), AesEngineError> {
    let needed = buf
        .len()
        .checked_add(additional)
        .ok_or(AesEngineError::HostMemory)?;
    if needed <= buf.capacity() {
        return Ok(());
    }

    let mut grown = Vec::new();
    grown
        .try_reserve_exact(needed.max(buf.capacity().saturating_mul(2)))
        .map_err(|_| AesEngineError::HostMemory)?;
    grown.extend_from_slice(buf);

    let mut old = std::mem::replace(buf, grown);
    old.zeroize();
    Ok(())
}
