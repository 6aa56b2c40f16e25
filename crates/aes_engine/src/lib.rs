// Copyright (C) Microsoft Corporation. All rights reserved.

//! AES mode engine for HSM block-cipher operations.
//!
//! This crate implements the AES block cipher under seven modes of operation
//! behind a single engine:
//!
//! - **ECB / CBC**: block-aligned confidentiality modes
//! - **CTR**: counter mode with a configurable counter width
//! - **CMAC**: block-cipher based message authentication
//! - **CCM / GCM**: authenticated encryption with associated data
//! - **GMAC**: GCM authentication over associated data only
//!
//! Every mode is available through two calling conventions:
//!
//! - **Streaming**: `*_init`, any number of `update` calls, then `finish`
//! - **Atomic**: a single call processing the complete input
//!
//! # Output Sizing
//!
//! Every operation accepts an optional output. Passing `None` returns the
//! exact number of bytes a subsequent call will write without touching any
//! operation state. An undersized output fails with
//! [`AesEngineError::BufferTooSmall`], leaving a streaming context intact so
//! the call can be retried.
//!
//! # Key Material
//!
//! Expanded key schedules, partial blocks, counters, authentication
//! accumulators and staged plaintext are zeroized when the owning context is
//! dropped, on success and failure paths alike.

mod algo;
mod atomic;
mod context;
mod data;
mod key;
mod mechanism;
mod modes;
mod op;
mod schedule;
mod session;
mod traits;

pub use algo::*;
pub use atomic::*;
pub use data::*;
pub use key::*;
pub use mechanism::*;
pub use op::*;
pub use schedule::*;
use thiserror::Error;
pub use traits::*;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;
use zeroize::Zeroizing;

pub(crate) use context::*;
pub(crate) use modes::*;
pub(crate) use session::*;

/// AES block size in bytes, independent of key size.
pub const AES_BLOCK_LEN: usize = 16;

/// Comprehensive error type for AES engine operations.
///
/// Only [`AesEngineError::BufferTooSmall`] is recoverable: a streaming
/// context that reports it keeps its state and accepts a retry. Every other
/// error releases the operation context before it is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesEngineError {
    /// Output buffer cannot hold the produced data.
    #[error("output buffer too small, {required} bytes required")]
    BufferTooSmall {
        /// Number of bytes the operation needs to write.
        required: usize,
    },
    /// Plaintext length is invalid for the mode.
    #[error("data length out of range")]
    DataLenRange,
    /// Ciphertext length is invalid for the mode.
    #[error("encrypted data length out of range")]
    EncryptedDataLenRange,
    /// Mechanism is not supported for the requested operation.
    #[error("mechanism invalid for this operation")]
    MechanismInvalid,
    /// Mechanism parameter is missing, malformed or out of range.
    #[error("mechanism parameter invalid")]
    MechanismParamInvalid,
    /// Key is not a raw AES key.
    #[error("key type inconsistent with mechanism")]
    KeyTypeInconsistent,
    /// Key length is not 128, 192 or 256 bits.
    #[error("key size out of range")]
    KeySizeRange,
    /// Buffer shape or argument combination is malformed.
    #[error("bad arguments")]
    ArgumentsBad,
    /// Authentication tag or MAC does not match.
    #[error("MAC verification failed")]
    InvalidMac,
    /// Memory for operation state could not be allocated.
    #[error("host memory allocation failed")]
    HostMemory,
    /// Streaming context was already finalized or torn down.
    #[error("operation context already finalized")]
    ContextFinalized,
}

impl AesEngineError {
    /// Returns `true` when the operation may be retried on the same context.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BufferTooSmall { .. })
    }
}

#[cfg(test)]
mod tests;
