// Copyright (C) Microsoft Corporation. All rights reserved.

//! MAC verification wrapper.

use super::*;

/// MAC verification wrapper.
pub struct Verifier;

impl Verifier {
    /// Verifies a MAC in a single operation.
    ///
    /// # Errors
    ///
    /// Returns [`AesEngineError::InvalidMac`] if `mac` does not match `data`.
    pub fn verify<Algo: VerifyOp>(
        algo: &Algo,
        key: &AesKey,
        data: &[u8],
        mac: &[u8],
    ) -> Result<(), AesEngineError> {
        algo.verify(key, &CryptoData::raw(data), &CryptoData::raw(mac))
    }
}
