// Copyright (C) Microsoft Corporation. All rights reserved.

//! MAC generation wrapper.

use super::*;

/// MAC generation wrapper.
pub struct Signer;

impl Signer {
    /// Computes a MAC in a single operation.
    ///
    /// # Arguments
    ///
    /// * `algo` - The MAC algorithm implementation
    /// * `key` - The AES key
    /// * `data` - Data to authenticate
    /// * `mac` - Optional output buffer for the MAC. If `None`, only calculates required size.
    pub fn sign<Algo: SignOp>(
        algo: &Algo,
        key: &AesKey,
        data: &[u8],
        mac: Option<&mut [u8]>,
    ) -> Result<usize, AesEngineError> {
        algo.sign(key, &CryptoData::raw(data), mac.map(CryptoDataMut::raw).as_mut())
    }

    /// Computes a MAC and returns it as a new vector.
    pub fn sign_vec<Algo: SignOp>(
        algo: &Algo,
        key: &AesKey,
        data: &[u8],
    ) -> Result<Vec<u8>, AesEngineError> {
        let required_size = Self::sign(algo, key, data, None)?;
        let mut mac = vec![0u8; required_size];
        let written_size = Self::sign(algo, key, data, Some(&mut mac))?;
        mac.truncate(written_size);
        Ok(mac)
    }

    /// Initializes a streaming MAC context.
    pub fn sign_init<'a, Algo: SignStreamingOp<'a>>(
        algo: Algo,
        key: &AesKey,
    ) -> Result<Algo::Context, AesEngineError> {
        algo.sign_init(key)
    }
}
