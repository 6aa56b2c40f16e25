// Copyright (C) Microsoft Corporation. All rights reserved.

//! Encryption operation wrapper.

use super::*;

/// Encryption operation wrapper.
pub struct Encrypter;

impl Encrypter {
    /// Performs single-operation encryption.
    ///
    /// # Arguments
    ///
    /// * `algo` - The encryption algorithm implementation
    /// * `key` - The AES key
    /// * `input` - Plaintext
    /// * `output` - Optional output buffer. If `None`, only calculates required size.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written to the output buffer, or the required
    /// buffer size if `output` is `None`.
    pub fn encrypt<Algo: EncryptOp>(
        algo: &Algo,
        key: &AesKey,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize, AesEngineError> {
        algo.encrypt(
            key,
            &CryptoData::raw(input),
            output.map(CryptoDataMut::raw).as_mut(),
        )
    }

    /// Performs single-operation encryption and returns the result as a new vector.
    pub fn encrypt_vec<Algo: EncryptOp>(
        algo: &Algo,
        key: &AesKey,
        input: &[u8],
    ) -> Result<Vec<u8>, AesEngineError> {
        let required_size = Self::encrypt(algo, key, input, None)?;
        let mut output = vec![0u8; required_size];
        let written_size = Self::encrypt(algo, key, input, Some(&mut output))?;
        output.truncate(written_size);
        Ok(output)
    }

    /// Initializes a streaming encryption context.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The mechanism or its parameters are invalid
    /// - The key has the wrong format or size
    pub fn encrypt_init<'a, Algo: EncryptStreamingOp<'a>>(
        algo: Algo,
        key: &AesKey,
    ) -> Result<Algo::Context, AesEngineError> {
        algo.encrypt_init(key)
    }

    /// Processes a chunk on a streaming context and returns the emitted bytes.
    pub fn update_vec<'a, Ctx: EncryptOpContext<'a>>(
        ctx: &mut Ctx,
        input: &[u8],
    ) -> Result<Vec<u8>, AesEngineError> {
        let input = CryptoData::raw(input);
        let required_size = ctx.update(&input, None)?;
        let mut output = vec![0u8; required_size];
        let written_size = ctx.update(&input, Some(&mut CryptoDataMut::raw(&mut output)))?;
        output.truncate(written_size);
        Ok(output)
    }
}
