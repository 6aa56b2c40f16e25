// Copyright (C) Microsoft Corporation. All rights reserved.

//! Decryption operation wrapper.

use super::*;

/// Decryption operation wrapper.
pub struct Decrypter;

impl Decrypter {
    /// Performs single-operation decryption.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written to the output buffer, or the required
    /// buffer size if `output` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output buffer is too small
    /// - The ciphertext length is invalid for the mode
    /// - The tag does not match
    pub fn decrypt<Algo: DecryptOp>(
        algo: &Algo,
        key: &AesKey,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize, AesEngineError> {
        algo.decrypt(
            key,
            &CryptoData::raw(input),
            output.map(CryptoDataMut::raw).as_mut(),
        )
    }

    /// Performs single-operation decryption and returns the result as a new vector.
    pub fn decrypt_vec<Algo: DecryptOp>(
        algo: &Algo,
        key: &AesKey,
        input: &[u8],
    ) -> Result<Vec<u8>, AesEngineError> {
        let required_size = Self::decrypt(algo, key, input, None)?;
        let mut output = vec![0u8; required_size];
        let written_size = Self::decrypt(algo, key, input, Some(&mut output))?;
        output.truncate(written_size);
        Ok(output)
    }

    /// Initializes a streaming decryption context.
    pub fn decrypt_init<'a, Algo: DecryptStreamingOp<'a>>(
        algo: Algo,
        key: &AesKey,
    ) -> Result<Algo::Context, AesEngineError> {
        algo.decrypt_init(key)
    }

    /// Processes a chunk on a streaming context and returns the emitted bytes.
    pub fn update_vec<'a, Ctx: DecryptOpContext<'a>>(
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
