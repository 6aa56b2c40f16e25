// Copyright (C) Microsoft Corporation. All rights reserved.

//! Traits for encryption and decryption operations.
//!
//! The module provides two levels of API:
//!
//! - **Single-operation**: [`EncryptOp`] and [`DecryptOp`] process a complete
//!   message in one call. The operation context lives only for that call.
//!
//! - **Streaming**: [`EncryptStreamingOp`] and [`DecryptStreamingOp`] create
//!   a context that processes data in chunks through [`EncryptOpContext`] and
//!   [`DecryptOpContext`].

use super::*;

/// Trait for single-operation encryption.
pub trait EncryptOp {
    /// Encrypts a complete message.
    ///
    /// # Arguments
    ///
    /// * `key` - The AES key
    /// * `input` - Plaintext
    /// * `output` - Optional output buffer. If `None`, only calculates required size.
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
    /// - The input length is invalid for the mode
    /// - The key or mechanism is invalid
    fn encrypt(
        &self,
        key: &AesKey,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError>;

    /// Encrypts the first `len` bytes of `data`, writing the result over them.
    ///
    /// The whole of `data` is available for output.
    fn encrypt_in_place(
        &self,
        key: &AesKey,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError>;
}

/// Trait for streaming encryption operations.
///
/// # Lifecycle
///
/// 1. Initialize: Call [`encrypt_init`](Self::encrypt_init) to create a context
/// 2. Update: Call [`update`](EncryptOpContext::update) repeatedly with data chunks
/// 3. Finalize: Call [`finish`](EncryptOpContext::finish) to complete the operation
pub trait EncryptStreamingOp<'a> {
    /// The context type for streaming encryption operations.
    type Context: EncryptOpContext<'a, Algo = Self>;

    /// Initializes a streaming encryption context.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The mechanism or its parameters are invalid
    /// - The key has the wrong format or size
    fn encrypt_init(self, key: &AesKey) -> Result<Self::Context, AesEngineError>;
}

/// Context for streaming encryption operations.
///
/// # Thread Safety
///
/// Contexts are not required to be thread-safe. Each context should be used from
/// a single thread.
pub trait EncryptOpContext<'a> {
    /// The algorithm type for this encryption context.
    type Algo: EncryptStreamingOp<'a>;

    /// Processes a chunk of data.
    ///
    /// Block modes emit only whole blocks and carry the rest; authenticated
    /// and MAC modes emit nothing until [`finish`](Self::finish).
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written to the output buffer, or the required
    /// buffer size if `output` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output buffer is too small; the context is unchanged
    /// - The operation has already been finalized
    /// - The data exceeds what the mode accepts
    fn update(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError>;

    /// Processes the first `len` bytes of `data`, writing the result over them.
    fn update_in_place(
        &mut self,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError>;

    /// Finalizes the encryption operation.
    ///
    /// A successful finish releases the context. A [`BufferTooSmall`] result
    /// leaves it intact so the call can be retried with a larger buffer.
    ///
    /// [`BufferTooSmall`]: AesEngineError::BufferTooSmall
    fn finish(&mut self, output: Option<&mut CryptoDataMut<'_>>) -> Result<usize, AesEngineError>;

    /// Finalizes the operation and returns the output as a vector.
    fn finish_vec(&mut self) -> Result<Vec<u8>, AesEngineError> {
        let required_size = self.finish(None)?;
        let mut output = vec![0u8; required_size];
        let written_size = self.finish(Some(&mut CryptoDataMut::raw(&mut output)))?;
        output.truncate(written_size);
        Ok(output)
    }

    /// Returns a reference to the underlying algorithm.
    fn algo(&self) -> &Self::Algo;

    /// Consumes the context and returns the underlying algorithm.
    fn into_algo(self) -> Self::Algo;
}

/// Trait for single-operation decryption.
pub trait DecryptOp {
    /// Decrypts a complete message.
    ///
    /// Authenticated modes verify the tag before writing any plaintext.
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
    /// - The key or mechanism is invalid
    fn decrypt(
        &self,
        key: &AesKey,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError>;

    /// Decrypts the first `len` bytes of `data`, writing the result over them.
    fn decrypt_in_place(
        &self,
        key: &AesKey,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError>;
}

/// Trait for streaming decryption operations.
///
/// # Lifecycle
///
/// 1. Initialize: Call [`decrypt_init`](Self::decrypt_init) to create a context
/// 2. Update: Call [`update`](DecryptOpContext::update) repeatedly with data chunks
/// 3. Finalize: Call [`finish`](DecryptOpContext::finish) to complete the operation
pub trait DecryptStreamingOp<'a> {
    /// The context type for streaming decryption operations.
    type Context: DecryptOpContext<'a, Algo = Self>;

    /// Initializes a streaming decryption context.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The mode cannot decrypt
    /// - The mechanism or its parameters are invalid
    /// - The key has the wrong format or size
    fn decrypt_init(self, key: &AesKey) -> Result<Self::Context, AesEngineError>;
}

/// Context for streaming decryption operations.
pub trait DecryptOpContext<'a> {
    /// The algorithm type for this decryption context.
    type Algo: DecryptStreamingOp<'a>;

    /// Processes a chunk of ciphertext.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written to the output buffer, or the required
    /// buffer size if `output` is `None`.
    fn update(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError>;

    /// Processes the first `len` bytes of `data`, writing the result over them.
    fn update_in_place(
        &mut self,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError>;

    /// Finalizes the decryption operation.
    ///
    /// Authenticated modes release their staged plaintext here, and only once
    /// the tag has matched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output buffer is too small; the context is unchanged
    /// - Data is left over that does not fill a block
    /// - The tag does not match
    fn finish(&mut self, output: Option<&mut CryptoDataMut<'_>>) -> Result<usize, AesEngineError>;

    /// Finalizes the operation and returns the output as a vector.
    fn finish_vec(&mut self) -> Result<Vec<u8>, AesEngineError> {
        let required_size = self.finish(None)?;
        let mut output = vec![0u8; required_size];
        let written_size = self.finish(Some(&mut CryptoDataMut::raw(&mut output)))?;
        output.truncate(written_size);
        Ok(output)
    }

    /// Returns a reference to the underlying algorithm.
    fn algo(&self) -> &Self::Algo;

    /// Consumes the context and returns the underlying algorithm.
    fn into_algo(self) -> Self::Algo;
}
