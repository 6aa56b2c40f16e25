// Copyright (C) Microsoft Corporation. All rights reserved.

//! Traits for MAC generation and verification.
//!
//! Only CMAC and GMAC produce standalone MACs; every other mechanism fails
//! with [`AesEngineError::MechanismInvalid`].

use super::*;

/// Trait for single-operation MAC generation.
pub trait SignOp {
    /// Computes a MAC over `data`.
    ///
    /// # Arguments
    ///
    /// * `key` - The AES key
    /// * `data` - The data to authenticate
    /// * `mac` - Optional output buffer for the MAC. If `None`, only calculates required size.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written to the MAC buffer, or the required
    /// buffer size if `mac` is `None`.
    fn sign(
        &self,
        key: &AesKey,
        data: &CryptoData<'_>,
        mac: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError>;
}

/// Trait for streaming MAC generation.
///
/// # Lifecycle
///
/// 1. Initialize: Call [`sign_init`](Self::sign_init) to create a context
/// 2. Update: Call [`update`](SignStreamingOpContext::update) repeatedly with data chunks
/// 3. Finalize: Call [`finish`](SignStreamingOpContext::finish) to produce the MAC
pub trait SignStreamingOp<'a> {
    /// The context type for streaming MAC generation.
    type Context: SignStreamingOpContext<'a, Algo = Self>;

    /// Initializes a streaming MAC context.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The mechanism is not CMAC or GMAC, or its parameters are invalid
    /// - The key has the wrong format or size
    fn sign_init(self, key: &AesKey) -> Result<Self::Context, AesEngineError>;
}

/// Context for streaming MAC generation.
pub trait SignStreamingOpContext<'a> {
    /// The algorithm type associated with this context.
    type Algo: SignStreamingOp<'a, Context = Self>;

    /// Processes a chunk of data. Produces no output.
    fn update(&mut self, data: &CryptoData<'_>) -> Result<(), AesEngineError>;

    /// Finalizes the MAC.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written to the MAC buffer, or the required
    /// buffer size if `mac` is `None`.
    fn finish(&mut self, mac: Option<&mut CryptoDataMut<'_>>) -> Result<usize, AesEngineError>;

    /// Finalizes the operation and returns the MAC as a vector.
    fn finish_vec(&mut self) -> Result<Vec<u8>, AesEngineError> {
        let required_size = self.finish(None)?;
        let mut mac = vec![0u8; required_size];
        let written_size = self.finish(Some(&mut CryptoDataMut::raw(&mut mac)))?;
        mac.truncate(written_size);
        Ok(mac)
    }

    /// Returns a reference to the underlying algorithm.
    fn algo(&self) -> &Self::Algo;

    /// Consumes the context and returns the underlying algorithm.
    fn into_algo(self) -> Self::Algo;
}

/// Trait for single-operation MAC verification.
pub trait VerifyOp {
    /// Verifies `mac` over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`AesEngineError::InvalidMac`] if the MAC does not match, and
    /// the usual mechanism and key errors otherwise.
    fn verify(
        &self,
        key: &AesKey,
        data: &CryptoData<'_>,
        mac: &CryptoData<'_>,
    ) -> Result<(), AesEngineError>;
}
