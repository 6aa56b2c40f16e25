// Copyright (C) Microsoft Corporation. All rights reserved.

//! AES key objects.
//!
//! A key carries its format, its raw material and its declared length in bits.
//! Nothing is validated at construction: format and size checks happen when a
//! key schedule is expanded from the key, so a caller handing over a key
//! reference or an attribute list learns about the mismatch at operation init.

use super::*;

/// Encoding of the key material carried by an [`AesKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// Raw key bytes.
    Raw,
    /// Opaque reference to a key held elsewhere.
    Reference,
    /// Attribute list describing a key.
    AttributeList,
}

/// AES key object.
///
/// # Security
///
/// The key material lives in a [`Zeroizing`] buffer and is overwritten with
/// zeros when the key is dropped.
#[derive(Clone)]
pub struct AesKey {
    format: KeyFormat,
    data: Zeroizing<Vec<u8>>,
    length_bits: usize,
}

impl AesKey {
    /// Creates a raw AES key from bytes. The declared length is the byte length.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(KeyFormat::Raw, bytes, bytes.len() * 8)
    }

    /// Creates a key with an explicit format and declared length.
    ///
    /// # Arguments
    ///
    /// * `format` - Encoding of `data`
    /// * `data` - Key material
    /// * `length_bits` - Declared key length in bits
    pub fn new(format: KeyFormat, data: &[u8], length_bits: usize) -> Self {
        Self {
            format,
            data: Zeroizing::new(data.to_vec()),
            length_bits,
        }
    }

    /// Returns the key format.
    pub fn format(&self) -> KeyFormat {
        self.format
    }

    /// Returns the declared key length in bits.
    pub fn bits(&self) -> usize {
        self.length_bits
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for AesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesKey")
            .field("format", &self.format)
            .field("length_bits", &self.length_bits)
            .finish_non_exhaustive()
    }
}
