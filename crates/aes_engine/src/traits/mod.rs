// Copyright (C) Microsoft Corporation. All rights reserved.

//! High-level operation wrappers.
//!
//! Each wrapper puts one operation family behind a consistent API over the
//! traits in [`crate::op`]:
//!
//! - [`encrypter`]: Encryption (single-operation and streaming)
//! - [`decrypter`]: Decryption (single-operation and streaming)
//! - [`signer`]: MAC generation (single-operation and streaming)
//! - [`verifier`]: MAC verification
//!
//! The `_vec` helpers query the required size, allocate, run the operation
//! and truncate to the bytes actually written.
mod decrypter;
mod encrypter;
mod signer;
mod verifier;

pub use decrypter::*;
pub use encrypter::*;
pub use signer::*;
pub use verifier::*;

use super::*;
