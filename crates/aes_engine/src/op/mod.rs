// Copyright (C) Microsoft Corporation. All rights reserved.

//! Operation traits.
//!
//! These traits are the seams between the AES mode engine and its callers.
//! Every operation follows the same buffer pattern:
//!
//! - `None`: query the required output size without changing any state
//! - `Some(buffer)`: perform the operation
//!
//! Streaming traits split an operation into init, any number of updates and
//! a finish. A streaming context is released on its first fatal error and on
//! a completed finish; after that every call fails with
//! [`AesEngineError::ContextFinalized`].
mod encryption;
mod signing;

pub use encryption::*;
pub use signing::*;

use super::*;
