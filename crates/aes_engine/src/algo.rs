// Copyright (C) Microsoft Corporation. All rights reserved.

//! AES mode algorithm and its streaming contexts.
//!
//! [`AesModeAlgo`] binds a mechanism to an optional pre-expanded key
//! schedule and implements every operation trait. Single-operation calls go
//! through the atomic entry points; streaming calls produce an
//! [`AesEncryptContext`], [`AesDecryptContext`] or [`AesMacContext`].

use super::*;

/// AES mechanism bound to an optional key schedule template.
///
/// # Lifetime Parameters
///
/// * `'t` - Lifetime of the borrowed template. Contexts created from this
///   algorithm borrow the template for the same lifetime and never release it.
#[derive(Debug, Clone)]
pub struct AesModeAlgo<'t> {
    mechanism: AesMechanism,
    template: Option<&'t AesKeySchedule>,
}

impl<'t> AesModeAlgo<'t> {
    /// Creates an algorithm that expands its key schedule per operation.
    pub fn new(mechanism: AesMechanism) -> Self {
        Self {
            mechanism,
            template: None,
        }
    }

    /// Creates an algorithm whose operations borrow `template` instead of
    /// expanding the key they are given.
    pub fn with_template(mechanism: AesMechanism, template: &'t AesKeySchedule) -> Self {
        Self {
            mechanism,
            template: Some(template),
        }
    }

    /// Returns the mechanism.
    pub fn mechanism(&self) -> &AesMechanism {
        &self.mechanism
    }

    /// Returns the borrowed template, if any.
    pub fn template(&self) -> Option<&'t AesKeySchedule> {
        self.template
    }

    fn init_session(
        &self,
        key: &AesKey,
        direction: Direction,
    ) -> Result<StreamingSession<'t>, AesEngineError> {
        let ctx = ModeContext::init(&self.mechanism, key, self.template, direction)?;
        Ok(StreamingSession::new(ctx))
    }
}

impl EncryptOp for AesModeAlgo<'_> {
    fn encrypt(
        &self,
        key: &AesKey,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        encrypt_atomic(&self.mechanism, key, self.template, input, output)
    }

    fn encrypt_in_place(
        &self,
        key: &AesKey,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError> {
        encrypt_atomic_in_place(&self.mechanism, key, self.template, data, len)
    }
}

impl DecryptOp for AesModeAlgo<'_> {
    fn decrypt(
        &self,
        key: &AesKey,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        decrypt_atomic(&self.mechanism, key, self.template, input, output)
    }

    fn decrypt_in_place(
        &self,
        key: &AesKey,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError> {
        decrypt_atomic_in_place(&self.mechanism, key, self.template, data, len)
    }
}

impl SignOp for AesModeAlgo<'_> {
    fn sign(
        &self,
        key: &AesKey,
        data: &CryptoData<'_>,
        mac: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        mac_atomic(&self.mechanism, key, self.template, data, mac)
    }
}

impl VerifyOp for AesModeAlgo<'_> {
    fn verify(
        &self,
        key: &AesKey,
        data: &CryptoData<'_>,
        mac: &CryptoData<'_>,
    ) -> Result<(), AesEngineError> {
        mac_verify_atomic(&self.mechanism, key, self.template, data, mac)
    }
}

impl<'t> EncryptStreamingOp<'t> for AesModeAlgo<'t> {
    type Context = AesEncryptContext<'t>;

    fn encrypt_init(self, key: &AesKey) -> Result<Self::Context, AesEngineError> {
        let session = self.init_session(key, Direction::Encrypt)?;
        Ok(AesEncryptContext {
            algo: self,
            session,
        })
    }
}

impl<'t> DecryptStreamingOp<'t> for AesModeAlgo<'t> {
    type Context = AesDecryptContext<'t>;

    fn decrypt_init(self, key: &AesKey) -> Result<Self::Context, AesEngineError> {
        let session = self.init_session(key, Direction::Decrypt)?;
        Ok(AesDecryptContext {
            algo: self,
            session,
        })
    }
}

impl<'t> SignStreamingOp<'t> for AesModeAlgo<'t> {
    type Context = AesMacContext<'t>;

    fn sign_init(self, key: &AesKey) -> Result<Self::Context, AesEngineError> {
        if !self.mechanism.mode().supports_mac() {
            return Err(AesEngineError::MechanismInvalid);
        }

        let inner = if self.mechanism.mode() == AesMode::Gmac {
            self.mechanism.gmac_as_gcm(&CryptoData::raw(&[]))?;
            MacInner::Gmac(Some(GmacStream {
                schedule: KeyScheduleSlot::new(key, self.template)?,
                data: Zeroizing::new(Vec::new()),
            }))
        } else {
            MacInner::Cmac(self.init_session(key, Direction::Encrypt)?)
        };

        tracing::debug!(mode = ?self.mechanism.mode(), "Initialized AES MAC context");
        Ok(AesMacContext { algo: self, inner })
    }
}

/// Streaming AES encryption context.
pub struct AesEncryptContext<'t> {
    algo: AesModeAlgo<'t>,
    session: StreamingSession<'t>,
}

impl AesEncryptContext<'_> {
    /// Returns the mode of operation.
    pub fn mode(&self) -> AesMode {
        self.algo.mechanism.mode()
    }

    /// Returns `true` until the context is finalized or torn down by an error.
    pub fn is_active(&self) -> bool {
        self.session.context().is_some()
    }

    /// Returns `true` if the context expanded its own key schedule rather
    /// than borrowing a template. `None` once the context is released.
    pub fn owns_key_schedule(&self) -> Option<bool> {
        self.session.context().map(ModeContext::owns_key_schedule)
    }

    /// Returns the number of carried bytes that do not yet fill a block.
    pub fn remainder_len(&self) -> Option<usize> {
        self.session.context().map(ModeContext::remainder_len)
    }

    /// Encrypts a complete message on a context that has not been updated,
    /// then releases the context.
    ///
    /// Passing `None` for `output` returns the required size and leaves the
    /// context untouched. An undersized `output` fails with
    /// [`AesEngineError::BufferTooSmall`] and the call may be retried.
    ///
    /// # Errors
    ///
    /// * [`AesEngineError::ArgumentsBad`] - the context was already updated
    /// * [`AesEngineError::DataLenRange`] - ECB or CBC input is not block aligned
    pub fn encrypt_single(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        self.session.single(input, output)
    }
}

impl<'t> EncryptOpContext<'t> for AesEncryptContext<'t> {
    type Algo = AesModeAlgo<'t>;

    fn update(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        self.session.update(input, output)
    }

    fn update_in_place(
        &mut self,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError> {
        self.session.update_in_place(data, len)
    }

    fn finish(&mut self, output: Option<&mut CryptoDataMut<'_>>) -> Result<usize, AesEngineError> {
        self.session.finish(output)
    }

    fn algo(&self) -> &Self::Algo {
        &self.algo
    }

    fn into_algo(self) -> Self::Algo {
        self.algo
    }
}

/// Streaming AES decryption context.
pub struct AesDecryptContext<'t> {
    algo: AesModeAlgo<'t>,
    session: StreamingSession<'t>,
}

impl AesDecryptContext<'_> {
    /// Returns the mode of operation.
    pub fn mode(&self) -> AesMode {
        self.algo.mechanism.mode()
    }

    /// Returns `true` until the context is finalized or torn down by an error.
    pub fn is_active(&self) -> bool {
        self.session.context().is_some()
    }

    /// Returns `true` if the context expanded its own key schedule.
    pub fn owns_key_schedule(&self) -> Option<bool> {
        self.session.context().map(ModeContext::owns_key_schedule)
    }

    /// Returns the number of carried bytes that do not yet fill a block.
    pub fn remainder_len(&self) -> Option<usize> {
        self.session.context().map(ModeContext::remainder_len)
    }

    /// Decrypts a complete message on a context that has not been updated,
    /// then releases the context. Sizing and retry follow
    /// [`AesEncryptContext::encrypt_single`].
    pub fn decrypt_single(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        self.session.single(input, output)
    }
}

impl<'t> DecryptOpContext<'t> for AesDecryptContext<'t> {
    type Algo = AesModeAlgo<'t>;

    fn update(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        self.session.update(input, output)
    }

    fn update_in_place(
        &mut self,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError> {
        self.session.update_in_place(data, len)
    }

    fn finish(&mut self, output: Option<&mut CryptoDataMut<'_>>) -> Result<usize, AesEngineError> {
        self.session.finish(output)
    }

    fn algo(&self) -> &Self::Algo {
        &self.algo
    }

    fn into_algo(self) -> Self::Algo {
        self.algo
    }
}

/// Streaming CMAC or GMAC context.
///
/// CMAC runs block by block. GMAC authenticates its data as GCM associated
/// data, which must be complete before the GHASH input is laid out, so the
/// data is gathered in a zeroizing buffer and hashed at finish.
pub struct AesMacContext<'t> {
    algo: AesModeAlgo<'t>,
    inner: MacInner<'t>,
}

enum MacInner<'t> {
    Cmac(StreamingSession<'t>),
    Gmac(Option<GmacStream<'t>>),
}

struct GmacStream<'t> {
    schedule: KeyScheduleSlot<'t>,
    data: Zeroizing<Vec<u8>>,
}

impl AesMacContext<'_> {
    /// Returns the mode of operation.
    pub fn mode(&self) -> AesMode {
        self.algo.mechanism.mode()
    }

    /// Returns `true` until the context is finalized or torn down by an error.
    pub fn is_active(&self) -> bool {
        match &self.inner {
            MacInner::Cmac(session) => session.context().is_some(),
            MacInner::Gmac(stream) => stream.is_some(),
        }
    }

    /// Computes the MAC of a complete message on a context that has not been
    /// updated, then releases the context.
    ///
    /// # Errors
    ///
    /// * [`AesEngineError::ArgumentsBad`] - the context was already updated
    /// * [`AesEngineError::BufferTooSmall`] - `mac` cannot hold the MAC; the
    ///   context is kept for a retry
    pub fn mac_single(
        &mut self,
        data: &CryptoData<'_>,
        mac: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        let slot = match &mut self.inner {
            MacInner::Cmac(session) => return session.single(data, mac),
            MacInner::Gmac(slot) => slot,
        };
        let Some(stream) = slot.as_ref() else {
            return Err(AesEngineError::ContextFinalized);
        };
        if !stream.data.is_empty() {
            tracing::debug!("AES MAC context already updated, releasing context");
            *slot = None;
            return Err(AesEngineError::ArgumentsBad);
        }

        let required = AES_GMAC_TAG_BITS / 8;
        match mac {
            None => Ok(required),
            Some(mac) if mac.capacity() < required => {
                Err(AesEngineError::BufferTooSmall { required })
            }
            Some(mac) => {
                SignStreamingOpContext::update(self, data)?;
                self.finish_gmac(Some(mac))
            }
        }
    }

    fn finish_gmac(
        &mut self,
        mac: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        let MacInner::Gmac(slot) = &mut self.inner else {
            return Err(AesEngineError::MechanismInvalid);
        };
        if slot.is_none() {
            return Err(AesEngineError::ContextFinalized);
        }

        let required = AES_GMAC_TAG_BITS / 8;
        let Some(mac) = mac else {
            return Ok(required);
        };
        if mac.capacity() < required {
            return Err(AesEngineError::BufferTooSmall { required });
        }

        let Some(stream) = slot.take() else {
            return Err(AesEngineError::ContextFinalized);
        };
        let gcm = self.algo.mechanism.gmac_as_gcm(&CryptoData::raw(&stream.data))?;
        let mut ctx = ModeContext::with_schedule(&gcm, stream.schedule, Direction::Encrypt)?;
        run_context(&mut ctx, &CryptoData::raw(&[]), Some(mac))
    }
}

impl<'t> SignStreamingOpContext<'t> for AesMacContext<'t> {
    type Algo = AesModeAlgo<'t>;

    fn update(&mut self, data: &CryptoData<'_>) -> Result<(), AesEngineError> {
        match &mut self.inner {
            MacInner::Cmac(session) => {
                session.update(data, Some(&mut CryptoDataMut::raw(&mut [])))?;
                Ok(())
            }
            MacInner::Gmac(slot) => {
                let Some(stream) = slot.as_mut() else {
                    return Err(AesEngineError::ContextFinalized);
                };
                let result = data.to_zeroizing_vec().and_then(|bytes| {
                    reserve(&mut stream.data, bytes.len())?;
                    stream.data.extend_from_slice(&bytes);
                    Ok(())
                });
                if let Err(error) = result {
                    tracing::debug!(%error, "AES MAC operation failed, releasing context");
                    *slot = None;
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    fn finish(&mut self, mac: Option<&mut CryptoDataMut<'_>>) -> Result<usize, AesEngineError> {
        if let MacInner::Cmac(session) = &mut self.inner {
            return session.finish(mac);
        }
        self.finish_gmac(mac)
    }

    fn algo(&self) -> &Self::Algo {
        &self.algo
    }

    fn into_algo(self) -> Self::Algo {
        self.algo
    }
}
