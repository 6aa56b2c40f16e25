// Copyright (C) Microsoft Corporation. All rights reserved.

//! Streaming session lifecycle.
//!
//! A session owns the [`ModeContext`] of one streaming operation and
//! enforces when it is torn down:
//!
//! - a size query (`output == None`) never mutates or releases the context
//! - [`AesEngineError::BufferTooSmall`] leaves the context intact for a retry
//! - any other error, and every completed finish, releases the context

use super::*;

pub(crate) struct StreamingSession<'t> {
    ctx: Option<ModeContext<'t>>,
}

impl<'t> StreamingSession<'t> {
    pub(crate) fn new(ctx: ModeContext<'t>) -> Self {
        Self { ctx: Some(ctx) }
    }

    pub(crate) fn context(&self) -> Option<&ModeContext<'t>> {
        self.ctx.as_ref()
    }

    pub(crate) fn update(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        let result = match self.ctx.as_mut() {
            Some(ctx) => Self::update_context(ctx, input, output),
            None => Err(AesEngineError::ContextFinalized),
        };
        self.settle(result, false)
    }

    /// Runs an update whose output overwrites its input.
    ///
    /// The first `len` bytes of `data` are the input; the whole of `data`
    /// is available for output.
    pub(crate) fn update_in_place(
        &mut self,
        data: &mut CryptoDataMut<'_>,
        len: usize,
    ) -> Result<usize, AesEngineError> {
        let result = match self.ctx.as_mut() {
            Some(ctx) => data.read_prefix(len).and_then(|input| {
                Self::update_context(ctx, &CryptoData::raw(&input), Some(data))
            }),
            None => Err(AesEngineError::ContextFinalized),
        };
        self.settle(result, false)
    }

    pub(crate) fn finish(
        &mut self,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(AesEngineError::ContextFinalized);
        };

        let required = ctx.final_output_len();
        let Some(output) = output else {
            return Ok(required);
        };

        let result = if output.capacity() < required {
            Err(AesEngineError::BufferTooSmall { required })
        } else {
            DataWriter::new(output).and_then(|mut writer| {
                ctx.finalize(&mut writer)?;
                Ok(writer.written())
            })
        };
        self.settle(result, true)
    }

    /// Runs the whole operation in one call.
    ///
    /// The context must not have seen any input yet. A size query leaves it
    /// untouched; every other outcome except
    /// [`AesEngineError::BufferTooSmall`] releases it.
    pub(crate) fn single(
        &mut self,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        let query = output.is_none();
        let result = match self.ctx.as_mut() {
            Some(ctx) if ctx.has_absorbed() => Err(AesEngineError::ArgumentsBad),
            Some(ctx) => check_alignment(ctx.mode(), ctx.direction(), input.len())
                .and_then(|()| run_context(ctx, input, output)),
            None => Err(AesEngineError::ContextFinalized),
        };
        self.settle(result, !query)
    }

    fn update_context(
        ctx: &mut ModeContext<'t>,
        input: &CryptoData<'_>,
        output: Option<&mut CryptoDataMut<'_>>,
    ) -> Result<usize, AesEngineError> {
        let required = ctx.update_output_len(input.len());
        let Some(output) = output else {
            return Ok(required);
        };
        if output.capacity() < required {
            return Err(AesEngineError::BufferTooSmall { required });
        }

        let mut writer = DataWriter::new(output)?;
        ctx.absorb(input, &mut writer)?;
        Ok(writer.written())
    }

    /// Releases the context unless the outcome leaves it usable.
    fn settle(&mut self, result: Result<usize, AesEngineError>, finished: bool) -> Result<usize, AesEngineError> {
        match &result {
            Err(error) if error.is_recoverable() => {}
            Err(AesEngineError::ContextFinalized) => {}
            Err(error) => {
                tracing::debug!(%error, "AES streaming operation failed, releasing context");
                self.ctx = None;
            }
            Ok(_) if finished => self.ctx = None,
            Ok(_) => {}
        }
        result
    }
}
