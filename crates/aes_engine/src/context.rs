// Copyright (C) Microsoft Corporation. All rights reserved.

//! Per-operation AES state.
//!
//! A [`ModeContext`] is built at operation init and owned by exactly one
//! streaming context or atomic call. Dropping it is the only teardown path:
//! the owned key schedule, the remainder buffer and every mode accumulator
//! and staging buffer zeroize themselves as they are dropped.

use super::*;

pub(crate) struct ModeContext<'t> {
    state: ModeState,
    direction: Direction,
    schedule: KeyScheduleSlot<'t>,
    remainder: BlockBuffer,
    absorbed: bool,
}

impl<'t> ModeContext<'t> {
    /// Validates the mechanism, expands (or borrows) the key schedule and
    /// builds the mode state.
    ///
    /// Nothing outlives a failed init: partially built state is dropped, and
    /// so zeroized, before the error is returned.
    pub(crate) fn init(
        mechanism: &AesMechanism,
        key: &AesKey,
        template: Option<&'t AesKeySchedule>,
        direction: Direction,
    ) -> Result<Self, AesEngineError> {
        let mode = mechanism.mode();
        if direction == Direction::Decrypt && !mode.supports_decrypt() {
            return Err(AesEngineError::MechanismInvalid);
        }
        mechanism.validate(direction)?;

        let schedule = KeyScheduleSlot::new(key, template)?;
        Self::with_schedule(mechanism, schedule, direction)
    }

    /// Builds the mode state over an already expanded key schedule.
    ///
    /// The mechanism must have been validated for `direction`.
    pub(crate) fn with_schedule(
        mechanism: &AesMechanism,
        schedule: KeyScheduleSlot<'t>,
        direction: Direction,
    ) -> Result<Self, AesEngineError> {
        let mode = mechanism.mode();
        let state = ModeState::new(mechanism, &schedule, direction)?;

        tracing::debug!(
            ?mode,
            ?direction,
            owns_key_schedule = schedule.owns_key_schedule(),
            "Initialized AES operation context"
        );

        Ok(Self {
            state,
            direction,
            schedule,
            remainder: BlockBuffer::default(),
            absorbed: false,
        })
    }

    pub(crate) fn mode(&self) -> AesMode {
        self.state.mode()
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` once any input has been fed through the mode.
    pub(crate) fn has_absorbed(&self) -> bool {
        self.absorbed
    }

    pub(crate) fn owns_key_schedule(&self) -> bool {
        self.schedule.owns_key_schedule()
    }

    pub(crate) fn remainder_len(&self) -> usize {
        self.remainder.len()
    }

    pub(crate) fn update_output_len(&self, input_len: usize) -> usize {
        self.state.update_output_len(&self.remainder, input_len)
    }

    pub(crate) fn final_output_len(&self) -> usize {
        self.state.final_output_len(self.direction, &self.remainder)
    }

    pub(crate) fn atomic_output_len(&self, input_len: usize) -> Result<usize, AesEngineError> {
        self.state.atomic_output_len(self.direction, input_len)
    }

    /// Feeds the whole input window through the mode.
    ///
    /// The window and the mode's length limits are checked before the first
    /// byte is consumed.
    pub(crate) fn absorb(
        &mut self,
        input: &CryptoData<'_>,
        out: &mut DataWriter<'_>,
    ) -> Result<(), AesEngineError> {
        let chunks = input.chunks()?;
        self.state.check_absorb(self.direction, input.len())?;
        self.absorbed = true;

        for chunk in chunks {
            self.state.absorb(
                &self.schedule,
                self.direction,
                &mut self.remainder,
                chunk,
                out,
            )?;
        }
        Ok(())
    }

    pub(crate) fn finalize(&mut self, out: &mut DataWriter<'_>) -> Result<(), AesEngineError> {
        self.state
            .finalize(&self.schedule, self.direction, &mut self.remainder, out)
    }
}

impl Drop for ModeContext<'_> {
    fn drop(&mut self) {
        tracing::trace!(mode = ?self.state.mode(), "Releasing AES operation context");
    }
}
