// Copyright (C) Microsoft Corporation. All rights reserved.

//! CBC chaining state.

use super::*;

/// CBC chaining block: the IV, then the last ciphertext block.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CbcState {
    chain: [u8; AES_BLOCK_LEN],
}

impl CbcState {
    pub(crate) fn new(iv: &[u8]) -> Result<Self, AesEngineError> {
        let chain = iv
            .try_into()
            .map_err(|_| AesEngineError::MechanismParamInvalid)?;
        Ok(Self { chain })
    }

    pub(crate) fn process_block(
        &mut self,
        schedule: &AesKeySchedule,
        direction: Direction,
        block: &mut [u8; AES_BLOCK_LEN],
    ) {
        match direction {
            Direction::Encrypt => {
                xor_block(block, &self.chain);
                schedule.encrypt_block(block);
                self.chain = *block;
            }
            Direction::Decrypt => {
                let ciphertext = *block;
                schedule.decrypt_block(block);
                xor_block(block, &self.chain);
                self.chain = ciphertext;
            }
        }
    }
}
