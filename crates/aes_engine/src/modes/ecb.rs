// Copyright (C) Microsoft Corporation. All rights reserved.

//! ECB block transform.

use super::*;

pub(crate) fn ecb_block(
    schedule: &AesKeySchedule,
    direction: Direction,
    block: &mut [u8; AES_BLOCK_LEN],
) {
    match direction {
        Direction::Encrypt => schedule.encrypt_block(block),
        Direction::Decrypt => schedule.decrypt_block(block),
    }
}
