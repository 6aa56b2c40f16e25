// Copyright (C) Microsoft Corporation. All rights reserved.

//! Partial-block buffering for streaming operations.
//!
//! Streaming input rarely arrives on block boundaries. [`BlockBuffer`] holds
//! the bytes that do not yet fill a block between update calls and hands
//! every completed block to the mode's block transform.

use super::*;

/// Remainder buffer holding at most one AES block.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub(crate) struct BlockBuffer {
    block: [u8; AES_BLOCK_LEN],
    len: usize,
}

impl BlockBuffer {
    /// Number of buffered bytes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Buffered bytes.
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.block[..self.len]
    }

    pub(crate) fn clear(&mut self) {
        self.block.zeroize();
        self.len = 0;
    }

    /// Bytes a call to [`feed`](Self::feed) with `input_len` bytes would emit.
    pub(crate) fn emitted_len(&self, input_len: usize) -> usize {
        (self.len + input_len) / AES_BLOCK_LEN * AES_BLOCK_LEN
    }

    /// Processes every block completed by `input` and buffers the tail.
    ///
    /// # Arguments
    ///
    /// * `input` - Data to append to the buffered bytes
    /// * `op` - Block transform, called once per complete block in order
    pub(crate) fn feed<F>(&mut self, input: &[u8], mut op: F) -> Result<(), AesEngineError>
    where
        F: FnMut(&mut [u8; AES_BLOCK_LEN]) -> Result<(), AesEngineError>,
    {
        let mut input = input;

        if self.len > 0 {
            let fill = (AES_BLOCK_LEN - self.len).min(input.len());
            self.block[self.len..self.len + fill].copy_from_slice(&input[..fill]);
            self.len += fill;
            input = &input[fill..];

            if self.len < AES_BLOCK_LEN {
                return Ok(());
            }
            let mut block = self.block;
            self.clear();
            op(&mut block)?;
        }

        let mut blocks = input.chunks_exact(AES_BLOCK_LEN);
        for chunk in &mut blocks {
            let mut block = [0u8; AES_BLOCK_LEN];
            block.copy_from_slice(chunk);
            op(&mut block)?;
        }

        self.store(blocks.remainder());
        Ok(())
    }

    /// Like [`feed`](Self::feed), but holds back the last complete block
    /// until more input shows it is not the final one.
    ///
    /// After this call the buffer holds between one and a full block of
    /// bytes whenever any input has been seen.
    pub(crate) fn feed_deferred<F>(&mut self, input: &[u8], mut op: F) -> Result<(), AesEngineError>
    where
        F: FnMut(&mut [u8; AES_BLOCK_LEN]) -> Result<(), AesEngineError>,
    {
        let fill = (AES_BLOCK_LEN - self.len).min(input.len());
        self.block[self.len..self.len + fill].copy_from_slice(&input[..fill]);
        self.len += fill;
        let input = &input[fill..];

        // the buffered block is not the last one
        if self.len == AES_BLOCK_LEN && !input.is_empty() {
            let mut block = self.block;
            self.clear();
            op(&mut block)?;
        }

        // an aligned input leaves its final block buffered for finalize
        let tail_len = match input.len() % AES_BLOCK_LEN {
            0 => input.len().min(AES_BLOCK_LEN),
            partial => partial,
        };

        let (body, tail) = input.split_at(input.len() - tail_len);
        for chunk in body.chunks_exact(AES_BLOCK_LEN) {
            let mut block = [0u8; AES_BLOCK_LEN];
            block.copy_from_slice(chunk);
            op(&mut block)?;
        }

        if !tail.is_empty() {
            self.store(tail);
        }
        Ok(())
    }

    fn store(&mut self, tail: &[u8]) {
        self.block[..tail.len()].copy_from_slice(tail);
        self.len = tail.len();
    }
}
