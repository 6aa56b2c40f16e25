// Copyright (C) Microsoft Corporation. All rights reserved.

//! Sequential writer over the segments of an output buffer.

use super::*;

/// Writes bytes across the segments of a [`CryptoDataMut`] in order and
/// counts what was written.
pub(crate) struct DataWriter<'w> {
    segments: Vec<&'w mut [u8]>,
    index: usize,
    pos: usize,
    written: usize,
}

impl<'w> DataWriter<'w> {
    pub(crate) fn new(output: &'w mut CryptoDataMut<'_>) -> Result<Self, AesEngineError> {
        Ok(Self {
            segments: output.segments_mut()?,
            index: 0,
            pos: 0,
            written: 0,
        })
    }

    /// Appends `bytes`, spilling into following segments as needed.
    pub(crate) fn write(&mut self, mut bytes: &[u8]) -> Result<(), AesEngineError> {
        while !bytes.is_empty() {
            let Some(segment) = self.segments.get_mut(self.index) else {
                return Err(AesEngineError::BufferTooSmall {
                    required: self.written + bytes.len(),
                });
            };

            let take = (segment.len() - self.pos).min(bytes.len());
            segment[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
            self.pos += take;
            self.written += take;
            bytes = &bytes[take..];

            if self.pos == segment.len() {
                self.index += 1;
                self.pos = 0;
            }
        }
        Ok(())
    }

    /// Number of bytes written so far.
    pub(crate) fn written(&self) -> usize {
        self.written
    }
}
