// Copyright (C) Microsoft Corporation. All rights reserved.

//! Caller buffers in their three shapes.
//!
//! Input and output may be contiguous, a scatter-gather list of slices, or a
//! chain of owned segments. The engine never sees the shape: input is walked
//! as a sequence of slices and output is filled through a [`DataWriter`],
//! both honoring the caller's offset and length window.

mod block;
mod writer;

pub(crate) use block::*;
pub(crate) use writer::*;

use super::*;

/// Chain of owned data segments.
///
/// Segments keep their lengths when written to: output fills the existing
/// bytes of each segment in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DataChain {
    segments: Vec<Vec<u8>>,
}

impl DataChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain of zero-filled segments with the given lengths.
    pub fn with_segment_lens(lens: &[usize]) -> Self {
        Self {
            segments: lens.iter().map(|len| vec![0u8; *len]).collect(),
        }
    }

    /// Appends a segment to the end of the chain.
    pub fn push(&mut self, segment: Vec<u8>) {
        self.segments.push(segment);
    }

    /// Returns the segments in order.
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// Returns the total number of bytes across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the chain holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenates all segments.
    pub fn to_vec(&self) -> Vec<u8> {
        self.segments.concat()
    }
}

/// Shape of an input buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DataShape<'a> {
    /// Contiguous bytes.
    Raw(&'a [u8]),
    /// Scatter-gather list.
    Vectored(&'a [&'a [u8]]),
    /// Chained segments.
    Chain(&'a DataChain),
}

/// Input buffer with an offset and length window.
#[derive(Debug, Clone, Copy)]
pub struct CryptoData<'a> {
    shape: DataShape<'a>,
    offset: usize,
    length: usize,
}

impl<'a> CryptoData<'a> {
    /// Wraps contiguous bytes.
    pub fn raw(data: &'a [u8]) -> Self {
        Self::from_shape(DataShape::Raw(data))
    }

    /// Wraps a scatter-gather list.
    pub fn vectored(segments: &'a [&'a [u8]]) -> Self {
        Self::from_shape(DataShape::Vectored(segments))
    }

    /// Wraps a segment chain.
    pub fn chain(chain: &'a DataChain) -> Self {
        Self::from_shape(DataShape::Chain(chain))
    }

    fn from_shape(shape: DataShape<'a>) -> Self {
        let length = shape_len(&shape);
        Self {
            shape,
            offset: 0,
            length,
        }
    }

    /// Restricts the input to `length` bytes starting at `offset`.
    ///
    /// The window is checked when the data is consumed; a window outside the
    /// underlying storage fails with [`AesEngineError::ArgumentsBad`].
    pub fn with_range(self, offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            ..self
        }
    }

    /// Returns the number of bytes in the window.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the window as one slice when the storage is contiguous.
    pub(crate) fn as_contiguous(&self) -> Result<&'a [u8], AesEngineError> {
        match self.shape {
            DataShape::Raw(data) => data
                .get(self.offset..)
                .and_then(|data| data.get(..self.length))
                .ok_or(AesEngineError::ArgumentsBad),
            _ => Err(AesEngineError::ArgumentsBad),
        }
    }

    /// Returns the window as a sequence of non-empty slices.
    pub(crate) fn chunks(&self) -> Result<Vec<&'a [u8]>, AesEngineError> {
        let segments: Vec<&'a [u8]> = match self.shape {
            DataShape::Raw(data) => vec![data],
            DataShape::Vectored(segments) => segments.to_vec(),
            DataShape::Chain(chain) => chain.segments.iter().map(Vec::as_slice).collect(),
        };

        let end = self.offset.checked_add(self.length);
        if end.is_none_or(|end| end > shape_len(&self.shape)) {
            Err(AesEngineError::ArgumentsBad)?;
        }

        let mut skip = self.offset;
        let mut want = self.length;
        let mut chunks = Vec::with_capacity(segments.len());
        for segment in segments {
            if want == 0 {
                break;
            }
            if skip >= segment.len() {
                skip -= segment.len();
                continue;
            }
            let segment = &segment[skip..];
            skip = 0;
            let take = segment.len().min(want);
            chunks.push(&segment[..take]);
            want -= take;
        }
        Ok(chunks)
    }

    /// Copies the window into a zeroizing buffer.
    pub(crate) fn to_zeroizing_vec(&self) -> Result<Zeroizing<Vec<u8>>, AesEngineError> {
        let mut bytes = Zeroizing::new(Vec::new());
        bytes
            .try_reserve_exact(self.length)
            .map_err(|_| AesEngineError::HostMemory)?;
        for chunk in self.chunks()? {
            bytes.extend_from_slice(chunk);
        }
        Ok(bytes)
    }
}

impl<'a> From<&'a [u8]> for CryptoData<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::raw(data)
    }
}

/// Shape of an output buffer.
#[derive(Debug)]
pub(crate) enum DataShapeMut<'a> {
    /// Contiguous bytes.
    Raw(&'a mut [u8]),
    /// Scatter-gather list.
    Vectored(Vec<&'a mut [u8]>),
    /// Chained segments.
    Chain(&'a mut DataChain),
}

/// Output buffer with a write offset.
///
/// The capacity of the buffer is the number of bytes from the offset to the
/// end of the underlying storage.
#[derive(Debug)]
pub struct CryptoDataMut<'a> {
    shape: DataShapeMut<'a>,
    offset: usize,
}

impl<'a> CryptoDataMut<'a> {
    /// Wraps contiguous bytes.
    pub fn raw(data: &'a mut [u8]) -> Self {
        Self::from_shape(DataShapeMut::Raw(data))
    }

    /// Wraps a scatter-gather list.
    pub fn vectored(segments: Vec<&'a mut [u8]>) -> Self {
        Self::from_shape(DataShapeMut::Vectored(segments))
    }

    /// Wraps a segment chain.
    pub fn chain(chain: &'a mut DataChain) -> Self {
        Self::from_shape(DataShapeMut::Chain(chain))
    }

    fn from_shape(shape: DataShapeMut<'a>) -> Self {
        Self { shape, offset: 0 }
    }

    /// Starts writing `offset` bytes into the underlying storage.
    pub fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }

    /// Returns the number of bytes that can be written.
    pub fn capacity(&self) -> usize {
        self.total_len().saturating_sub(self.offset)
    }

    fn total_len(&self) -> usize {
        match &self.shape {
            DataShapeMut::Raw(data) => data.len(),
            DataShapeMut::Vectored(segments) => segments.iter().map(|s| s.len()).sum(),
            DataShapeMut::Chain(chain) => chain.len(),
        }
    }

    /// Returns the writable segments past the offset.
    pub(crate) fn segments_mut(&mut self) -> Result<Vec<&mut [u8]>, AesEngineError> {
        let segments: Vec<&mut [u8]> = match &mut self.shape {
            DataShapeMut::Raw(data) => vec![&mut **data],
            DataShapeMut::Vectored(segments) => segments.iter_mut().map(|s| &mut **s).collect(),
            DataShapeMut::Chain(chain) => chain
                .segments
                .iter_mut()
                .map(Vec::as_mut_slice)
                .collect(),
        };

        let mut skip = self.offset;
        let mut writable = Vec::with_capacity(segments.len());
        for segment in segments {
            if skip >= segment.len() {
                skip -= segment.len();
                continue;
            }
            writable.push(&mut segment[skip..]);
            skip = 0;
        }

        if skip > 0 {
            Err(AesEngineError::ArgumentsBad)?;
        }
        Ok(writable)
    }

    /// Copies the first `len` writable bytes out, for in-place operation.
    pub(crate) fn read_prefix(&mut self, len: usize) -> Result<Zeroizing<Vec<u8>>, AesEngineError> {
        if len > self.capacity() {
            return Err(AesEngineError::ArgumentsBad);
        }

        let mut bytes = Zeroizing::new(Vec::new());
        bytes
            .try_reserve_exact(len)
            .map_err(|_| AesEngineError::HostMemory)?;
        for segment in self.segments_mut()? {
            let take = segment.len().min(len - bytes.len());
            bytes.extend_from_slice(&segment[..take]);
            if bytes.len() == len {
                break;
            }
        }
        Ok(bytes)
    }
}

impl<'a> From<&'a mut [u8]> for CryptoDataMut<'a> {
    fn from(data: &'a mut [u8]) -> Self {
        Self::raw(data)
    }
}

fn shape_len(shape: &DataShape<'_>) -> usize {
    match shape {
        DataShape::Raw(data) => data.len(),
        DataShape::Vectored(segments) => segments.iter().map(|s| s.len()).sum(),
        DataShape::Chain(chain) => chain.len(),
    }
}
