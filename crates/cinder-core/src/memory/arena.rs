// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Returned when an allocation would grow a [`ByteArena`] past its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arena limit of {limit} bytes exceeded ({used} used, {requested} requested)")]
pub struct ArenaLimitError {
    /// The arena's limit.
    pub limit: usize,
    /// Bytes already allocated.
    pub used: usize,
    /// Bytes the failed allocation asked for.
    pub requested: usize,
}

/// A contiguous region inside a [`ByteArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaSpan {
    /// Byte offset of the region from the start of the arena.
    pub offset: usize,
    /// Length of the region in bytes.
    pub len: usize,
}

impl ArenaSpan {
    /// Returns the byte range covered by this span.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// A bump allocator for opaque byte blobs.
///
/// Blobs are only ever appended. The arena is emptied with [`ByteArena::reset`]
/// (keeping its storage) or freed with [`ByteArena::release`]; there is no
/// per-blob free.
///
/// An optional limit caps the total allocated size; allocations past it fail
/// and leave the arena unchanged.
#[derive(Debug)]
pub struct ByteArena {
    bytes: Vec<u8>,
    limit: usize,
}

impl Default for ByteArena {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            limit: usize::MAX,
        }
    }
}

impl ByteArena {
    /// Creates an empty, unlimited arena without reserving storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty arena able to hold `capacity` bytes without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Caps the total allocated size at `limit` bytes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The maximum number of bytes the arena will hold.
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn reserve_span(&self, len: usize) -> Result<ArenaSpan, ArenaLimitError> {
        let offset = self.bytes.len();
        match offset.checked_add(len) {
            Some(end) if end <= self.limit => Ok(ArenaSpan { offset, len }),
            _ => Err(ArenaLimitError {
                limit: self.limit,
                used: offset,
                requested: len,
            }),
        }
    }

    /// Reserves `len` zeroed bytes and returns their span.
    pub fn alloc(&mut self, len: usize) -> Result<ArenaSpan, ArenaLimitError> {
        let span = self.reserve_span(len)?;
        self.bytes.resize(span.offset + len, 0);
        Ok(span)
    }

    /// Copies `data` into the arena and returns its span.
    pub fn alloc_copy(&mut self, data: &[u8]) -> Result<ArenaSpan, ArenaLimitError> {
        let span = self.reserve_span(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(span)
    }

    /// Returns the bytes of `span`, or `None` if it does not lie inside the arena.
    pub fn get(&self, span: ArenaSpan) -> Option<&[u8]> {
        self.bytes.get(span.range())
    }

    /// Mutable variant of [`ByteArena::get`].
    pub fn get_mut(&mut self, span: ArenaSpan) -> Option<&mut [u8]> {
        self.bytes.get_mut(span.range())
    }

    /// Number of bytes currently allocated.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing is allocated.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes the arena can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Drops every blob but keeps the storage for reuse.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Drops every blob and frees the storage.
    pub fn release(&mut self) {
        self.bytes = Vec::new();
    }
}
