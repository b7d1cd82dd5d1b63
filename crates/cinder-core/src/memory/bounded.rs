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

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use thiserror::Error;

/// Returned when an append would exceed a fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("fixed capacity of {capacity} elements exceeded")]
pub struct CapacityError {
    /// The capacity that would have been exceeded.
    pub capacity: usize,
}

/// A heap-allocated, append-only sequence with a capacity fixed at construction.
///
/// The backing storage is allocated once. [`BoundedVec::clear`] resets the
/// logical length without touching that allocation, so a value can be reused
/// frame after frame without reallocating.
#[derive(Debug, Clone)]
pub struct BoundedVec<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedVec<T> {
    /// Preallocates storage for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `value`, failing if the sequence is full.
    pub fn try_push(&mut self, value: T) -> Result<(), CapacityError> {
        if self.items.len() == self.capacity {
            return Err(CapacityError {
                capacity: self.capacity,
            });
        }
        self.items.push(value);
        Ok(())
    }

    /// Sets the length to zero. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if another push would fail.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored elements in append order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

/// A fixed-capacity sequence stored inline, for small bounded lists that are
/// embedded in `Copy` data such as commands and pipeline keys.
#[derive(Clone, Copy)]
pub struct InlineVec<T: Copy + Default, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> InlineVec<T, N> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            len: 0,
        }
    }

    /// Copies `values` into a new sequence, failing if there are more than `N`.
    pub fn from_slice(values: &[T]) -> Result<Self, CapacityError> {
        let mut out = Self::new();
        for &value in values {
            out.try_push(value)?;
        }
        Ok(out)
    }

    /// Appends `value`, failing if the sequence already holds `N` elements.
    pub fn try_push(&mut self, value: T) -> Result<(), CapacityError> {
        if self.len == N {
            return Err(CapacityError { capacity: N });
        }
        self.items[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The compile-time capacity `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Stored elements in append order.
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }
}

impl<T: Copy + Default, const N: usize> Default for InlineVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> Deref for InlineVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default + fmt::Debug, const N: usize> fmt::Debug for InlineVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Copy + Default + PartialEq, const N: usize> PartialEq for InlineVec<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Copy + Default + Eq, const N: usize> Eq for InlineVec<T, N> {}

impl<T: Copy + Default + Hash, const N: usize> Hash for InlineVec<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_vec_rejects_push_past_capacity() {
        let mut v = BoundedVec::with_capacity(2);
        assert!(v.try_push(1).is_ok());
        assert!(v.try_push(2).is_ok());
        assert!(v.is_full());
        assert_eq!(v.try_push(3), Err(CapacityError { capacity: 2 }));
        assert_eq!(v.as_slice(), &[1, 2]);
    }

    #[test]
    fn bounded_vec_clear_keeps_capacity() {
        let mut v = BoundedVec::with_capacity(3);
        v.try_push('a').unwrap();
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 3);
        for c in ['x', 'y', 'z'] {
            v.try_push(c).unwrap();
        }
        assert_eq!(v.as_slice(), &['x', 'y', 'z']);
    }

    #[test]
    fn inline_vec_compares_only_live_elements() {
        let mut a: InlineVec<u32, 4> = InlineVec::from_slice(&[1, 2, 3]).unwrap();
        let b: InlineVec<u32, 4> = InlineVec::from_slice(&[1, 2]).unwrap();
        assert_ne!(a, b);

        a.clear();
        a.try_push(1).unwrap();
        a.try_push(2).unwrap();
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "[1, 2]");
    }

    #[test]
    fn inline_vec_from_slice_enforces_capacity() {
        let err = InlineVec::<u8, 2>::from_slice(&[1, 2, 3]).unwrap_err();
        assert_eq!(err.capacity, 2);
    }
}
