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

//! Opaque identifiers into backend-owned object tables.
//!
//! The renderer never owns GPU objects directly. It refers to them through
//! small index types that the backend hands out, each reserving `u32::MAX` as
//! an "invalid" sentinel. The types are distinct so a descriptor handle can
//! never be passed where a resource handle is expected.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Reserved sentinel that never names a live object.
            pub const INVALID: Self = Self(u32::MAX);

            /// Returns `true` unless this is the [`Self::INVALID`] sentinel.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_handle! {
    /// Identifies a GPU-visible resource (a linear buffer or an image).
    ResourceHandle
}

define_handle! {
    /// Identifies one descriptor-set instance allocated from a layout.
    DescriptorHandle
}

define_handle! {
    /// Identifies a compiled pipeline permutation.
    PipelineHandle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handles_are_invalid() {
        assert_eq!(ResourceHandle::default(), ResourceHandle::INVALID);
        assert!(!DescriptorHandle::default().is_valid());
        assert!(!PipelineHandle::INVALID.is_valid());
    }

    #[test]
    fn zero_is_a_valid_handle() {
        assert!(ResourceHandle(0).is_valid());
        assert_ne!(ResourceHandle(0), ResourceHandle(1));
    }
}
