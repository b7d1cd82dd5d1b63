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

//! Buffer and image descriptions passed to resource creation.

use std::ops::BitOr;

use super::Label;

/// Pixel format of an image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// 8-bit RGBA, normalized.
    #[default]
    Rgba8Unorm,
    /// 8-bit BGRA in the sRGB color space. Common swap chain format.
    Bgra8UnormSrgb,
    /// 16-bit float RGBA. Used for the main HDR color target.
    Rgba16Float,
    /// 32-bit float depth.
    Depth32Float,
}

impl ImageFormat {
    /// Returns `true` for depth formats.
    pub fn is_depth(self) -> bool {
        matches!(self, ImageFormat::Depth32Float)
    }
}

/// A set of flags describing how a resource will be used.
///
/// Backends use these to choose a memory type and to validate bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceUsage(u32);

impl ResourceUsage {
    /// Bindable as a uniform buffer.
    pub const UNIFORM: Self = Self(1 << 0);
    /// Bindable as a storage buffer.
    pub const STORAGE: Self = Self(1 << 1);
    /// Usable as vertex input.
    pub const VERTEX: Self = Self(1 << 2);
    /// Bindable as a sampled image.
    pub const SAMPLED: Self = Self(1 << 3);
    /// Usable as a color render target.
    pub const COLOR_TARGET: Self = Self(1 << 4);
    /// Usable as a depth render target.
    pub const DEPTH_TARGET: Self = Self(1 << 5);
    /// Usable as the destination of a clear or copy.
    pub const TRANSFER_DST: Self = Self(1 << 6);
    /// Placed in CPU-visible memory so it can be mapped.
    pub const HOST_VISIBLE: Self = Self(1 << 7);

    /// No usage at all.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for ResourceUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Whether a resource is a linear buffer or an image, with its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A linear buffer of `size` bytes.
    Buffer {
        /// Size in bytes.
        size: u64,
    },
    /// A 2D image.
    Image {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Pixel format.
        format: ImageFormat,
    },
}

/// Everything a backend needs to create a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceDesc {
    /// Debug label.
    pub label: Label,
    /// Kind and dimensions.
    pub kind: ResourceKind,
    /// Intended usages.
    pub usage: ResourceUsage,
}

impl ResourceDesc {
    /// Describes a linear buffer.
    pub fn buffer(label: Label, size: u64, usage: ResourceUsage) -> Self {
        Self {
            label,
            kind: ResourceKind::Buffer { size },
            usage,
        }
    }

    /// Describes a 2D image.
    pub fn image(
        label: Label,
        width: u32,
        height: u32,
        format: ImageFormat,
        usage: ResourceUsage,
    ) -> Self {
        Self {
            label,
            kind: ResourceKind::Image {
                width,
                height,
                format,
            },
            usage,
        }
    }

    /// Returns `true` if this describes an image.
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ResourceKind::Image { .. })
    }

    /// Byte size of a buffer, `None` for images.
    pub fn buffer_size(&self) -> Option<u64> {
        match self.kind {
            ResourceKind::Buffer { size } => Some(size),
            ResourceKind::Image { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_combine() {
        let usage = ResourceUsage::UNIFORM | ResourceUsage::HOST_VISIBLE;
        assert!(usage.contains(ResourceUsage::UNIFORM));
        assert!(usage.contains(ResourceUsage::HOST_VISIBLE));
        assert!(!usage.contains(ResourceUsage::STORAGE));
        assert!(usage.contains(ResourceUsage::empty()));
    }

    #[test]
    fn descriptor_helpers_fill_kind() {
        let buf = ResourceDesc::buffer("globals", 80, ResourceUsage::UNIFORM);
        assert_eq!(buf.buffer_size(), Some(80));
        assert!(!buf.is_image());

        let img = ResourceDesc::image(
            "main color",
            4,
            2,
            ImageFormat::Rgba16Float,
            ResourceUsage::SAMPLED,
        );
        assert!(img.is_image());
        assert_eq!(img.buffer_size(), None);
    }
}
