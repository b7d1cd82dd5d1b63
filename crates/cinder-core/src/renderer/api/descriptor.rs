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

//! Descriptor layouts and the resource handles written into descriptor sets.

use crate::handle::ResourceHandle;
use crate::memory::{CapacityError, InlineVec};
use crate::renderer::error::ResourceError;

use super::resource::{ResourceDesc, ResourceUsage};

/// Upper bound on the number of slots a descriptor layout may declare.
pub const MAX_DESCRIPTOR_SLOTS: usize = 8;

/// The type of resource a descriptor slot binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DescriptorSlotKind {
    /// An image read through a sampler.
    #[default]
    SampledImage,
    /// A read-only uniform buffer.
    UniformBuffer,
    /// A storage buffer.
    StorageBuffer,
}

impl DescriptorSlotKind {
    /// Returns `true` if a resource described by `desc` can be bound to this slot.
    pub fn accepts(self, desc: &ResourceDesc) -> bool {
        match self {
            DescriptorSlotKind::SampledImage => {
                desc.is_image() && desc.usage.contains(ResourceUsage::SAMPLED)
            }
            DescriptorSlotKind::UniformBuffer => {
                !desc.is_image() && desc.usage.contains(ResourceUsage::UNIFORM)
            }
            DescriptorSlotKind::StorageBuffer => {
                !desc.is_image() && desc.usage.contains(ResourceUsage::STORAGE)
            }
        }
    }
}

/// Enumerated identifier under which a descriptor layout is registered.
///
/// Identifiers are declared once, up front. The associated constants name
/// the layouts the renderer itself uses; applications may declare more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DescriptorLayoutId(pub u32);

impl DescriptorLayoutId {
    /// Per-frame global data (projection, time, viewport).
    pub const GLOBAL_DATA: Self = Self(0);
    /// The main color target sampled by the swap chain blit.
    pub const SWAPCHAIN_BLIT: Self = Self(1);
    /// Vertices pulled from a storage buffer.
    pub const VERTEX_BUFFER: Self = Self(2);
    /// Per-instance data of the animated content.
    pub const INSTANCE_DATA: Self = Self(3);
}

/// The ordered slot types that descriptor sets of one layout conform to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DescriptorLayout {
    slots: InlineVec<DescriptorSlotKind, MAX_DESCRIPTOR_SLOTS>,
}

impl DescriptorLayout {
    /// Declares a layout from its slot types, in binding order.
    pub fn new(slots: &[DescriptorSlotKind]) -> Result<Self, CapacityError> {
        Ok(Self {
            slots: InlineVec::from_slice(slots)?,
        })
    }

    /// Slot types in binding order.
    pub fn slots(&self) -> &[DescriptorSlotKind] {
        &self.slots
    }

    /// Number of declared slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Checks that `data` provides exactly one handle per declared slot.
    pub fn check_shape(
        &self,
        id: DescriptorLayoutId,
        data: &DescriptorSetData,
    ) -> Result<(), ResourceError> {
        if data.len() != self.slot_count() {
            return Err(ResourceError::SlotCountMismatch {
                layout: id,
                expected: self.slot_count(),
                actual: data.len(),
            });
        }
        Ok(())
    }
}

/// The concrete resources bound to every slot of one descriptor set.
///
/// Handles are stored in slot order. A value is always written as a whole;
/// there is no way to update a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DescriptorSetData {
    handles: InlineVec<ResourceHandle, MAX_DESCRIPTOR_SLOTS>,
}

impl DescriptorSetData {
    /// Binds `handles` to slots `0..handles.len()`.
    pub fn new(handles: &[ResourceHandle]) -> Result<Self, CapacityError> {
        Ok(Self {
            handles: InlineVec::from_slice(handles)?,
        })
    }

    /// Bound handles in slot order.
    pub fn handles(&self) -> &[ResourceHandle] {
        &self.handles
    }

    /// Number of bound slots.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no slot is bound.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns `true` if any slot binds `handle`.
    pub fn references(&self, handle: ResourceHandle) -> bool {
        self.handles.contains(&handle)
    }

    /// Returns a copy with every occurrence of `old` replaced by `new`.
    pub fn replacing(&self, old: ResourceHandle, new: ResourceHandle) -> Self {
        let mut out = *self;
        out.handles.clear();
        for &h in self.handles.iter() {
            // Same length as `self`, so this cannot overflow.
            let _ = out.handles.try_push(if h == old { new } else { h });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::ImageFormat;

    #[test]
    fn slot_kinds_accept_matching_resources() {
        let image =
            ResourceDesc::image("img", 8, 8, ImageFormat::Rgba8Unorm, ResourceUsage::SAMPLED);
        let uniform = ResourceDesc::buffer("ubo", 16, ResourceUsage::UNIFORM);
        let storage = ResourceDesc::buffer("ssbo", 16, ResourceUsage::STORAGE);

        assert!(DescriptorSlotKind::SampledImage.accepts(&image));
        assert!(!DescriptorSlotKind::SampledImage.accepts(&uniform));
        assert!(DescriptorSlotKind::UniformBuffer.accepts(&uniform));
        assert!(!DescriptorSlotKind::UniformBuffer.accepts(&storage));
        assert!(DescriptorSlotKind::StorageBuffer.accepts(&storage));
        assert!(!DescriptorSlotKind::StorageBuffer.accepts(&image));
    }

    #[test]
    fn check_shape_rejects_partial_writes() {
        let layout = DescriptorLayout::new(&[
            DescriptorSlotKind::UniformBuffer,
            DescriptorSlotKind::SampledImage,
        ])
        .unwrap();
        let partial = DescriptorSetData::new(&[ResourceHandle(0)]).unwrap();
        let full = DescriptorSetData::new(&[ResourceHandle(0), ResourceHandle(1)]).unwrap();

        let err = layout
            .check_shape(DescriptorLayoutId(9), &partial)
            .unwrap_err();
        assert_eq!(
            err,
            ResourceError::SlotCountMismatch {
                layout: DescriptorLayoutId(9),
                expected: 2,
                actual: 1,
            }
        );
        assert!(layout.check_shape(DescriptorLayoutId(9), &full).is_ok());
    }

    #[test]
    fn replacing_swaps_every_occurrence() {
        let data =
            DescriptorSetData::new(&[ResourceHandle(3), ResourceHandle(4), ResourceHandle(3)])
                .unwrap();
        let swapped = data.replacing(ResourceHandle(3), ResourceHandle(9));
        assert_eq!(
            swapped.handles(),
            &[ResourceHandle(9), ResourceHandle(4), ResourceHandle(9)]
        );
        assert!(!swapped.references(ResourceHandle(3)));
    }

    #[test]
    fn too_many_slots_is_rejected() {
        let slots = [DescriptorSlotKind::StorageBuffer; MAX_DESCRIPTOR_SLOTS + 1];
        assert!(DescriptorLayout::new(&slots).is_err());
    }
}
