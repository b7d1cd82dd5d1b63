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

//! The Resource & Descriptor System.
//!
//! [`ResourceRegistry`] wraps the backend's resource and descriptor calls and
//! keeps enough bookkeeping to guard the lifetime rules the backend cannot
//! check cheaply: descriptor writes are validated against their layout before
//! they reach the backend, and a resource bound by a live descriptor cannot be
//! destroyed.

use std::collections::HashMap;

use cinder_core::renderer::{
    DescriptorLayout, DescriptorLayoutId, DescriptorSetData, GraphicsBackend, ResourceDesc,
    ResourceError,
};
use cinder_core::{DescriptorHandle, ResourceHandle};

#[derive(Debug, Clone, Copy)]
struct TrackedDescriptor {
    layout: DescriptorLayoutId,
    data: Option<DescriptorSetData>,
}

/// Tracks every resource, layout and descriptor created through it.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: HashMap<ResourceHandle, ResourceDesc>,
    layouts: HashMap<DescriptorLayoutId, DescriptorLayout>,
    descriptors: HashMap<DescriptorHandle, TrackedDescriptor>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer or image. The handle stays valid until
    /// [`destroy_resource`](Self::destroy_resource).
    pub fn create_resource<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        desc: &ResourceDesc,
    ) -> Result<ResourceHandle, ResourceError> {
        let handle = backend.create_resource(desc)?;
        self.resources.insert(handle, *desc);
        log::trace!("Registered resource '{}' as {handle:?}", desc.label);
        Ok(handle)
    }

    /// Destroys a resource.
    ///
    /// Fails with [`ResourceError::StillReferenced`] while a live descriptor
    /// binds `handle`: destroy or rewrite the descriptor first.
    pub fn destroy_resource<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        handle: ResourceHandle,
    ) -> Result<(), ResourceError> {
        if !self.resources.contains_key(&handle) {
            return Err(ResourceError::UnknownResource(handle));
        }
        if let Some(descriptor) = self.referencing_descriptors(handle).first() {
            return Err(ResourceError::StillReferenced {
                resource: handle,
                descriptor: *descriptor,
            });
        }
        backend.destroy_resource(handle)?;
        self.resources.remove(&handle);
        Ok(())
    }

    /// Registers a descriptor layout under `id`. Each id is registered once.
    pub fn create_descriptor_layout<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        id: DescriptorLayoutId,
        layout: &DescriptorLayout,
    ) -> Result<(), ResourceError> {
        if self.layouts.contains_key(&id) {
            return Err(ResourceError::LayoutAlreadyRegistered(id));
        }
        backend.create_descriptor_layout(id, layout)?;
        self.layouts.insert(id, *layout);
        Ok(())
    }

    /// Allocates a descriptor set shaped to layout `id`.
    pub fn create_descriptor<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        id: DescriptorLayoutId,
    ) -> Result<DescriptorHandle, ResourceError> {
        if !self.layouts.contains_key(&id) {
            return Err(ResourceError::UnknownLayout(id));
        }
        let handle = backend.create_descriptor(id)?;
        self.descriptors.insert(
            handle,
            TrackedDescriptor {
                layout: id,
                data: None,
            },
        );
        Ok(handle)
    }

    /// Binds `data` into every slot of `descriptor`.
    ///
    /// The write is checked against the layout first: it must fill every
    /// declared slot with a live resource of the matching kind. A rejected
    /// write is a programming error; it panics in debug builds and leaves
    /// the descriptor untouched otherwise.
    pub fn write_descriptor<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        id: DescriptorLayoutId,
        descriptor: DescriptorHandle,
        data: &DescriptorSetData,
    ) -> Result<(), ResourceError> {
        if let Err(err) = self.check_write(id, descriptor, data) {
            if cfg!(debug_assertions) {
                panic!("invalid descriptor write: {err}");
            }
            log::error!("Rejected descriptor write: {err}");
            return Err(err);
        }
        backend.write_descriptor(id, descriptor, data)?;
        if let Some(tracked) = self.descriptors.get_mut(&descriptor) {
            tracked.data = Some(*data);
        }
        Ok(())
    }

    fn check_write(
        &self,
        id: DescriptorLayoutId,
        descriptor: DescriptorHandle,
        data: &DescriptorSetData,
    ) -> Result<(), ResourceError> {
        let layout = self
            .layouts
            .get(&id)
            .ok_or(ResourceError::UnknownLayout(id))?;
        let tracked = self
            .descriptors
            .get(&descriptor)
            .ok_or(ResourceError::UnknownDescriptor(descriptor))?;
        if tracked.layout != id {
            return Err(ResourceError::LayoutMismatch {
                descriptor,
                expected: tracked.layout,
                actual: id,
            });
        }
        layout.check_shape(id, data)?;
        for (slot, (&kind, &handle)) in layout.slots().iter().zip(data.handles()).enumerate() {
            let desc = self
                .resources
                .get(&handle)
                .ok_or(ResourceError::UnknownResource(handle))?;
            if !kind.accepts(desc) {
                return Err(ResourceError::SlotKindMismatch {
                    layout: id,
                    slot,
                    expected: kind,
                    resource: handle,
                });
            }
        }
        Ok(())
    }

    /// Frees one descriptor set.
    pub fn destroy_descriptor<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        descriptor: DescriptorHandle,
    ) -> Result<(), ResourceError> {
        if !self.descriptors.contains_key(&descriptor) {
            return Err(ResourceError::UnknownDescriptor(descriptor));
        }
        backend.destroy_descriptor(descriptor)?;
        self.descriptors.remove(&descriptor);
        Ok(())
    }

    /// Tears down every descriptor set and layout in one call. Shutdown only.
    pub fn destroy_all_descriptors<B: GraphicsBackend>(&mut self, backend: &mut B) {
        backend.destroy_all_descriptors();
        log::debug!(
            "Destroyed {} descriptors and {} layouts",
            self.descriptors.len(),
            self.layouts.len()
        );
        self.descriptors.clear();
        self.layouts.clear();
    }

    /// Destroys every resource no live descriptor binds, in handle order.
    ///
    /// Failures are logged and skipped. Returns the number destroyed.
    pub fn destroy_all_resources<B: GraphicsBackend>(&mut self, backend: &mut B) -> usize {
        let mut handles: Vec<_> = self.resources.keys().copied().collect();
        handles.sort();
        let mut destroyed = 0;
        for handle in handles {
            match self.destroy_resource(backend, handle) {
                Ok(()) => destroyed += 1,
                Err(err) => log::warn!("Failed to destroy {handle:?}: {err}"),
            }
        }
        destroyed
    }

    /// Rewrites every descriptor bound to `old` so it binds `new` instead.
    ///
    /// Returns the number of descriptors rewritten.
    pub fn rebind<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        old: ResourceHandle,
        new: ResourceHandle,
    ) -> Result<usize, ResourceError> {
        let referencing = self.referencing_descriptors(old);
        for &descriptor in &referencing {
            let Some(tracked) = self.descriptors.get(&descriptor).copied() else {
                continue;
            };
            if let Some(data) = tracked.data {
                let data = data.replacing(old, new);
                self.write_descriptor(backend, tracked.layout, descriptor, &data)?;
            }
        }
        Ok(referencing.len())
    }

    /// Live descriptors whose last write binds `handle`.
    pub fn referencing_descriptors(&self, handle: ResourceHandle) -> Vec<DescriptorHandle> {
        let mut found: Vec<_> = self
            .descriptors
            .iter()
            .filter(|(_, d)| d.data.is_some_and(|data| data.references(handle)))
            .map(|(&h, _)| h)
            .collect();
        found.sort();
        found
    }

    /// The handles last written into `descriptor`, in slot order.
    pub fn bound_handles(&self, descriptor: DescriptorHandle) -> Option<&[ResourceHandle]> {
        self.descriptors
            .get(&descriptor)
            .and_then(|d| d.data.as_ref())
            .map(DescriptorSetData::handles)
    }

    /// The description a live resource was created with.
    pub fn resource_desc(&self, handle: ResourceHandle) -> Option<&ResourceDesc> {
        self.resources.get(&handle)
    }

    /// Copies `bytes` into a host-visible buffer at `offset`.
    pub fn write_mapped<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        handle: ResourceHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<(), ResourceError> {
        if !self.resources.contains_key(&handle) {
            return Err(ResourceError::UnknownResource(handle));
        }
        let mapped = backend.map_resource(handle)?;
        let size = mapped.len();
        let result = match mapped.get_mut(offset..offset.saturating_add(bytes.len())) {
            Some(dst) => {
                dst.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(ResourceError::OutOfBounds {
                resource: handle,
                len: offset.saturating_add(bytes.len()),
                size,
            }),
        };
        backend.unmap_resource(handle)?;
        result
    }

    /// Number of live resources.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Number of live descriptors.
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of registered layouts.
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::renderer::{DescriptorSlotKind, ImageFormat, ResourceUsage};
    use cinder_infra::HeadlessBackend;

    fn setup() -> (HeadlessBackend, ResourceRegistry) {
        let mut backend = HeadlessBackend::new();
        backend.create_context(16, 16).unwrap();
        (backend, ResourceRegistry::new())
    }

    fn sampled_image(
        backend: &mut HeadlessBackend,
        registry: &mut ResourceRegistry,
    ) -> ResourceHandle {
        registry
            .create_resource(
                backend,
                &ResourceDesc::image("x", 4, 4, ImageFormat::Rgba8Unorm, ResourceUsage::SAMPLED),
            )
            .unwrap()
    }

    #[test]
    fn write_then_read_back_bound_handles() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[
            DescriptorSlotKind::SampledImage,
            DescriptorSlotKind::UniformBuffer,
        ])
        .unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(5), &layout)
            .unwrap();
        let image = sampled_image(&mut backend, &mut registry);
        let ubo = registry
            .create_resource(
                &mut backend,
                &ResourceDesc::buffer("ubo", 64, ResourceUsage::UNIFORM),
            )
            .unwrap();
        let set = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(5))
            .unwrap();
        let data = DescriptorSetData::new(&[image, ubo]).unwrap();
        registry
            .write_descriptor(&mut backend, DescriptorLayoutId(5), set, &data)
            .unwrap();

        assert_eq!(registry.bound_handles(set), Some(&[image, ubo][..]));
        assert_eq!(backend.descriptor_data(set), Some(data));
    }

    // Layout 7 with one sampled-image slot: the bound resource outlives
    // the descriptor, never the other way round.
    #[test]
    fn destroying_a_bound_resource_is_refused() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[DescriptorSlotKind::SampledImage]).unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(7), &layout)
            .unwrap();
        let set = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(7))
            .unwrap();
        let x = sampled_image(&mut backend, &mut registry);
        registry
            .write_descriptor(
                &mut backend,
                DescriptorLayoutId(7),
                set,
                &DescriptorSetData::new(&[x]).unwrap(),
            )
            .unwrap();

        assert_eq!(
            registry.destroy_resource(&mut backend, x),
            Err(ResourceError::StillReferenced {
                resource: x,
                descriptor: set
            })
        );
        assert!(backend.contains_resource(x));

        registry.destroy_descriptor(&mut backend, set).unwrap();
        registry.destroy_resource(&mut backend, x).unwrap();
        assert!(!backend.contains_resource(x));
    }

    #[test]
    fn duplicate_layout_id_is_an_error() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[DescriptorSlotKind::StorageBuffer]).unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(1), &layout)
            .unwrap();
        assert_eq!(
            registry.create_descriptor_layout(&mut backend, DescriptorLayoutId(1), &layout),
            Err(ResourceError::LayoutAlreadyRegistered(DescriptorLayoutId(1)))
        );
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "invalid descriptor write"))]
    fn partial_write_is_rejected() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[
            DescriptorSlotKind::SampledImage,
            DescriptorSlotKind::SampledImage,
        ])
        .unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(2), &layout)
            .unwrap();
        let set = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(2))
            .unwrap();
        let x = sampled_image(&mut backend, &mut registry);

        let result = registry.write_descriptor(
            &mut backend,
            DescriptorLayoutId(2),
            set,
            &DescriptorSetData::new(&[x]).unwrap(),
        );
        assert!(matches!(result, Err(ResourceError::SlotCountMismatch { .. })));
        assert_eq!(registry.bound_handles(set), None);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "invalid descriptor write"))]
    fn buffer_in_image_slot_is_rejected() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[DescriptorSlotKind::SampledImage]).unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(4), &layout)
            .unwrap();
        let set = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(4))
            .unwrap();
        let buffer = registry
            .create_resource(
                &mut backend,
                &ResourceDesc::buffer("ssbo", 32, ResourceUsage::STORAGE),
            )
            .unwrap();

        let result = registry.write_descriptor(
            &mut backend,
            DescriptorLayoutId(4),
            set,
            &DescriptorSetData::new(&[buffer]).unwrap(),
        );
        assert_eq!(
            result,
            Err(ResourceError::SlotKindMismatch {
                layout: DescriptorLayoutId(4),
                slot: 0,
                expected: DescriptorSlotKind::SampledImage,
                resource: buffer,
            })
        );
        // Nothing reached the backend.
        assert_eq!(backend.descriptor_data(set), None);
        assert_eq!(registry.bound_handles(set), None);
    }

    #[test]
    fn destroy_all_resources_skips_bound_ones() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[DescriptorSlotKind::SampledImage]).unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(6), &layout)
            .unwrap();
        let bound = sampled_image(&mut backend, &mut registry);
        let free = sampled_image(&mut backend, &mut registry);
        let set = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(6))
            .unwrap();
        registry
            .write_descriptor(
                &mut backend,
                DescriptorLayoutId(6),
                set,
                &DescriptorSetData::new(&[bound]).unwrap(),
            )
            .unwrap();

        assert_eq!(registry.destroy_all_resources(&mut backend), 1);
        assert!(backend.contains_resource(bound));
        assert!(!backend.contains_resource(free));

        registry.destroy_all_descriptors(&mut backend);
        assert_eq!(registry.destroy_all_resources(&mut backend), 1);
        assert_eq!(registry.resource_count(), 0);
        assert_eq!(backend.live_resource_count(), 0);
    }

    #[test]
    fn rebind_moves_every_reference() {
        let (mut backend, mut registry) = setup();
        let layout = DescriptorLayout::new(&[DescriptorSlotKind::SampledImage]).unwrap();
        registry
            .create_descriptor_layout(&mut backend, DescriptorLayoutId(3), &layout)
            .unwrap();
        let old = sampled_image(&mut backend, &mut registry);
        let new = sampled_image(&mut backend, &mut registry);
        let a = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(3))
            .unwrap();
        let b = registry
            .create_descriptor(&mut backend, DescriptorLayoutId(3))
            .unwrap();
        for set in [a, b] {
            registry
                .write_descriptor(
                    &mut backend,
                    DescriptorLayoutId(3),
                    set,
                    &DescriptorSetData::new(&[old]).unwrap(),
                )
                .unwrap();
        }

        assert_eq!(registry.rebind(&mut backend, old, new).unwrap(), 2);
        assert!(registry.referencing_descriptors(old).is_empty());
        assert_eq!(registry.referencing_descriptors(new), vec![a, b]);
        registry.destroy_resource(&mut backend, old).unwrap();
    }

    #[test]
    fn write_mapped_checks_bounds_and_unmaps() {
        let (mut backend, mut registry) = setup();
        let buffer = registry
            .create_resource(
                &mut backend,
                &ResourceDesc::buffer("b", 8, ResourceUsage::STORAGE | ResourceUsage::HOST_VISIBLE),
            )
            .unwrap();
        registry
            .write_mapped(&mut backend, buffer, 4, &[1, 2, 3, 4])
            .unwrap();
        assert_eq!(
            backend.resource_bytes(buffer),
            Some(&[0, 0, 0, 0, 1, 2, 3, 4][..])
        );

        let err = registry
            .write_mapped(&mut backend, buffer, 6, &[0; 4])
            .unwrap_err();
        assert!(matches!(
            err,
            ResourceError::OutOfBounds {
                len: 10,
                size: 8,
                ..
            }
        ));
        // The failed write still unmapped the buffer.
        registry.write_mapped(&mut backend, buffer, 0, &[9]).unwrap();
    }
}
