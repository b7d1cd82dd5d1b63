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

use bytemuck::{Pod, Zeroable};
use cinder_core::renderer::{
    DescriptorLayoutId, DescriptorSetData, GraphicsBackend, ResourceDesc, ResourceError,
    ResourceUsage,
};
use cinder_core::{DescriptorHandle, ResourceHandle};

use crate::registry::ResourceRegistry;

/// A vertex pulled from the vertex-buffer descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlitVertex {
    /// Clip-space position.
    pub position: [f32; 2],
    /// Texture coordinate into the main color target.
    pub uv: [f32; 2],
}

/// One triangle covering the whole target; the overhang is clipped.
pub const FULLSCREEN_TRIANGLE: [BlitVertex; 3] = [
    BlitVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    BlitVertex {
        position: [3.0, -1.0],
        uv: [2.0, 1.0],
    },
    BlitVertex {
        position: [-1.0, 3.0],
        uv: [0.0, -1.0],
    },
];

/// Static geometry created at initialization: the full-target triangle used
/// by the swap chain blit.
#[derive(Debug, Clone, Copy)]
pub struct DefaultGeometry {
    /// Storage buffer holding [`FULLSCREEN_TRIANGLE`].
    pub vertex_buffer: ResourceHandle,
    /// Descriptor binding `vertex_buffer` under [`DescriptorLayoutId::VERTEX_BUFFER`].
    pub vertex_descriptor: DescriptorHandle,
}

impl DefaultGeometry {
    /// Number of vertices drawn by the blit.
    pub const VERTEX_COUNT: u32 = FULLSCREEN_TRIANGLE.len() as u32;

    /// Creates and fills the vertex buffer and its descriptor.
    pub fn create<B: GraphicsBackend>(
        backend: &mut B,
        registry: &mut ResourceRegistry,
    ) -> Result<Self, ResourceError> {
        let bytes: &[u8] = bytemuck::cast_slice(&FULLSCREEN_TRIANGLE);
        let vertex_buffer = registry.create_resource(
            backend,
            &ResourceDesc::buffer(
                "default_geometry",
                bytes.len() as u64,
                ResourceUsage::STORAGE | ResourceUsage::HOST_VISIBLE,
            ),
        )?;
        registry.write_mapped(backend, vertex_buffer, 0, bytes)?;

        let vertex_descriptor =
            registry.create_descriptor(backend, DescriptorLayoutId::VERTEX_BUFFER)?;
        registry.write_descriptor(
            backend,
            DescriptorLayoutId::VERTEX_BUFFER,
            vertex_descriptor,
            &DescriptorSetData::new(&[vertex_buffer])?,
        )?;
        Ok(Self {
            vertex_buffer,
            vertex_descriptor,
        })
    }

    /// Destroys the vertex buffer. Its descriptor must already be gone.
    pub fn destroy<B: GraphicsBackend>(
        self,
        backend: &mut B,
        registry: &mut ResourceRegistry,
    ) -> Result<(), ResourceError> {
        registry.destroy_resource(backend, self.vertex_buffer)
    }
}
