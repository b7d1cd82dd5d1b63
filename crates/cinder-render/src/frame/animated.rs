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
    BlendState, DepthState, DescriptorBindings, DescriptorLayoutId, DescriptorSetData, DrawCall,
    GraphicsBackend, GraphicsCommand, GraphicsCommandStream, ResourceDesc, ResourceError,
    ResourceUsage,
};
use cinder_core::{DescriptorHandle, PipelineHandle, ResourceHandle};

use crate::registry::ResourceRegistry;

/// Per-instance data of one animated quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct QuadInstance {
    /// Center in window pixels.
    pub center: [f32; 2],
    /// Half extent in window pixels.
    pub half_size: [f32; 2],
    /// Linear RGBA color.
    pub color: [f32; 4],
}

/// A ring of quads orbiting the window center, rewritten every frame.
#[derive(Debug)]
pub struct AnimatedQuads {
    instance_buffer: ResourceHandle,
    descriptor: DescriptorHandle,
    instances: Vec<QuadInstance>,
}

impl AnimatedQuads {
    /// Vertices per quad (two triangles, generated in the vertex shader).
    pub const VERTICES_PER_QUAD: u32 = 6;

    /// Creates the instance buffer for `count` quads and its descriptor.
    pub fn create<B: GraphicsBackend>(
        backend: &mut B,
        registry: &mut ResourceRegistry,
        count: u32,
    ) -> Result<Self, ResourceError> {
        let stride = std::mem::size_of::<QuadInstance>() as u64;
        let instance_buffer = registry.create_resource(
            backend,
            &ResourceDesc::buffer(
                "animated_instances",
                stride * u64::from(count.max(1)),
                ResourceUsage::STORAGE | ResourceUsage::HOST_VISIBLE,
            ),
        )?;
        let descriptor = registry.create_descriptor(backend, DescriptorLayoutId::INSTANCE_DATA)?;
        registry.write_descriptor(
            backend,
            DescriptorLayoutId::INSTANCE_DATA,
            descriptor,
            &DescriptorSetData::new(&[instance_buffer])?,
        )?;
        Ok(Self {
            instance_buffer,
            descriptor,
            instances: vec![QuadInstance::default(); count as usize],
        })
    }

    /// Number of quads.
    pub fn count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// The instance storage buffer.
    pub fn instance_buffer(&self) -> ResourceHandle {
        self.instance_buffer
    }

    /// The current instance data.
    pub fn instances(&self) -> &[QuadInstance] {
        &self.instances
    }

    /// Advances the animation to `time` and uploads the instances.
    pub fn update<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        registry: &ResourceRegistry,
        time: f32,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        if self.instances.is_empty() {
            return Ok(());
        }
        let center = [width as f32 * 0.5, height as f32 * 0.5];
        let radius = width.min(height) as f32 * 0.35;
        let half = (radius * 0.1).max(1.0);
        let count = self.instances.len() as f32;

        for (i, instance) in self.instances.iter_mut().enumerate() {
            let phase = i as f32 / count;
            let angle = time * 0.5 + phase * std::f32::consts::TAU;
            *instance = QuadInstance {
                center: [
                    center[0] + radius * angle.cos(),
                    center[1] + radius * angle.sin(),
                ],
                half_size: [half, half],
                color: [phase, 1.0 - phase, 0.5 + 0.5 * (time + phase).sin(), 1.0],
            };
        }
        registry.write_mapped(
            backend,
            self.instance_buffer,
            0,
            bytemuck::cast_slice(&self.instances),
        )
    }

    /// Records the instanced draw of every quad.
    pub fn record(
        &self,
        stream: &mut GraphicsCommandStream,
        pipeline: PipelineHandle,
        global_descriptor: DescriptorHandle,
    ) {
        if self.instances.is_empty() {
            return;
        }
        let mut descriptors = DescriptorBindings::new();
        // Two sets always fit the binding limit.
        let _ = descriptors.try_push(global_descriptor);
        let _ = descriptors.try_push(self.descriptor);
        stream.append(GraphicsCommand::Draw(DrawCall {
            pipeline,
            descriptors,
            vertex_count: Self::VERTICES_PER_QUAD,
            instance_count: self.count(),
            first_vertex: 0,
            first_instance: 0,
            blend: BlendState::Replace,
            depth: DepthState::TestAndWrite,
            label: "animated_quads",
        }));
    }

    /// Destroys the instance buffer. Its descriptor must already be gone.
    pub fn destroy<B: GraphicsBackend>(
        self,
        backend: &mut B,
        registry: &mut ResourceRegistry,
    ) -> Result<(), ResourceError> {
        registry.destroy_resource(backend, self.instance_buffer)
    }
}
