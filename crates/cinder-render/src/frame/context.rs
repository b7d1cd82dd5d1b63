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

//! State created at initialization and shared by every frame.

use std::time::Instant;

use cinder_core::renderer::{
    DescriptorLayoutId, DescriptorSetData, GraphicsBackend, GraphicsCommandStream, RenderPass,
    RenderStats, RendererConfig, ResourceDesc, ResourceError, ResourceUsage,
};
use cinder_core::{DescriptorHandle, ResourceHandle};

use super::animated::AnimatedQuads;
use super::camera::Camera;
use super::error::FrameError;
use super::geometry::DefaultGeometry;
use super::global::GlobalData;
use super::targets::WindowTargets;
use crate::registry::ResourceRegistry;
use crate::shader::ShaderManager;

/// Everything created at initialization and threaded through every frame,
/// resize and teardown.
#[derive(Debug)]
pub struct FrameContext {
    /// Configuration the context was created with.
    pub config: RendererConfig,
    /// The per-frame command stream.
    pub stream: GraphicsCommandStream,
    /// Resource and descriptor bookkeeping.
    pub registry: ResourceRegistry,
    /// Compiled shaders and pipeline permutations.
    pub shaders: ShaderManager,
    /// Window-sized render targets.
    pub targets: WindowTargets,
    /// Scene pass into the main color and depth targets.
    pub main_pass: RenderPass,
    /// Overlay pass into the main color target.
    pub overlay_pass: RenderPass,
    /// Blit pass into the acquired swap chain image.
    pub blit_pass: RenderPass,
    /// CPU copy of the global uniform data.
    pub global: GlobalData,
    /// Scene camera feeding [`GlobalData::view_projection`].
    pub camera: Camera,
    /// Uniform buffer holding [`GlobalData`].
    pub global_buffer: ResourceHandle,
    /// Descriptor binding `global_buffer`.
    pub global_descriptor: DescriptorHandle,
    /// Descriptor binding the main color target for the blit.
    pub blit_descriptor: DescriptorHandle,
    /// Static blit geometry.
    pub geometry: DefaultGeometry,
    /// Animated scene content.
    pub animated: AnimatedQuads,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
    /// Cursor position in window pixels.
    pub cursor: [f32; 2],
    /// Whether the overlay pass is recorded.
    pub overlay_visible: bool,
    /// Statistics of the last submitted frame.
    pub stats: RenderStats,
    started: Instant,
}

/// Everything [`FrameContext::create`] allocates after the shaders.
struct WindowResources {
    targets: WindowTargets,
    global_buffer: ResourceHandle,
    global_descriptor: DescriptorHandle,
    blit_descriptor: DescriptorHandle,
    geometry: DefaultGeometry,
    animated: AnimatedQuads,
}

impl WindowResources {
    fn create<B: GraphicsBackend>(
        backend: &mut B,
        registry: &mut ResourceRegistry,
        config: &RendererConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, FrameError> {
        let targets = WindowTargets::create(backend, registry, width, height)?;

        let global_buffer = registry.create_resource(
            backend,
            &ResourceDesc::buffer(
                "global_data",
                std::mem::size_of::<GlobalData>() as u64,
                ResourceUsage::UNIFORM | ResourceUsage::HOST_VISIBLE,
            ),
        )?;
        let global_descriptor =
            registry.create_descriptor(backend, DescriptorLayoutId::GLOBAL_DATA)?;
        registry.write_descriptor(
            backend,
            DescriptorLayoutId::GLOBAL_DATA,
            global_descriptor,
            &DescriptorSetData::new(&[global_buffer]).map_err(ResourceError::from)?,
        )?;

        let blit_descriptor =
            registry.create_descriptor(backend, DescriptorLayoutId::SWAPCHAIN_BLIT)?;
        registry.write_descriptor(
            backend,
            DescriptorLayoutId::SWAPCHAIN_BLIT,
            blit_descriptor,
            &DescriptorSetData::new(&[targets.main_color]).map_err(ResourceError::from)?,
        )?;

        let geometry = DefaultGeometry::create(backend, registry)?;
        let animated = AnimatedQuads::create(backend, registry, config.animated_quads)?;

        Ok(Self {
            targets,
            global_buffer,
            global_descriptor,
            blit_descriptor,
            geometry,
            animated,
        })
    }
}

impl FrameContext {
    /// Builds the context on a backend whose graphics context already exists.
    ///
    /// On failure every descriptor, resource and pipeline created so far is
    /// released before the error is returned, leaving only the graphics
    /// context itself.
    pub fn create<B: GraphicsBackend>(
        backend: &mut B,
        config: &RendererConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, FrameError> {
        let stream = GraphicsCommandStream::new(config.command_capacity);
        let mut registry = ResourceRegistry::new();
        let mut shaders = ShaderManager::new(config.shader_dir.clone())
            .with_arena_limit(config.shader_arena_limit);

        let created = shaders
            .load_all_shader_resources(backend, &mut registry, width, height)
            .map_err(FrameError::from)
            .and_then(|()| WindowResources::create(backend, &mut registry, config, width, height));
        let resources = match created {
            Ok(resources) => resources,
            Err(err) => {
                release_partial(backend, &mut registry, &mut shaders);
                return Err(err);
            }
        };

        let camera = Camera::default();
        let mut context = Self {
            config: config.clone(),
            stream,
            registry,
            shaders,
            targets: resources.targets,
            main_pass: RenderPass::init(),
            overlay_pass: RenderPass::init(),
            blit_pass: RenderPass::init(),
            global: GlobalData::new(&camera, width, height),
            camera,
            global_buffer: resources.global_buffer,
            global_descriptor: resources.global_descriptor,
            blit_descriptor: resources.blit_descriptor,
            geometry: resources.geometry,
            animated: resources.animated,
            width,
            height,
            cursor: [width as f32 * 0.5, height as f32 * 0.5],
            overlay_visible: config.overlay_enabled,
            stats: RenderStats::default(),
            started: Instant::now(),
        };
        if let Err(err) = context.configure_passes(backend.max_color_targets()) {
            release_partial(backend, &mut context.registry, &mut context.shaders);
            return Err(err);
        }
        Ok(context)
    }

    /// Points the main and overlay passes at the current window targets.
    pub fn configure_passes(&mut self, max_color_targets: usize) -> Result<(), FrameError> {
        let (w, h) = (self.width, self.height);
        self.main_pass.configure(
            w,
            h,
            &[self.targets.main_color],
            Some(self.targets.depth),
            max_color_targets,
            "main",
        )?;
        self.overlay_pass.configure(
            w,
            h,
            &[self.targets.main_color],
            None,
            max_color_targets,
            "overlay",
        )?;
        Ok(())
    }

    /// Adopts a new window size: projection, passes and cursor bounds.
    ///
    /// The window targets must already have been recreated at this size.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        max_color_targets: usize,
    ) -> Result<(), FrameError> {
        self.width = width;
        self.height = height;
        self.global.resize(&self.camera, width, height);
        self.cursor = [
            self.cursor[0].clamp(0.0, width as f32),
            self.cursor[1].clamp(0.0, height as f32),
        ];
        self.configure_passes(max_color_targets)
    }

    /// Seconds since the context was created.
    pub fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

fn release_partial<B: GraphicsBackend>(
    backend: &mut B,
    registry: &mut ResourceRegistry,
    shaders: &mut ShaderManager,
) {
    registry.destroy_all_descriptors(backend);
    let released = registry.destroy_all_resources(backend);
    shaders.shutdown(backend);
    log::warn!("Released {released} resources of a partially created frame context");
}
