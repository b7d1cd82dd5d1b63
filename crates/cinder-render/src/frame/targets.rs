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

//! Window-sized render targets and their recreation on resize.

use cinder_core::renderer::{GraphicsBackend, ResourceDesc, ResourceError, ResourceUsage};
use cinder_core::ResourceHandle;

use crate::registry::ResourceRegistry;
use crate::shader::{DEPTH_FORMAT, MAIN_COLOR_FORMAT};

/// Render targets whose size follows the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTargets {
    /// Off-screen color target the scene and overlay render into.
    pub main_color: ResourceHandle,
    /// Depth target of the main pass.
    pub depth: ResourceHandle,
    /// Current width.
    pub width: u32,
    /// Current height.
    pub height: u32,
}

impl WindowTargets {
    fn main_color_desc(width: u32, height: u32) -> ResourceDesc {
        ResourceDesc::image(
            "main_color",
            width,
            height,
            MAIN_COLOR_FORMAT,
            ResourceUsage::COLOR_TARGET | ResourceUsage::TRANSFER_DST | ResourceUsage::SAMPLED,
        )
    }

    fn depth_desc(width: u32, height: u32) -> ResourceDesc {
        ResourceDesc::image(
            "main_depth",
            width,
            height,
            DEPTH_FORMAT,
            ResourceUsage::DEPTH_TARGET,
        )
    }

    /// Creates the targets at `width` x `height`.
    pub fn create<B: GraphicsBackend>(
        backend: &mut B,
        registry: &mut ResourceRegistry,
        width: u32,
        height: u32,
    ) -> Result<Self, ResourceError> {
        let main_color =
            registry.create_resource(backend, &Self::main_color_desc(width, height))?;
        let depth = match registry.create_resource(backend, &Self::depth_desc(width, height)) {
            Ok(depth) => depth,
            Err(err) => {
                let _ = registry.destroy_resource(backend, main_color);
                return Err(err);
            }
        };
        Ok(Self {
            main_color,
            depth,
            width,
            height,
        })
    }

    /// Replaces the targets with new ones at `width` x `height`.
    ///
    /// The new targets are created first, every descriptor bound to an old
    /// target is rewritten to the new one, and only then are the old targets
    /// destroyed. No descriptor is ever left pointing at a destroyed image.
    ///
    /// If a rewrite fails, descriptors are pointed back at the old targets,
    /// the new ones are destroyed and `self` is left unchanged.
    pub fn recreate<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        registry: &mut ResourceRegistry,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        let next = Self::create(backend, registry, width, height)?;
        let rebound = match next.take_bindings_from(backend, registry, self) {
            Ok(rebound) => rebound,
            Err(err) => {
                log::warn!("Rebinding to recreated window targets failed: {err}");
                if let Err(restore) = self.take_bindings_from(backend, registry, &next) {
                    log::error!("Failed to restore descriptors to the old targets: {restore}");
                }
                for image in [next.main_color, next.depth] {
                    if let Err(cleanup) = registry.destroy_resource(backend, image) {
                        log::warn!("Failed to destroy abandoned target {image:?}: {cleanup}");
                    }
                }
                return Err(err);
            }
        };

        let old = std::mem::replace(self, next);
        registry.destroy_resource(backend, old.main_color)?;
        registry.destroy_resource(backend, old.depth)?;
        log::debug!(
            "Window targets recreated at {width}x{height} ({:?} -> {:?}, {rebound} descriptors rewritten)",
            old.main_color,
            self.main_color
        );
        Ok(())
    }

    /// Rewrites every descriptor bound to one of `from`'s targets to the
    /// matching target of `self`.
    fn take_bindings_from<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        registry: &mut ResourceRegistry,
        from: &Self,
    ) -> Result<usize, ResourceError> {
        Ok(registry.rebind(backend, from.main_color, self.main_color)?
            + registry.rebind(backend, from.depth, self.depth)?)
    }

    /// Destroys both targets. Descriptors bound to them must already be gone.
    pub fn destroy<B: GraphicsBackend>(
        self,
        backend: &mut B,
        registry: &mut ResourceRegistry,
    ) -> Result<(), ResourceError> {
        registry.destroy_resource(backend, self.main_color)?;
        registry.destroy_resource(backend, self.depth)
    }
}
