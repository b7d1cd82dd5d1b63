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

//! Render pass descriptions and their begin/end recording.

use crate::handle::ResourceHandle;
use crate::renderer::error::PipelineError;

use super::command::{ColorTargets, GraphicsCommand, RenderPassBegin, MAX_COLOR_TARGETS};
use super::stream::GraphicsCommandStream;
use super::Label;

/// Declares the output attachments of one render pass.
///
/// A pass is configuration, not an active object: it never owns the targets
/// it names and is reconfigured in place whenever they change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPass {
    /// Render area width.
    pub width: u32,
    /// Render area height.
    pub height: u32,
    /// Color targets, in attachment order.
    pub color_targets: ColorTargets,
    /// Optional depth target.
    pub depth_target: Option<ResourceHandle>,
    /// Debug label.
    pub label: Label,
}

impl Default for RenderPass {
    fn default() -> Self {
        Self::init()
    }
}

impl RenderPass {
    /// A pass with zero extent and no targets.
    pub fn init() -> Self {
        Self {
            width: 0,
            height: 0,
            color_targets: ColorTargets::new(),
            depth_target: None,
            label: "",
        }
    }

    /// Points the pass at a new set of targets.
    ///
    /// `max_color_targets` is the platform limit reported by the backend; it
    /// is clamped to [`MAX_COLOR_TARGETS`]. On error the pass is unchanged.
    pub fn configure(
        &mut self,
        width: u32,
        height: u32,
        color_targets: &[ResourceHandle],
        depth_target: Option<ResourceHandle>,
        max_color_targets: usize,
        label: Label,
    ) -> Result<(), PipelineError> {
        let limit = max_color_targets.min(MAX_COLOR_TARGETS);
        if color_targets.len() > limit {
            return Err(PipelineError::TooManyColorTargets {
                requested: color_targets.len(),
                limit,
            });
        }
        let targets = ColorTargets::from_slice(color_targets).map_err(|_| {
            PipelineError::TooManyColorTargets {
                requested: color_targets.len(),
                limit,
            }
        })?;

        self.width = width;
        self.height = height;
        self.color_targets = targets;
        self.depth_target = depth_target;
        self.label = label;
        Ok(())
    }

    /// Returns `true` if the pass names `handle` as a color or depth target.
    pub fn targets(&self, handle: ResourceHandle) -> bool {
        self.color_targets.contains(&handle) || self.depth_target == Some(handle)
    }

    /// Appends the begin marker for this pass.
    pub fn start(&self, stream: &mut GraphicsCommandStream) {
        stream.append(GraphicsCommand::BeginRenderPass(RenderPassBegin {
            color_targets: self.color_targets,
            depth_target: self.depth_target,
            width: self.width,
            height: self.height,
            label: self.label,
        }));
    }

    /// Appends the end marker for this pass.
    pub fn end(&self, stream: &mut GraphicsCommandStream) {
        stream.append(GraphicsCommand::EndRenderPass { label: self.label });
    }
}
