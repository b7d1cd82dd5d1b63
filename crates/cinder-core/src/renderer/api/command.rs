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

//! The backend-agnostic operations recorded into a [`GraphicsCommandStream`].
//!
//! Each [`GraphicsCommand`] variant carries exactly the fields its operation
//! needs. A backend consumes commands strictly in append order.
//!
//! [`GraphicsCommandStream`]: super::GraphicsCommandStream

use crate::handle::{DescriptorHandle, PipelineHandle, ResourceHandle};
use crate::memory::InlineVec;

use super::Label;

/// Upper bound on simultaneous color targets a render pass may declare.
///
/// A backend may report a lower limit through
/// [`GraphicsBackend::max_color_targets`](crate::renderer::traits::GraphicsBackend::max_color_targets).
pub const MAX_COLOR_TARGETS: usize = 8;

/// Upper bound on descriptor sets bound by a single draw call.
pub const MAX_BOUND_DESCRIPTORS: usize = 4;

/// Ordered color target handles of a render pass.
pub type ColorTargets = InlineVec<ResourceHandle, MAX_COLOR_TARGETS>;

/// Ordered descriptor sets bound by a draw call, one per pipeline layout slot.
pub type DescriptorBindings = InlineVec<DescriptorHandle, MAX_BOUND_DESCRIPTORS>;

/// Resource handles named by a single command: every color target plus depth.
pub type CommandResources = InlineVec<ResourceHandle, { MAX_COLOR_TARGETS + 1 }>;

/// The memory layout an image is in, as far as the GPU is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageLayout {
    /// Contents are discarded; valid as the source of any transition.
    #[default]
    Undefined,
    /// Destination of clears and copies.
    TransferDst,
    /// Render-optimal, written by a render pass.
    ColorAttachment,
    /// Read by shaders through a sampled-image slot.
    ShaderReadOnly,
    /// Ready to be presented by the swap chain.
    Present,
}

/// A scissor rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ScissorRect {
    /// A scissor covering a whole `width` x `height` target.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// How a draw's fragment output is combined with the color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendState {
    /// The fragment color replaces the target color.
    #[default]
    Replace,
    /// Standard "over" blending by source alpha.
    AlphaBlend,
    /// Source color is added to the target color.
    Additive,
}

/// Depth testing and face culling of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthState {
    /// No depth test and no culling. Valid in passes without a depth target.
    #[default]
    OffNoCull,
    /// Depth test and depth write, back faces culled.
    TestAndWrite,
    /// Depth test without writing, back faces culled.
    TestOnly,
}

impl DepthState {
    /// Returns `true` if the state reads the depth target.
    pub fn uses_depth(self) -> bool {
        !matches!(self, DepthState::OffNoCull)
    }
}

/// A non-indexed draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// The pipeline permutation to draw with.
    pub pipeline: PipelineHandle,
    /// Descriptor sets bound for the draw, in layout order.
    pub descriptors: DescriptorBindings,
    /// Color blending.
    pub blend: BlendState,
    /// Depth test and culling.
    pub depth: DepthState,
    /// Number of vertices per instance.
    pub vertex_count: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First vertex index.
    pub first_vertex: u32,
    /// First instance index.
    pub first_instance: u32,
    /// Debug label.
    pub label: Label,
}

/// Opens a render pass over a set of targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPassBegin {
    /// Color targets, in attachment order.
    pub color_targets: ColorTargets,
    /// Optional depth target.
    pub depth_target: Option<ResourceHandle>,
    /// Render area width.
    pub width: u32,
    /// Render area height.
    pub height: u32,
    /// Debug label.
    pub label: Label,
}

/// One recorded GPU operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphicsCommand {
    /// Moves `image` from layout `from` to layout `to`.
    LayoutTransition {
        /// The image to transition.
        image: ResourceHandle,
        /// The layout the image is currently in.
        from: ImageLayout,
        /// The layout after the transition.
        to: ImageLayout,
        /// Debug label.
        label: Label,
    },
    /// Clears `image`, which must be in [`ImageLayout::TransferDst`].
    ClearImage {
        /// The image to clear.
        image: ResourceHandle,
        /// Linear RGBA clear color.
        color: [f32; 4],
        /// Debug label.
        label: Label,
    },
    /// A draw inside an open render pass.
    Draw(DrawCall),
    /// Sets the scissor for subsequent draws in the current pass.
    SetScissor(ScissorRect),
    /// Opens a render pass.
    BeginRenderPass(RenderPassBegin),
    /// Closes the currently open render pass.
    EndRenderPass {
        /// Debug label.
        label: Label,
    },
    /// Writes a GPU timestamp.
    Timestamp {
        /// Debug label.
        label: Label,
    },
}

/// Discriminant of a [`GraphicsCommand`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`GraphicsCommand::LayoutTransition`].
    LayoutTransition,
    /// [`GraphicsCommand::ClearImage`].
    ClearImage,
    /// [`GraphicsCommand::Draw`].
    Draw,
    /// [`GraphicsCommand::SetScissor`].
    SetScissor,
    /// [`GraphicsCommand::BeginRenderPass`].
    BeginRenderPass,
    /// [`GraphicsCommand::EndRenderPass`].
    EndRenderPass,
    /// [`GraphicsCommand::Timestamp`].
    Timestamp,
}

impl GraphicsCommand {
    /// The kind of operation this command performs.
    pub fn kind(&self) -> CommandKind {
        match self {
            GraphicsCommand::LayoutTransition { .. } => CommandKind::LayoutTransition,
            GraphicsCommand::ClearImage { .. } => CommandKind::ClearImage,
            GraphicsCommand::Draw(_) => CommandKind::Draw,
            GraphicsCommand::SetScissor(_) => CommandKind::SetScissor,
            GraphicsCommand::BeginRenderPass(_) => CommandKind::BeginRenderPass,
            GraphicsCommand::EndRenderPass { .. } => CommandKind::EndRenderPass,
            GraphicsCommand::Timestamp { .. } => CommandKind::Timestamp,
        }
    }

    /// The debug label, if the command carries one.
    pub fn label(&self) -> Option<Label> {
        match self {
            GraphicsCommand::LayoutTransition { label, .. }
            | GraphicsCommand::ClearImage { label, .. }
            | GraphicsCommand::EndRenderPass { label }
            | GraphicsCommand::Timestamp { label } => Some(*label),
            GraphicsCommand::Draw(draw) => Some(draw.label),
            GraphicsCommand::BeginRenderPass(begin) => Some(begin.label),
            GraphicsCommand::SetScissor(_) => None,
        }
    }

    /// Every resource handle this command names directly.
    pub fn referenced_resources(&self) -> CommandResources {
        let mut out = CommandResources::new();
        match self {
            GraphicsCommand::LayoutTransition { image, .. }
            | GraphicsCommand::ClearImage { image, .. } => {
                let _ = out.try_push(*image);
            }
            GraphicsCommand::BeginRenderPass(begin) => {
                for &target in begin.color_targets.iter().chain(begin.depth_target.iter()) {
                    let _ = out.try_push(target);
                }
            }
            _ => {}
        }
        out
    }

    /// Every descriptor handle this command binds.
    pub fn referenced_descriptors(&self) -> &[DescriptorHandle] {
        match self {
            GraphicsCommand::Draw(draw) => draw.descriptors.as_slice(),
            _ => &[],
        }
    }
}
