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

//! Shader programs and the keys that identify pipeline permutations.

use std::fmt;

use crate::memory::{CapacityError, InlineVec};

use super::command::{MAX_BOUND_DESCRIPTORS, MAX_COLOR_TARGETS};
use super::descriptor::DescriptorLayoutId;
use super::resource::ImageFormat;
use super::Label;

/// A programmable stage of a graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl ShaderStage {
    /// Both stages, in pipeline order.
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    /// File-name component used for compiled artifacts of this stage.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }
}

/// The fixed, enumerated set of shader programs the renderer builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderProgramId {
    /// Scene geometry and animated content, drawn into the main color target.
    Scene,
    /// Overlay UI, drawn on top of the scene.
    Overlay,
    /// Full-target copy of the main color target into the swap chain image.
    Blit,
}

impl ShaderProgramId {
    /// Every program, in build order.
    pub const ALL: [ShaderProgramId; 3] = [
        ShaderProgramId::Scene,
        ShaderProgramId::Overlay,
        ShaderProgramId::Blit,
    ];

    /// File-name stem used for compiled artifacts of this program.
    pub fn name(self) -> &'static str {
        match self {
            ShaderProgramId::Scene => "scene",
            ShaderProgramId::Overlay => "overlay",
            ShaderProgramId::Blit => "blit",
        }
    }
}

impl fmt::Display for ShaderProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything that distinguishes one pipeline permutation from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// The shader program.
    pub program: ShaderProgramId,
    /// Formats of the color targets, in attachment order.
    pub color_formats: InlineVec<ImageFormat, MAX_COLOR_TARGETS>,
    /// Format of the depth target, if any.
    pub depth_format: Option<ImageFormat>,
    /// Descriptor layouts, in set order.
    pub descriptor_layouts: InlineVec<DescriptorLayoutId, MAX_BOUND_DESCRIPTORS>,
    /// Fixed viewport extent baked into the pipeline.
    pub viewport: (u32, u32),
}

impl PipelineKey {
    /// Builds a key, failing if either list exceeds its bound.
    pub fn new(
        program: ShaderProgramId,
        color_formats: &[ImageFormat],
        depth_format: Option<ImageFormat>,
        descriptor_layouts: &[DescriptorLayoutId],
        viewport: (u32, u32),
    ) -> Result<Self, CapacityError> {
        Ok(Self {
            program,
            color_formats: InlineVec::from_slice(color_formats)?,
            depth_format,
            descriptor_layouts: InlineVec::from_slice(descriptor_layouts)?,
            viewport,
        })
    }
}

/// The input to pipeline creation.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a> {
    /// Permutation key.
    pub key: PipelineKey,
    /// Vertex stage bytecode.
    pub vertex_bytecode: &'a [u8],
    /// Fragment stage bytecode.
    pub fragment_bytecode: &'a [u8],
    /// Debug label.
    pub label: Label,
}
