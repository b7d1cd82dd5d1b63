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

//! The fixed set of descriptor layouts and programs the renderer uses.

use cinder_core::renderer::{
    DescriptorLayoutId, DescriptorSlotKind, ImageFormat, PipelineError, PipelineKey,
    ShaderProgramId,
};

/// Format of the off-screen main color target.
pub const MAIN_COLOR_FORMAT: ImageFormat = ImageFormat::Rgba16Float;

/// Format of the main depth target.
pub const DEPTH_FORMAT: ImageFormat = ImageFormat::Depth32Float;

/// Every descriptor layout the application declares, with its slots.
pub fn application_layouts() -> [(DescriptorLayoutId, &'static [DescriptorSlotKind]); 4] {
    [
        (
            DescriptorLayoutId::GLOBAL_DATA,
            &[DescriptorSlotKind::UniformBuffer],
        ),
        (
            DescriptorLayoutId::SWAPCHAIN_BLIT,
            &[DescriptorSlotKind::SampledImage],
        ),
        (
            DescriptorLayoutId::VERTEX_BUFFER,
            &[DescriptorSlotKind::StorageBuffer],
        ),
        (
            DescriptorLayoutId::INSTANCE_DATA,
            &[DescriptorSlotKind::StorageBuffer],
        ),
    ]
}

/// Output formats and descriptor layouts of one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSpec {
    /// The program.
    pub program: ShaderProgramId,
    /// Color target format. Every program writes a single target.
    pub color_format: ImageFormat,
    /// Depth target format, if the program depth-tests.
    pub depth_format: Option<ImageFormat>,
    /// Descriptor layouts, in set order.
    pub layouts: &'static [DescriptorLayoutId],
}

impl ProgramSpec {
    /// The permutation key of this program at a given viewport.
    pub fn key(&self, viewport: (u32, u32)) -> Result<PipelineKey, PipelineError> {
        PipelineKey::new(
            self.program,
            &[self.color_format],
            self.depth_format,
            self.layouts,
            viewport,
        )
        .map_err(|_| PipelineError::KeyOverflow(self.program))
    }
}

/// Returns the formats and layouts of `program`. The blit writes the swap chain image, so
/// its color format depends on the backend.
pub fn program_spec(program: ShaderProgramId, swapchain_format: ImageFormat) -> ProgramSpec {
    match program {
        ShaderProgramId::Scene => ProgramSpec {
            program,
            color_format: MAIN_COLOR_FORMAT,
            depth_format: Some(DEPTH_FORMAT),
            layouts: &[
                DescriptorLayoutId::GLOBAL_DATA,
                DescriptorLayoutId::INSTANCE_DATA,
            ],
        },
        ShaderProgramId::Overlay => ProgramSpec {
            program,
            color_format: MAIN_COLOR_FORMAT,
            depth_format: None,
            layouts: &[DescriptorLayoutId::GLOBAL_DATA],
        },
        ShaderProgramId::Blit => ProgramSpec {
            program,
            color_format: swapchain_format,
            depth_format: None,
            layouts: &[
                DescriptorLayoutId::SWAPCHAIN_BLIT,
                DescriptorLayoutId::VERTEX_BUFFER,
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_uses_declared_layouts() {
        let declared: Vec<_> = application_layouts().iter().map(|(id, _)| *id).collect();
        for program in ShaderProgramId::ALL {
            let spec = program_spec(program, ImageFormat::Bgra8UnormSrgb);
            assert!(
                spec.layouts.iter().all(|id| declared.contains(id)),
                "{program}"
            );
        }
    }

    #[test]
    fn blit_targets_the_swapchain_format() {
        let spec = program_spec(ShaderProgramId::Blit, ImageFormat::Rgba8Unorm);
        let key = spec.key((640, 480)).unwrap();
        assert_eq!(key.color_formats.as_slice(), &[ImageFormat::Rgba8Unorm]);
        assert_eq!(key.depth_format, None);
        assert_eq!(key.viewport, (640, 480));
    }
}
