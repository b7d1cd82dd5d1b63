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

//! Validation of a command stream against the backend's object tables.
//!
//! Translation walks the stream once, in append order, tracking image layouts
//! and the open render pass exactly as a native backend would have to.

use cinder_core::memory::InlineVec;
use cinder_core::renderer::{
    BlendState, DescriptorSlotKind, DrawCall, GraphicsCommand, ImageFormat, ImageLayout,
    RenderPassBegin, ResourceKind, MAX_COLOR_TARGETS,
};
use cinder_core::ResourceHandle;

use super::tables::ObjectTables;

#[derive(Debug)]
struct ActivePass {
    color_formats: InlineVec<ImageFormat, MAX_COLOR_TARGETS>,
    depth_format: Option<ImageFormat>,
    extent: (u32, u32),
}

pub(crate) struct Translator<'a> {
    tables: &'a mut ObjectTables,
    max_color_targets: usize,
    pass: Option<ActivePass>,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(tables: &'a mut ObjectTables, max_color_targets: usize) -> Self {
        Self {
            tables,
            max_color_targets,
            pass: None,
        }
    }

    pub(crate) fn apply(&mut self, command: &GraphicsCommand) -> Result<(), String> {
        match command {
            GraphicsCommand::LayoutTransition {
                image, from, to, ..
            } => self.transition(*image, *from, *to),
            GraphicsCommand::ClearImage { image, .. } => {
                if self.pass.is_some() {
                    return Err("clear recorded inside a render pass".into());
                }
                let layout = self.image_layout(*image)?;
                if layout != ImageLayout::TransferDst {
                    return Err(format!("cleared {image:?} while in {layout:?}"));
                }
                Ok(())
            }
            GraphicsCommand::BeginRenderPass(begin) => self.begin_pass(begin),
            GraphicsCommand::EndRenderPass { .. } => match self.pass.take() {
                Some(_) => Ok(()),
                None => Err("render pass ended without being begun".into()),
            },
            GraphicsCommand::SetScissor(rect) => {
                let pass = self
                    .pass
                    .as_ref()
                    .ok_or("scissor set outside a render pass")?;
                let fits = rect.x >= 0
                    && rect.y >= 0
                    && rect.x as u64 + rect.width as u64 <= pass.extent.0 as u64
                    && rect.y as u64 + rect.height as u64 <= pass.extent.1 as u64;
                if !fits {
                    return Err(format!("scissor {rect:?} exceeds pass extent {:?}", pass.extent));
                }
                Ok(())
            }
            GraphicsCommand::Draw(draw) => self.draw(draw),
            GraphicsCommand::Timestamp { .. } => Ok(()),
        }
    }

    pub(crate) fn finish(self) -> Result<(), String> {
        match self.pass {
            Some(_) => Err("render pass left open at end of stream".into()),
            None => Ok(()),
        }
    }

    fn image_layout(&self, image: ResourceHandle) -> Result<ImageLayout, String> {
        let entry = self
            .tables
            .resources
            .get(&image)
            .ok_or_else(|| format!("unknown resource {image:?}"))?;
        if !entry.desc.is_image() {
            return Err(format!("{image:?} is not an image"));
        }
        Ok(entry.layout)
    }

    fn image_format(&self, image: ResourceHandle) -> Result<(ImageFormat, u32, u32), String> {
        let entry = self
            .tables
            .resources
            .get(&image)
            .ok_or_else(|| format!("unknown resource {image:?}"))?;
        match entry.desc.kind {
            ResourceKind::Image {
                width,
                height,
                format,
            } => Ok((format, width, height)),
            ResourceKind::Buffer { .. } => Err(format!("{image:?} is not an image")),
        }
    }

    fn transition(
        &mut self,
        image: ResourceHandle,
        from: ImageLayout,
        to: ImageLayout,
    ) -> Result<(), String> {
        if self.pass.is_some() {
            return Err(format!("layout transition of {image:?} inside a render pass"));
        }
        let current = self.image_layout(image)?;
        if from != ImageLayout::Undefined && from != current {
            return Err(format!(
                "transition of {image:?} from {from:?}, but it is in {current:?}"
            ));
        }
        if let Some(entry) = self.tables.resources.get_mut(&image) {
            entry.layout = to;
        }
        Ok(())
    }

    fn begin_pass(&mut self, begin: &RenderPassBegin) -> Result<(), String> {
        if self.pass.is_some() {
            return Err("render pass begun while another is open".into());
        }
        if begin.color_targets.len() > self.max_color_targets {
            return Err(format!(
                "{} color targets exceed the limit of {}",
                begin.color_targets.len(),
                self.max_color_targets
            ));
        }
        let mut color_formats = InlineVec::new();
        for &target in begin.color_targets.iter() {
            let (format, width, height) = self.image_format(target)?;
            if format.is_depth() {
                return Err(format!("{target:?} is a depth image bound as color"));
            }
            let layout = self.image_layout(target)?;
            if layout != ImageLayout::ColorAttachment {
                return Err(format!("color target {target:?} is in {layout:?}"));
            }
            if (width, height) != (begin.width, begin.height) {
                return Err(format!(
                    "color target {target:?} is {width}x{height}, pass is {}x{}",
                    begin.width, begin.height
                ));
            }
            color_formats
                .try_push(format)
                .map_err(|e| e.to_string())?;
        }
        let depth_format = match begin.depth_target {
            Some(depth) => {
                let (format, width, height) = self.image_format(depth)?;
                if !format.is_depth() {
                    return Err(format!("{depth:?} bound as depth is not a depth image"));
                }
                if (width, height) != (begin.width, begin.height) {
                    return Err(format!("depth target {depth:?} does not match the pass extent"));
                }
                Some(format)
            }
            None => None,
        };
        self.pass = Some(ActivePass {
            color_formats,
            depth_format,
            extent: (begin.width, begin.height),
        });
        Ok(())
    }

    fn draw(&self, draw: &DrawCall) -> Result<(), String> {
        let pass = self
            .pass
            .as_ref()
            .ok_or("draw recorded outside a render pass")?;
        let pipeline = self
            .tables
            .pipelines
            .get(&draw.pipeline)
            .ok_or_else(|| format!("unknown pipeline {:?}", draw.pipeline))?;
        let key = &pipeline.key;

        if key.color_formats != pass.color_formats || key.depth_format != pass.depth_format {
            return Err(format!(
                "pipeline for '{}' does not match the formats of the open pass",
                key.program
            ));
        }
        if key.viewport != pass.extent {
            return Err(format!(
                "pipeline for '{}' was built for {:?}, pass is {:?}",
                key.program, key.viewport, pass.extent
            ));
        }
        if draw.depth.uses_depth() && pass.depth_format.is_none() {
            return Err(format!(
                "draw '{}' uses {:?} in a pass without a depth target",
                draw.label, draw.depth
            ));
        }
        if draw.blend != BlendState::Replace && pass.color_formats.is_empty() {
            return Err(format!(
                "draw '{}' blends with {:?} in a pass without color targets",
                draw.label, draw.blend
            ));
        }
        if draw.descriptors.len() != key.descriptor_layouts.len() {
            return Err(format!(
                "pipeline for '{}' expects {} descriptor sets, {} bound",
                key.program,
                key.descriptor_layouts.len(),
                draw.descriptors.len()
            ));
        }

        for (&descriptor, &expected) in draw.descriptors.iter().zip(key.descriptor_layouts.iter()) {
            let entry = self
                .tables
                .descriptors
                .get(&descriptor)
                .ok_or_else(|| format!("unknown descriptor {descriptor:?}"))?;
            if entry.layout != expected {
                return Err(format!(
                    "descriptor {descriptor:?} has layout {:?}, pipeline expects {expected:?}",
                    entry.layout
                ));
            }
            let data = entry
                .data
                .as_ref()
                .ok_or_else(|| format!("descriptor {descriptor:?} was never written"))?;
            let layout = self
                .tables
                .layouts
                .get(&entry.layout)
                .ok_or_else(|| format!("descriptor layout {:?} is gone", entry.layout))?;

            for (&kind, &handle) in layout.slots().iter().zip(data.handles()) {
                let resource = self.tables.resources.get(&handle).ok_or_else(|| {
                    format!("descriptor {descriptor:?} references destroyed resource {handle:?}")
                })?;
                if kind == DescriptorSlotKind::SampledImage
                    && resource.layout != ImageLayout::ShaderReadOnly
                {
                    return Err(format!("{handle:?} sampled while in {:?}", resource.layout));
                }
            }
        }
        Ok(())
    }
}
