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

//! The [`HeadlessBackend`] and its test-facing inspection and failure
//! injection hooks.

use std::collections::VecDeque;

use cinder_core::renderer::{
    AcquireError, BackendError, DescriptorLayout, DescriptorLayoutId, DescriptorSetData,
    GraphicsBackend, GraphicsCommand, GraphicsCommandStream, ImageFormat, ImageLayout, PipelineDesc,
    PipelineError, PipelineKey, ResourceDesc, ResourceError, ResourceKind, ResourceUsage,
    ShaderProgramId, MAX_COLOR_TARGETS,
};
use cinder_core::{DescriptorHandle, PipelineHandle, ResourceHandle};

use super::tables::{DescriptorEntry, ObjectTables, PipelineEntry};
use super::validate::Translator;

/// Construction parameters of a [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Reported limit of simultaneous color targets.
    pub max_color_targets: usize,
    /// Format of the simulated swap chain images.
    pub swapchain_format: ImageFormat,
    /// Number of simulated swap chain images.
    pub swapchain_images: usize,
    /// How many submitted frames are kept for inspection. Older frames are
    /// dropped; at least one is always kept.
    pub frame_history: usize,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            max_color_targets: MAX_COLOR_TARGETS,
            swapchain_format: ImageFormat::Bgra8UnormSrgb,
            swapchain_images: 2,
            frame_history: 16,
        }
    }
}

/// One frame that made it through translation and submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedFrame {
    /// The swap chain image that was presented.
    pub swapchain_image: ResourceHandle,
    /// The translated commands, in order.
    pub commands: Vec<GraphicsCommand>,
}

/// A backend call that [`HeadlessBackend::fail_next`] can make fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// The next resource creation.
    CreateResource,
    /// The next descriptor allocated from this layout.
    CreateDescriptor(DescriptorLayoutId),
    /// The next descriptor write.
    WriteDescriptor,
}

#[derive(Debug)]
struct Swapchain {
    width: u32,
    height: u32,
    images: Vec<ResourceHandle>,
    next: usize,
}

/// A [`GraphicsBackend`] that keeps every object in memory and validates
/// every recorded command instead of issuing driver calls.
///
/// Besides serving as the reference backend, it exposes inspection accessors
/// and failure injection for tests.
#[derive(Debug)]
pub struct HeadlessBackend {
    config: HeadlessConfig,
    tables: ObjectTables,
    swapchain: Option<Swapchain>,
    minimized: bool,
    acquired: Option<ResourceHandle>,
    translating: bool,
    translated: Option<Vec<GraphicsCommand>>,
    submitted: VecDeque<SubmittedFrame>,
    frames_submitted: u64,
    fail_next_acquire: Option<String>,
    pending_failures: Vec<(FailurePoint, String)>,
    failing_program: Option<ShaderProgramId>,
    pipelines_created: usize,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Creates a backend with the default configuration.
    pub fn new() -> Self {
        Self::with_config(HeadlessConfig::default())
    }

    /// Creates a backend with an explicit configuration.
    pub fn with_config(config: HeadlessConfig) -> Self {
        Self {
            config,
            tables: ObjectTables::default(),
            swapchain: None,
            minimized: false,
            acquired: None,
            translating: false,
            translated: None,
            submitted: VecDeque::new(),
            frames_submitted: 0,
            fail_next_acquire: None,
            pending_failures: Vec::new(),
            failing_program: None,
            pipelines_created: 0,
        }
    }

    /// Makes the next [`acquire_frame`](GraphicsBackend::acquire_frame) fail
    /// with `reason`.
    pub fn fail_next_acquire(&mut self, reason: impl Into<String>) {
        self.fail_next_acquire = Some(reason.into());
    }

    /// Makes the next call matching `point` fail with `reason`.
    ///
    /// Failures are queued, so several points can be armed at once.
    pub fn fail_next(&mut self, point: FailurePoint, reason: impl Into<String>) {
        self.pending_failures.push((point, reason.into()));
    }

    /// Makes pipeline creation for `program` fail until cleared with `None`.
    pub fn set_pipeline_failure(&mut self, program: Option<ShaderProgramId>) {
        self.failing_program = program;
    }

    /// Returns `true` while a context exists.
    pub fn has_context(&self) -> bool {
        self.swapchain.is_some()
    }

    /// Returns `true` while the window is reported as minimized.
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Current swap chain images.
    pub fn swapchain_images(&self) -> &[ResourceHandle] {
        self.swapchain.as_ref().map_or(&[], |s| s.images.as_slice())
    }

    /// Number of live resources created through
    /// [`create_resource`](GraphicsBackend::create_resource). Swap chain
    /// images are not counted.
    pub fn live_resource_count(&self) -> usize {
        self.tables
            .resources
            .values()
            .filter(|r| !r.swapchain)
            .count()
    }

    /// Returns `true` if `handle` names a live resource.
    pub fn contains_resource(&self, handle: ResourceHandle) -> bool {
        self.tables.resources.contains_key(&handle)
    }

    /// The description a live resource was created with.
    pub fn resource_desc(&self, handle: ResourceHandle) -> Option<ResourceDesc> {
        self.tables.resources.get(&handle).map(|r| r.desc)
    }

    /// The tracked layout of a live image.
    pub fn image_layout(&self, handle: ResourceHandle) -> Option<ImageLayout> {
        self.tables.resources.get(&handle).map(|r| r.layout)
    }

    /// Host-visible contents of a live buffer.
    pub fn resource_bytes(&self, handle: ResourceHandle) -> Option<&[u8]> {
        self.tables
            .resources
            .get(&handle)
            .map(|r| r.bytes.as_slice())
    }

    /// Number of registered descriptor layouts.
    pub fn layout_count(&self) -> usize {
        self.tables.layouts.len()
    }

    /// Number of live descriptor sets.
    pub fn live_descriptor_count(&self) -> usize {
        self.tables.descriptors.len()
    }

    /// The data last written into a live descriptor.
    pub fn descriptor_data(&self, handle: DescriptorHandle) -> Option<DescriptorSetData> {
        self.tables.descriptors.get(&handle).and_then(|d| d.data)
    }

    /// Keys of every live pipeline permutation.
    pub fn pipeline_keys(&self) -> Vec<PipelineKey> {
        self.tables.pipelines.values().map(|p| p.key).collect()
    }

    /// Handles of every live pipeline permutation.
    pub fn pipeline_handles(&self) -> Vec<PipelineHandle> {
        self.tables.pipelines.keys().copied().collect()
    }

    /// Pipelines created over the backend's lifetime, including destroyed ones.
    pub fn pipelines_created(&self) -> usize {
        self.pipelines_created
    }

    /// The most recent submitted frames, oldest first, bounded by
    /// [`HeadlessConfig::frame_history`].
    pub fn submitted_frames(&self) -> &VecDeque<SubmittedFrame> {
        &self.submitted
    }

    /// Frames submitted over the backend's lifetime.
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// The most recently submitted frame.
    pub fn last_submitted(&self) -> Option<&SubmittedFrame> {
        self.submitted.back()
    }

    fn take_failure(&mut self, point: FailurePoint) -> Option<String> {
        let index = self.pending_failures.iter().position(|(p, _)| *p == point)?;
        Some(self.pending_failures.remove(index).1)
    }

    fn create_swapchain(&mut self, width: u32, height: u32) {
        let desc = ResourceDesc::image(
            "swapchain_image",
            width,
            height,
            self.config.swapchain_format,
            ResourceUsage::COLOR_TARGET | ResourceUsage::TRANSFER_DST,
        );
        let images = (0..self.config.swapchain_images.max(1))
            .map(|_| self.tables.insert_resource(desc, true))
            .collect();
        self.swapchain = Some(Swapchain {
            width,
            height,
            images,
            next: 0,
        });
    }

    fn release_swapchain(&mut self) {
        if let Some(swapchain) = self.swapchain.take() {
            for image in swapchain.images {
                self.tables.resources.remove(&image);
            }
        }
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_context(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if self.swapchain.is_some() {
            return Err(BackendError::Initialization("a context already exists".into()));
        }
        self.create_swapchain(width, height);
        self.minimized = width == 0 || height == 0;
        log::info!(
            "Headless context created ({width}x{height}, {} swap chain images)",
            self.config.swapchain_images
        );
        Ok(())
    }

    fn destroy_context(&mut self) {
        self.release_swapchain();
        let leaked = self.tables.resources.len()
            + self.tables.descriptors.len()
            + self.tables.pipelines.len();
        if leaked > 0 {
            log::warn!(
                "Headless context destroyed with {} resources, {} descriptors and {} pipelines still alive",
                self.tables.resources.len(),
                self.tables.descriptors.len(),
                self.tables.pipelines.len()
            );
        } else {
            log::info!("Headless context destroyed");
        }
        self.acquired = None;
        self.translating = false;
        self.translated = None;
    }

    fn max_color_targets(&self) -> usize {
        self.config.max_color_targets
    }

    fn swapchain_format(&self) -> ImageFormat {
        self.config.swapchain_format
    }

    fn acquire_frame(&mut self) -> Result<ResourceHandle, AcquireError> {
        if let Some(reason) = self.fail_next_acquire.take() {
            return Err(AcquireError::Failed(reason));
        }
        if self.minimized {
            return Err(AcquireError::Minimized);
        }
        let swapchain = self
            .swapchain
            .as_mut()
            .ok_or_else(|| AcquireError::Failed("no context".into()))?;
        if swapchain.images.is_empty() {
            return Err(AcquireError::Failed("empty swap chain".into()));
        }
        let image = swapchain.images[swapchain.next % swapchain.images.len()];
        swapchain.next = swapchain.next.wrapping_add(1);
        if let Some(entry) = self.tables.resources.get_mut(&image) {
            entry.layout = ImageLayout::Undefined;
        }
        self.acquired = Some(image);
        Ok(image)
    }

    fn begin_translation(&mut self) -> Result<(), BackendError> {
        if self.swapchain.is_none() {
            return Err(BackendError::NoContext);
        }
        self.translating = true;
        self.translated = None;
        Ok(())
    }

    fn translate(&mut self, stream: &GraphicsCommandStream) -> Result<(), BackendError> {
        if !self.translating {
            return Err(BackendError::Translation {
                index: 0,
                reason: "translate called outside begin/end translation".into(),
            });
        }
        let mut translator = Translator::new(&mut self.tables, self.config.max_color_targets);
        for (index, command) in stream.iter().enumerate() {
            translator
                .apply(command)
                .map_err(|reason| BackendError::Translation { index, reason })?;
        }
        translator.finish().map_err(|reason| BackendError::Translation {
            index: stream.len(),
            reason,
        })?;
        log::trace!("Translated {} commands", stream.len());
        self.translated = Some(stream.commands().to_vec());
        Ok(())
    }

    fn end_translation(&mut self) -> Result<(), BackendError> {
        if !self.translating {
            return Err(BackendError::Submission(
                "end_translation without begin_translation".into(),
            ));
        }
        self.translating = false;
        Ok(())
    }

    fn submit_frame(&mut self) -> Result<(), BackendError> {
        let image = self
            .acquired
            .take()
            .ok_or_else(|| BackendError::Submission("no swap chain image acquired".into()))?;
        let commands = self
            .translated
            .take()
            .ok_or_else(|| BackendError::Submission("nothing was translated".into()))?;
        let layout = self.image_layout(image);
        if layout != Some(ImageLayout::Present) {
            return Err(BackendError::Submission(format!(
                "swap chain image {image:?} presented while in {layout:?}"
            )));
        }
        if self.submitted.len() >= self.config.frame_history.max(1) {
            self.submitted.pop_front();
        }
        self.submitted.push_back(SubmittedFrame {
            swapchain_image: image,
            commands,
        });
        self.frames_submitted += 1;
        Ok(())
    }

    fn create_resource(&mut self, desc: &ResourceDesc) -> Result<ResourceHandle, ResourceError> {
        if let Some(reason) = self.take_failure(FailurePoint::CreateResource) {
            return Err(ResourceError::Backend(reason));
        }
        match desc.kind {
            ResourceKind::Buffer { size: 0 } => {
                return Err(ResourceError::Backend(format!(
                    "buffer '{}' has zero size",
                    desc.label
                )));
            }
            ResourceKind::Image { width, height, .. } if width == 0 || height == 0 => {
                return Err(ResourceError::Backend(format!(
                    "image '{}' has zero extent",
                    desc.label
                )));
            }
            _ => {}
        }
        let handle = self.tables.insert_resource(*desc, false);
        log::trace!("Created resource '{}' as {handle:?}", desc.label);
        Ok(handle)
    }

    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
        match self.tables.resources.get(&handle) {
            None => Err(ResourceError::UnknownResource(handle)),
            Some(entry) if entry.swapchain => Err(ResourceError::Backend(format!(
                "{handle:?} is a swap chain image owned by the backend"
            ))),
            Some(_) => {
                self.tables.resources.remove(&handle);
                Ok(())
            }
        }
    }

    fn map_resource(&mut self, handle: ResourceHandle) -> Result<&mut [u8], ResourceError> {
        let entry = self
            .tables
            .resources
            .get_mut(&handle)
            .ok_or(ResourceError::UnknownResource(handle))?;
        if entry.desc.is_image() || !entry.desc.usage.contains(ResourceUsage::HOST_VISIBLE) {
            return Err(ResourceError::NotMappable(handle));
        }
        if entry.mapped {
            return Err(ResourceError::AlreadyMapped(handle));
        }
        entry.mapped = true;
        Ok(entry.bytes.as_mut_slice())
    }

    fn unmap_resource(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
        let entry = self
            .tables
            .resources
            .get_mut(&handle)
            .ok_or(ResourceError::UnknownResource(handle))?;
        if !entry.mapped {
            return Err(ResourceError::NotMapped(handle));
        }
        entry.mapped = false;
        Ok(())
    }

    fn create_descriptor_layout(
        &mut self,
        id: DescriptorLayoutId,
        layout: &DescriptorLayout,
    ) -> Result<(), ResourceError> {
        if self.tables.layouts.contains_key(&id) {
            return Err(ResourceError::LayoutAlreadyRegistered(id));
        }
        self.tables.layouts.insert(id, *layout);
        Ok(())
    }

    fn create_descriptor(
        &mut self,
        id: DescriptorLayoutId,
    ) -> Result<DescriptorHandle, ResourceError> {
        if !self.tables.layouts.contains_key(&id) {
            return Err(ResourceError::UnknownLayout(id));
        }
        if let Some(reason) = self.take_failure(FailurePoint::CreateDescriptor(id)) {
            return Err(ResourceError::Backend(reason));
        }
        let handle = self.tables.next_descriptor();
        self.tables
            .descriptors
            .insert(
                handle,
                DescriptorEntry {
                    layout: id,
                    data: None,
                },
            );
        Ok(handle)
    }

    fn write_descriptor(
        &mut self,
        id: DescriptorLayoutId,
        descriptor: DescriptorHandle,
        data: &DescriptorSetData,
    ) -> Result<(), ResourceError> {
        if let Some(reason) = self.take_failure(FailurePoint::WriteDescriptor) {
            return Err(ResourceError::Backend(reason));
        }
        let layout = self
            .tables
            .layouts
            .get(&id)
            .ok_or(ResourceError::UnknownLayout(id))?;
        let entry = self
            .tables
            .descriptors
            .get(&descriptor)
            .ok_or(ResourceError::UnknownDescriptor(descriptor))?;
        if entry.layout != id {
            return Err(ResourceError::LayoutMismatch {
                descriptor,
                expected: entry.layout,
                actual: id,
            });
        }
        layout.check_shape(id, data)?;
        for (slot, (&kind, &handle)) in layout.slots().iter().zip(data.handles()).enumerate() {
            let resource = self
                .tables
                .resources
                .get(&handle)
                .ok_or(ResourceError::UnknownResource(handle))?;
            if !kind.accepts(&resource.desc) {
                return Err(ResourceError::SlotKindMismatch {
                    layout: id,
                    slot,
                    expected: kind,
                    resource: handle,
                });
            }
        }
        if let Some(entry) = self.tables.descriptors.get_mut(&descriptor) {
            entry.data = Some(*data);
        }
        Ok(())
    }

    fn destroy_descriptor(&mut self, descriptor: DescriptorHandle) -> Result<(), ResourceError> {
        self.tables
            .descriptors
            .remove(&descriptor)
            .map(|_| ())
            .ok_or(ResourceError::UnknownDescriptor(descriptor))
    }

    fn destroy_all_descriptors(&mut self) {
        self.tables.descriptors.clear();
        self.tables.layouts.clear();
    }

    fn create_pipeline(
        &mut self,
        desc: &PipelineDesc<'_>,
    ) -> Result<PipelineHandle, PipelineError> {
        let program = desc.key.program;
        if self.failing_program == Some(program) {
            return Err(PipelineError::Compilation {
                program,
                details: "injected failure".into(),
            });
        }
        if desc.key.color_formats.len() > self.config.max_color_targets {
            return Err(PipelineError::TooManyColorTargets {
                requested: desc.key.color_formats.len(),
                limit: self.config.max_color_targets,
            });
        }
        if desc.vertex_bytecode.is_empty() || desc.fragment_bytecode.is_empty() {
            return Err(PipelineError::Compilation {
                program,
                details: "empty shader stage".into(),
            });
        }
        if let Some(missing) = desc
            .key
            .descriptor_layouts
            .iter()
            .find(|id| !self.tables.layouts.contains_key(*id))
        {
            return Err(PipelineError::Compilation {
                program,
                details: format!("descriptor layout {missing:?} is not registered"),
            });
        }
        let handle = self.tables.next_pipeline();
        self.tables.pipelines.insert(
            handle,
            PipelineEntry {
                key: desc.key,
                vertex_len: desc.vertex_bytecode.len(),
                fragment_len: desc.fragment_bytecode.len(),
            },
        );
        self.pipelines_created += 1;
        log::debug!(
            "Created pipeline '{}' for '{program}' as {handle:?}",
            desc.label
        );
        Ok(handle)
    }

    fn destroy_pipelines(&mut self, pipelines: &[PipelineHandle]) {
        for handle in pipelines {
            match self.tables.pipelines.remove(handle) {
                Some(entry) => log::trace!(
                    "Destroyed pipeline {handle:?} ({} + {} bytes of bytecode)",
                    entry.vertex_len,
                    entry.fragment_len
                ),
                None => log::warn!("Attempted to destroy unknown pipeline {handle:?}"),
            }
        }
    }

    fn notify_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.minimized = true;
            return;
        }
        self.minimized = false;
        let unchanged = self
            .swapchain
            .as_ref()
            .is_some_and(|s| (s.width, s.height) == (width, height));
        if self.swapchain.is_some() && !unchanged {
            self.release_swapchain();
            self.create_swapchain(width, height);
            log::debug!("Headless swap chain recreated at {width}x{height}");
        }
    }
}
