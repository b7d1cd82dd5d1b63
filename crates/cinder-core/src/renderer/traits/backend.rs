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

//! The contract every graphics backend implements.

use std::fmt::Debug;

use crate::handle::{DescriptorHandle, PipelineHandle, ResourceHandle};
use crate::renderer::api::*;
use crate::renderer::error::{AcquireError, BackendError, PipelineError, ResourceError};

/// The boundary to a native graphics API.
///
/// A backend owns every GPU object; the core only ever holds the handles it
/// returns. All calls happen on the single thread that records frames, so
/// methods take `&mut self` and no synchronization is implied. Frame
/// acquisition and submission may block on GPU synchronization internally.
pub trait GraphicsBackend: Debug {
    /// Creates the device, queues and swap chain for a `width` x `height` window.
    /// ## Errors
    /// * `BackendError::Initialization` - If no usable device could be created.
    fn create_context(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Releases the context and swap chain. Every other object must already
    /// have been destroyed.
    fn destroy_context(&mut self);

    /// Maximum number of simultaneous color targets of a render pass.
    fn max_color_targets(&self) -> usize;

    /// Format of the swap chain images.
    fn swapchain_format(&self) -> ImageFormat;

    /// Acquires the swap chain image to render the next frame into.
    ///
    /// The returned image starts the frame in [`ImageLayout::Undefined`].
    /// ## Errors
    /// * `AcquireError::Minimized` - If the window has no drawable area; the
    ///   caller skips the frame.
    /// * `AcquireError::Failed` - For any other failure.
    fn acquire_frame(&mut self) -> Result<ResourceHandle, AcquireError>;

    /// Prepares native command buffers for a new translation.
    fn begin_translation(&mut self) -> Result<(), BackendError>;

    /// Translates every command of `stream`, strictly in append order.
    /// ## Errors
    /// * `BackendError::Translation` - Naming the first rejected command.
    fn translate(&mut self, stream: &GraphicsCommandStream) -> Result<(), BackendError>;

    /// Closes the native command buffers.
    fn end_translation(&mut self) -> Result<(), BackendError>;

    /// Submits the translated work and presents the acquired image.
    fn submit_frame(&mut self) -> Result<(), BackendError>;

    /// Creates a buffer or image.
    fn create_resource(&mut self, desc: &ResourceDesc) -> Result<ResourceHandle, ResourceError>;

    /// Destroys a buffer or image.
    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<(), ResourceError>;

    /// Maps a host-visible buffer and returns its bytes.
    fn map_resource(&mut self, handle: ResourceHandle) -> Result<&mut [u8], ResourceError>;

    /// Unmaps a buffer mapped by [`map_resource`](Self::map_resource).
    fn unmap_resource(&mut self, handle: ResourceHandle) -> Result<(), ResourceError>;

    /// Registers `layout` under `id`.
    fn create_descriptor_layout(
        &mut self,
        id: DescriptorLayoutId,
        layout: &DescriptorLayout,
    ) -> Result<(), ResourceError>;

    /// Allocates one descriptor set shaped to layout `id`.
    fn create_descriptor(
        &mut self,
        id: DescriptorLayoutId,
    ) -> Result<DescriptorHandle, ResourceError>;

    /// Binds `data` into every slot of `descriptor`.
    fn write_descriptor(
        &mut self,
        id: DescriptorLayoutId,
        descriptor: DescriptorHandle,
        data: &DescriptorSetData,
    ) -> Result<(), ResourceError>;

    /// Frees one descriptor set.
    fn destroy_descriptor(&mut self, descriptor: DescriptorHandle) -> Result<(), ResourceError>;

    /// Frees every descriptor set and layout in one call.
    fn destroy_all_descriptors(&mut self);

    /// Compiles one pipeline permutation.
    fn create_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<PipelineHandle, PipelineError>;

    /// Destroys a batch of pipeline permutations.
    fn destroy_pipelines(&mut self, pipelines: &[PipelineHandle]);

    /// Informs the backend that the window is now `width` x `height`.
    ///
    /// `(0, 0)` means minimized; the swap chain is recreated on the next
    /// nonzero size.
    fn notify_resize(&mut self, width: u32, height: u32);
}
