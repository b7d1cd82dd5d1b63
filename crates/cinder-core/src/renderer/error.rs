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

//! Defines the hierarchy of error types for the rendering subsystem.

use std::path::PathBuf;

use thiserror::Error;

use crate::handle::{DescriptorHandle, ResourceHandle};
use crate::memory::CapacityError;
use crate::renderer::api::{DescriptorLayoutId, DescriptorSlotKind, ShaderProgramId};

/// An error raised while creating, binding, mapping or destroying resources
/// and descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The handle does not name a live resource.
    #[error("Unknown resource handle {0:?}")]
    UnknownResource(ResourceHandle),
    /// The handle does not name a live descriptor.
    #[error("Unknown descriptor handle {0:?}")]
    UnknownDescriptor(DescriptorHandle),
    /// No layout has been registered under this id.
    #[error("Descriptor layout {0:?} is not registered")]
    UnknownLayout(DescriptorLayoutId),
    /// A layout was already registered under this id.
    #[error("Descriptor layout {0:?} is already registered")]
    LayoutAlreadyRegistered(DescriptorLayoutId),
    /// The descriptor was created from a different layout than the one written.
    #[error("Descriptor {descriptor:?} was created from layout {expected:?}, not {actual:?}")]
    LayoutMismatch {
        /// The descriptor being written.
        descriptor: DescriptorHandle,
        /// The layout it was created from.
        expected: DescriptorLayoutId,
        /// The layout named by the write.
        actual: DescriptorLayoutId,
    },
    /// A write did not provide exactly one handle per declared slot.
    #[error("Layout {layout:?} declares {expected} slots but {actual} handles were written")]
    SlotCountMismatch {
        /// The target layout.
        layout: DescriptorLayoutId,
        /// Number of declared slots.
        expected: usize,
        /// Number of handles provided.
        actual: usize,
    },
    /// A handle was written into a slot that cannot bind it.
    #[error("Slot {slot} of layout {layout:?} expects {expected:?}, but {resource:?} does not fit")]
    SlotKindMismatch {
        /// The target layout.
        layout: DescriptorLayoutId,
        /// Index of the offending slot.
        slot: usize,
        /// The declared slot type.
        expected: DescriptorSlotKind,
        /// The offending resource.
        resource: ResourceHandle,
    },
    /// The resource is still bound by a live descriptor.
    #[error("Resource {resource:?} is still referenced by descriptor {descriptor:?}")]
    StillReferenced {
        /// The resource that was to be destroyed.
        resource: ResourceHandle,
        /// A live descriptor that binds it.
        descriptor: DescriptorHandle,
    },
    /// The resource was not created host visible.
    #[error("Resource {0:?} is not host visible")]
    NotMappable(ResourceHandle),
    /// The resource is already mapped.
    #[error("Resource {0:?} is already mapped")]
    AlreadyMapped(ResourceHandle),
    /// The resource is not mapped.
    #[error("Resource {0:?} is not mapped")]
    NotMapped(ResourceHandle),
    /// The data written does not fit the mapped range.
    #[error("Write of {len} bytes exceeds the {size} bytes of resource {resource:?}")]
    OutOfBounds {
        /// The resource written.
        resource: ResourceHandle,
        /// Number of bytes written.
        len: usize,
        /// Size of the resource.
        size: usize,
    },
    /// A fixed-capacity list overflowed.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    /// The backend refused the operation.
    #[error("Backend resource failure: {0}")]
    Backend(String),
}

/// An error related to the creation of a graphics pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A render pass or pipeline declared more color targets than the platform allows.
    #[error("Requested {requested} color targets, but the limit is {limit}")]
    TooManyColorTargets {
        /// Number of targets requested.
        requested: usize,
        /// The platform limit.
        limit: usize,
    },
    /// The key names more formats or layouts than a key can hold.
    #[error("Pipeline key for '{0}' exceeds its fixed bounds")]
    KeyOverflow(ShaderProgramId),
    /// The backend failed to compile the pipeline.
    #[error("Pipeline compilation failed for '{program}': {details}")]
    Compilation {
        /// The program being compiled.
        program: ShaderProgramId,
        /// Backend-provided details.
        details: String,
    },
}

/// An error related to loading compiled shaders and building their permutations.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// A compiled artifact does not exist.
    #[error("Compiled shader '{}' is missing", path.display())]
    Missing {
        /// The expected path.
        path: PathBuf,
    },
    /// Reading a compiled artifact failed.
    #[error("Failed to read compiled shader '{}': {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A compiled artifact is not valid bytecode.
    #[error("Compiled shader '{}' is invalid: {reason}", path.display())]
    InvalidBytecode {
        /// The offending path.
        path: PathBuf,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A compiled artifact does not fit in the bytecode memory limit.
    #[error(
        "Compiled shader '{}' ({size} bytes) exceeds the {limit} byte bytecode limit",
        path.display()
    )]
    TooLarge {
        /// The offending path.
        path: PathBuf,
        /// Size of the file on disk.
        size: u64,
        /// The configured limit.
        limit: usize,
    },
    /// Building a permutation failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Registering a descriptor layout failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// An error returned when no swap chain image could be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    /// The window has no drawable area. Not a failure; the frame is skipped.
    #[error("Window is minimized")]
    Minimized,
    /// Acquisition failed.
    #[error("Failed to acquire a swap chain image: {0}")]
    Failed(String),
}

/// An error reported by the backend while translating or submitting a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// No graphics context exists.
    #[error("No graphics context has been created")]
    NoContext,
    /// Creating the graphics context failed.
    #[error("Graphics context initialization failed: {0}")]
    Initialization(String),
    /// A recorded command was rejected during translation.
    #[error("Command {index} rejected during translation: {reason}")]
    Translation {
        /// Position of the command in the stream.
        index: usize,
        /// Why it was rejected.
        reason: String,
    },
    /// Submitting or presenting the frame failed.
    #[error("Frame submission failed: {0}")]
    Submission(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::StillReferenced {
            resource: ResourceHandle(3),
            descriptor: DescriptorHandle(1),
        };
        assert_eq!(
            err.to_string(),
            "Resource ResourceHandle(3) is still referenced by descriptor DescriptorHandle(1)"
        );

        let err = ResourceError::SlotCountMismatch {
            layout: DescriptorLayoutId(7),
            expected: 1,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "Layout DescriptorLayoutId(7) declares 1 slots but 0 handles were written"
        );
    }

    #[test]
    fn test_shader_error_display() {
        let err = ShaderError::Missing {
            path: PathBuf::from("shaders/scene.vert.spv"),
        };
        assert_eq!(
            err.to_string(),
            "Compiled shader 'shaders/scene.vert.spv' is missing"
        );

        let err: ShaderError = PipelineError::Compilation {
            program: ShaderProgramId::Blit,
            details: "bad".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Pipeline compilation failed for 'blit': bad"
        );
    }

    #[test]
    fn test_acquire_and_backend_error_display() {
        assert_eq!(AcquireError::Minimized.to_string(), "Window is minimized");
        let err = BackendError::Translation {
            index: 4,
            reason: "unknown image".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command 4 rejected during translation: unknown image"
        );
    }
}
