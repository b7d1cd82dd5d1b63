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

use cinder_core::renderer::{AcquireError, BackendError, PipelineError, ResourceError, ShaderError};
use thiserror::Error;

/// An error that aborts a frame, a resize or initialization.
///
/// Only the application-shell entry points of
/// [`FrameOrchestrator`](super::FrameOrchestrator) turn it into a status code.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Acquiring a swap chain image failed for a reason other than minimization.
    #[error("Frame acquisition failed: {0}")]
    Acquire(AcquireError),
    /// Translation or submission failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// A resource or descriptor operation failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// Loading shaders or building permutations failed.
    #[error(transparent)]
    Shader(#[from] ShaderError),
    /// Configuring a render pass failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// The program for a draw has no live permutation.
    #[error("No pipeline is loaded for '{0}'")]
    MissingPipeline(cinder_core::renderer::ShaderProgramId),
    /// The external session call reported failure.
    #[error("Session send failed")]
    Session,
    /// The orchestrator was already destroyed.
    #[error("Renderer has been destroyed")]
    Destroyed,
}
