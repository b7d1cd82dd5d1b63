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

//! # Cinder Render
//!
//! The stateful half of the rendering core. [`ResourceRegistry`] fronts the
//! backend's resource and descriptor tables, [`ShaderManager`] owns compiled
//! bytecode and pipeline permutations, and [`FrameOrchestrator`] sequences
//! initialization, per-frame recording, resize and teardown.
//!
//! [`ResourceRegistry`]: registry::ResourceRegistry
//! [`ShaderManager`]: shader::ShaderManager
//! [`FrameOrchestrator`]: frame::FrameOrchestrator

#![warn(missing_docs)]

pub mod frame;
pub mod registry;
pub mod shader;

pub use frame::{
    DebugOverlay, FrameError, FrameOrchestrator, FrameState, InputState, OverlayContext,
    OverlayRenderer, SessionLink,
};
pub use registry::ResourceRegistry;
pub use shader::ShaderManager;
