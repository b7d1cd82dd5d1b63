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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" between frame logic and a
//! graphics backend: plain data (`api`), the backend boundary (`traits`),
//! configuration, statistics and error types. Nothing here talks to a native
//! graphics API; a concrete backend consumes these types and does the
//! translation.

pub mod api;
pub mod config;
pub mod error;
pub mod stats;
pub mod traits;

pub use self::api::*;
pub use self::config::{ConfigError, RendererConfig};
pub use self::error::{AcquireError, BackendError, PipelineError, ResourceError, ShaderError};
pub use self::stats::RenderStats;
pub use self::traits::{GraphicsBackend, ShaderChangeMonitor};
