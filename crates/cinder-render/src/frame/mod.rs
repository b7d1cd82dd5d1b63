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

//! Frame orchestration: initialization, per-frame recording, resize and
//! teardown.

mod animated;
mod camera;
mod context;
mod error;
mod geometry;
mod global;
mod input;
mod orchestrator;
mod overlay;
mod targets;

pub use self::animated::{AnimatedQuads, QuadInstance};
pub use self::camera::Camera;
pub use self::context::FrameContext;
pub use self::error::FrameError;
pub use self::geometry::{BlitVertex, DefaultGeometry};
pub use self::global::{orthographic_projection, GlobalData};
pub use self::input::{InputState, SessionLink};
pub use self::orchestrator::{FrameOrchestrator, FrameState};
pub use self::overlay::{DebugOverlay, OverlayContext, OverlayRenderer};
pub use self::targets::WindowTargets;
