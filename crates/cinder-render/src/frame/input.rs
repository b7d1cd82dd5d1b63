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

use cinder_core::renderer::RenderStats;

/// Input deltas handed to each update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    /// The reload hotkey was pressed.
    pub reload_shaders: bool,
    /// The overlay toggle hotkey was pressed.
    pub toggle_overlay: bool,
    /// Cursor movement since the previous update, in pixels.
    pub cursor_delta: [f32; 2],
}

/// An external pass/fail call made once per submitted frame, such as a
/// multiplayer state send.
pub trait SessionLink {
    /// Sends the frame's state. Returns `false` on failure.
    fn send(&mut self, stats: &RenderStats) -> bool;
}
