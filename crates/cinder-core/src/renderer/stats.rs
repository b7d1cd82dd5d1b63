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

/// Counters describing the most recently submitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Number of frames submitted since initialization.
    pub frame_number: u64,
    /// Commands recorded in the last submitted frame.
    pub commands_recorded: usize,
    /// Draw calls in the last submitted frame.
    pub draw_calls: u32,
    /// Render passes in the last submitted frame.
    pub render_passes: u32,
    /// Timestamp markers in the last submitted frame.
    pub timestamps: u32,
    /// Frames skipped because the window was minimized.
    pub skipped_frames: u64,
}
