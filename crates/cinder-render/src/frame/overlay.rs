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

use cinder_core::renderer::{
    BlendState, DepthState, DescriptorBindings, DrawCall, GraphicsCommand, GraphicsCommandStream,
    RenderStats, ScissorRect,
};
use cinder_core::{DescriptorHandle, PipelineHandle};

/// What an overlay needs to record its draws.
#[derive(Debug, Clone, Copy)]
pub struct OverlayContext {
    /// The overlay pipeline.
    pub pipeline: PipelineHandle,
    /// The global data descriptor.
    pub global_descriptor: DescriptorHandle,
    /// Target width.
    pub width: u32,
    /// Target height.
    pub height: u32,
    /// Cursor position in window pixels.
    pub cursor: [f32; 2],
    /// Statistics of the previous frame.
    pub stats: RenderStats,
}

/// A UI layer drawn into the main color target after the scene.
///
/// Implementations only append draw and scissor commands; the overlay pass
/// itself is opened and closed around [`record`](Self::record).
pub trait OverlayRenderer {
    /// Records this frame's overlay draws.
    fn record(&mut self, ctx: &OverlayContext, stream: &mut GraphicsCommandStream);

    /// Releases whatever the overlay holds. Called first during teardown.
    fn shutdown(&mut self) {}
}

/// The built-in overlay: a statistics panel and a cursor marker.
#[derive(Debug, Clone, Copy)]
pub struct DebugOverlay {
    panel: (u32, u32),
    marker: u32,
    frames_drawn: u64,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self {
            panel: (220, 64),
            marker: 8,
            frames_drawn: 0,
        }
    }
}

impl DebugOverlay {
    /// Frames the overlay recorded draws for.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    fn quad(ctx: &OverlayContext, label: &'static str) -> GraphicsCommand {
        let mut descriptors = DescriptorBindings::new();
        let _ = descriptors.try_push(ctx.global_descriptor);
        GraphicsCommand::Draw(DrawCall {
            pipeline: ctx.pipeline,
            descriptors,
            vertex_count: 6,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
            blend: BlendState::AlphaBlend,
            depth: DepthState::OffNoCull,
            label,
        })
    }
}

/// Intersects a `w` x `h` rectangle at (`x`, `y`) with a `width` x `height` target.
fn clamped(x: i64, y: i64, w: u32, h: u32, width: u32, height: u32) -> ScissorRect {
    let x0 = x.clamp(0, i64::from(width));
    let y0 = y.clamp(0, i64::from(height));
    let x1 = (x + i64::from(w)).clamp(0, i64::from(width));
    let y1 = (y + i64::from(h)).clamp(0, i64::from(height));
    ScissorRect {
        x: x0 as i32,
        y: y0 as i32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    }
}

impl OverlayRenderer for DebugOverlay {
    fn record(&mut self, ctx: &OverlayContext, stream: &mut GraphicsCommandStream) {
        let panel = clamped(8, 8, self.panel.0, self.panel.1, ctx.width, ctx.height);
        if panel.width > 0 && panel.height > 0 {
            stream.append(GraphicsCommand::SetScissor(panel));
            stream.append(Self::quad(ctx, "debug_panel"));
        }

        let half = i64::from(self.marker / 2);
        let marker = clamped(
            ctx.cursor[0] as i64 - half,
            ctx.cursor[1] as i64 - half,
            self.marker,
            self.marker,
            ctx.width,
            ctx.height,
        );
        if marker.width > 0 && marker.height > 0 {
            stream.append(GraphicsCommand::SetScissor(marker));
            stream.append(Self::quad(ctx, "cursor_marker"));
        }

        // Leave the scissor covering the full target for whatever follows.
        stream.append(GraphicsCommand::SetScissor(ScissorRect::full(ctx.width, ctx.height)));
        self.frames_drawn += 1;
        if self.frames_drawn % 600 == 0 {
            log::debug!(
                "Overlay: frame {}, {} commands, {} draws",
                ctx.stats.frame_number,
                ctx.stats.commands_recorded,
                ctx.stats.draw_calls
            );
        }
    }

    fn shutdown(&mut self) {
        log::debug!("Debug overlay drew {} frames", self.frames_drawn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::renderer::CommandKind;

    fn ctx(width: u32, height: u32, cursor: [f32; 2]) -> OverlayContext {
        OverlayContext {
            pipeline: PipelineHandle(1),
            global_descriptor: DescriptorHandle(2),
            width,
            height,
            cursor,
            stats: RenderStats::default(),
        }
    }

    #[test]
    fn scissors_stay_inside_target() {
        let mut overlay = DebugOverlay::default();
        let mut stream = GraphicsCommandStream::new(16);
        overlay.record(&ctx(100, 40, [99.0, 39.0]), &mut stream);

        for cmd in stream.iter() {
            if let GraphicsCommand::SetScissor(rect) = cmd {
                assert!(rect.x as u32 + rect.width <= 100, "{rect:?}");
                assert!(rect.y as u32 + rect.height <= 40, "{rect:?}");
            }
        }
        assert_eq!(stream.count_of(CommandKind::Draw), 2);
        assert_eq!(overlay.frames_drawn(), 1);
    }

    #[test]
    fn offscreen_cursor_skips_marker() {
        let mut overlay = DebugOverlay::default();
        let mut stream = GraphicsCommandStream::new(16);
        overlay.record(&ctx(300, 200, [-50.0, -50.0]), &mut stream);
        assert_eq!(stream.count_of(CommandKind::Draw), 1);
    }
}
