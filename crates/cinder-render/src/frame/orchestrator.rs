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

//! The frame lifecycle state machine and per-frame recording.
//!
//! [`FrameOrchestrator`] owns the backend and the [`FrameContext`]. It
//! initializes lazily on the first drawable frame, records and submits each
//! frame, rebuilds window-sized state on resize and tears everything down in
//! reverse creation order.

use std::fmt;

use cinder_core::renderer::{
    AcquireError, BlendState, CommandKind, DepthState, DescriptorBindings, DrawCall,
    GraphicsBackend, GraphicsCommand, ImageLayout, RenderStats, RendererConfig, ScissorRect,
    ShaderChangeMonitor, ShaderProgramId,
};
use cinder_core::ResourceHandle;

use super::context::FrameContext;
use super::error::FrameError;
use super::geometry::DefaultGeometry;
use super::input::{InputState, SessionLink};
use super::overlay::{DebugOverlay, OverlayContext, OverlayRenderer};

/// Lifecycle state of a [`FrameOrchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Nothing has been created yet; the first update initializes.
    Uninitialized,
    /// Frames are recorded and submitted.
    Running,
    /// The window has no drawable area; updates skip recording.
    Minimized,
    /// Everything has been released.
    Destroyed,
}

/// Drives initialization, per-frame recording, resize and teardown.
///
/// The three entry points used by the application shell return the coarse
/// status codes the shell expects: `0` on success (including skipped frames)
/// and `1` on failure. The `try_*` variants return the underlying
/// [`FrameError`].
pub struct FrameOrchestrator<B: GraphicsBackend> {
    backend: B,
    config: RendererConfig,
    state: FrameState,
    context: Option<FrameContext>,
    overlay: Option<Box<dyn OverlayRenderer>>,
    monitor: Option<Box<dyn ShaderChangeMonitor>>,
    session: Option<Box<dyn SessionLink>>,
}

impl<B: GraphicsBackend> fmt::Debug for FrameOrchestrator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameOrchestrator")
            .field("backend", &self.backend)
            .field("state", &self.state)
            .field("context", &self.context)
            .field("overlay", &self.overlay.is_some())
            .field("monitor", &self.monitor.is_some())
            .field("session", &self.session.is_some())
            .finish()
    }
}

impl<B: GraphicsBackend> FrameOrchestrator<B> {
    /// Creates an orchestrator over `backend`. Nothing is created on the
    /// backend until the first update.
    pub fn new(backend: B, config: RendererConfig) -> Self {
        Self {
            backend,
            config,
            state: FrameState::Uninitialized,
            context: None,
            overlay: Some(Box::new(DebugOverlay::default())),
            monitor: None,
            session: None,
        }
    }

    /// Replaces the built-in [`DebugOverlay`].
    pub fn with_overlay(mut self, overlay: impl OverlayRenderer + 'static) -> Self {
        self.overlay = Some(Box::new(overlay));
        self
    }

    /// Polls `monitor` once per frame when hot reload is enabled.
    pub fn with_shader_monitor(mut self, monitor: impl ShaderChangeMonitor + 'static) -> Self {
        self.monitor = Some(Box::new(monitor));
        self
    }

    /// Calls `session` after every submitted frame.
    pub fn with_session(mut self, session: impl SessionLink + 'static) -> Self {
        self.session = Some(Box::new(session));
        self
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The configuration.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// The frame context, once initialized.
    pub fn context(&self) -> Option<&FrameContext> {
        self.context.as_ref()
    }

    /// Statistics of the last submitted frame.
    pub fn stats(&self) -> RenderStats {
        self.context.as_ref().map(|c| c.stats).unwrap_or_default()
    }

    /// The current main color target.
    pub fn main_color_target(&self) -> Option<ResourceHandle> {
        self.context.as_ref().map(|c| c.targets.main_color)
    }

    /// Runs one frame. Returns `0` on success or skip, `1` on failure.
    pub fn update(&mut self, width: u32, height: u32, input: &InputState) -> i32 {
        status(self.try_update(width, height, input), "Frame update")
    }

    /// Handles a window resize. Returns `0` on success, `1` on failure.
    pub fn resize(&mut self, width: u32, height: u32) -> i32 {
        status(self.try_resize(width, height), "Resize")
    }

    /// Runs one frame.
    pub fn try_update(
        &mut self,
        width: u32,
        height: u32,
        input: &InputState,
    ) -> Result<(), FrameError> {
        match self.state {
            FrameState::Destroyed => return Err(FrameError::Destroyed),
            FrameState::Uninitialized => {
                if width == 0 || height == 0 {
                    log::debug!("Deferring initialization until the window has a drawable area");
                    return Ok(());
                }
                self.initialize(width, height)?;
            }
            FrameState::Running | FrameState::Minimized => {}
        }
        let Some(ctx) = self.context.as_mut() else {
            return Ok(());
        };

        if self.state == FrameState::Minimized {
            ctx.stats.skipped_frames += 1;
            log::trace!("Window minimized, skipping frame");
            return Ok(());
        }

        if input.toggle_overlay {
            ctx.overlay_visible = !ctx.overlay_visible;
            log::info!(
                "Overlay {}",
                if ctx.overlay_visible { "shown" } else { "hidden" }
            );
        }
        ctx.cursor = [
            (ctx.cursor[0] + input.cursor_delta[0]).clamp(0.0, ctx.width as f32),
            (ctx.cursor[1] + input.cursor_delta[1]).clamp(0.0, ctx.height as f32),
        ];

        let changed_on_disk = self.config.hot_reload
            && self
                .monitor
                .as_mut()
                .is_some_and(|m| m.take_pending_change());
        if input.reload_shaders || changed_on_disk {
            // A failed reload is logged and the previous permutations stay live.
            let _ = ctx.shaders.reload_shaders(&mut self.backend, ctx.width, ctx.height);
        }

        let image = match self.backend.acquire_frame() {
            Ok(image) => image,
            Err(AcquireError::Minimized) => {
                ctx.stats.skipped_frames += 1;
                log::debug!("No frame available while minimized, skipping");
                return Ok(());
            }
            Err(err) => {
                log::warn!("Failed to acquire frame: {err}");
                return Err(FrameError::Acquire(err));
            }
        };

        record_frame(&mut self.backend, ctx, self.overlay.as_deref_mut(), image)?;

        self.backend.begin_translation()?;
        self.backend.translate(&ctx.stream)?;
        self.backend.end_translation()?;
        self.backend.submit_frame()?;

        let stream = &ctx.stream;
        ctx.stats = RenderStats {
            frame_number: ctx.stats.frame_number + 1,
            commands_recorded: stream.len(),
            draw_calls: stream.count_of(CommandKind::Draw) as u32,
            render_passes: stream.count_of(CommandKind::BeginRenderPass) as u32,
            timestamps: stream.count_of(CommandKind::Timestamp) as u32,
            skipped_frames: ctx.stats.skipped_frames,
        };
        log::trace!(
            "Submitted frame {} ({} commands)",
            ctx.stats.frame_number,
            stream.len()
        );

        if let Some(session) = self.session.as_mut() {
            if !session.send(&ctx.stats) {
                return Err(FrameError::Session);
            }
        }
        Ok(())
    }

    /// Handles a window resize.
    ///
    /// `(0, 0)` suspends rendering. Any other size rebuilds the pipelines and
    /// window targets, rewrites every descriptor bound to a replaced target
    /// and resumes rendering.
    pub fn try_resize(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        match self.state {
            FrameState::Destroyed => return Err(FrameError::Destroyed),
            FrameState::Uninitialized => {
                log::debug!("Resize to {width}x{height} before initialization, ignored");
                return Ok(());
            }
            FrameState::Running | FrameState::Minimized => {}
        }
        let Some(ctx) = self.context.as_mut() else {
            return Ok(());
        };

        if width == 0 || height == 0 {
            self.backend.notify_resize(0, 0);
            self.state = FrameState::Minimized;
            log::info!("Window minimized, rendering suspended");
            return Ok(());
        }

        self.backend.notify_resize(width, height);
        ctx.shaders
            .create_window_dependent_resources(&mut self.backend, width, height)?;
        ctx.targets
            .recreate(&mut self.backend, &mut ctx.registry, width, height)?;
        ctx.resize(width, height, self.backend.max_color_targets())?;
        self.state = FrameState::Running;
        log::info!("Renderer resized to {width}x{height}");
        Ok(())
    }

    /// Releases everything created at initialization, in reverse order.
    ///
    /// A no-op apart from the state change if initialization never completed.
    pub fn destroy(&mut self) {
        if let Some(ctx) = self.context.take() {
            log::info!("Destroying renderer");
            if let Some(overlay) = self.overlay.as_mut() {
                overlay.shutdown();
            }
            teardown(&mut self.backend, ctx);
            self.backend.destroy_context();
        }
        self.state = FrameState::Destroyed;
    }

    fn initialize(&mut self, width: u32, height: u32) -> Result<(), FrameError> {
        log::info!("Initializing renderer at {width}x{height}");
        self.backend.create_context(width, height)?;
        match FrameContext::create(&mut self.backend, &self.config, width, height) {
            Ok(context) => {
                log::info!(
                    "Renderer initialized: {} permutations, {} resources, {} descriptors",
                    context.shaders.permutations().len(),
                    context.registry.resource_count(),
                    context.registry.descriptor_count()
                );
                self.context = Some(context);
                self.state = FrameState::Running;
                Ok(())
            }
            Err(err) => {
                self.backend.destroy_context();
                Err(err)
            }
        }
    }
}

fn status(result: Result<(), FrameError>, what: &str) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{what} failed: {err}");
            1
        }
    }
}

fn transition(
    ctx: &mut FrameContext,
    image: ResourceHandle,
    from: ImageLayout,
    to: ImageLayout,
    label: &'static str,
) {
    ctx.stream.append(GraphicsCommand::LayoutTransition {
        image,
        from,
        to,
        label,
    });
}

fn timestamp(ctx: &mut FrameContext, label: &'static str) {
    if ctx.config.enable_gpu_timestamps {
        ctx.stream.append(GraphicsCommand::Timestamp { label });
    }
}

fn pipeline(
    ctx: &FrameContext,
    program: ShaderProgramId,
) -> Result<cinder_core::PipelineHandle, FrameError> {
    ctx.shaders
        .pipeline(program)
        .ok_or(FrameError::MissingPipeline(program))
}

/// Records one complete frame into `ctx.stream`, rendering into `image`.
fn record_frame<B: GraphicsBackend>(
    backend: &mut B,
    ctx: &mut FrameContext,
    overlay: Option<&mut (dyn OverlayRenderer + 'static)>,
    image: ResourceHandle,
) -> Result<(), FrameError> {
    let (width, height) = (ctx.width, ctx.height);
    let full = ScissorRect::full(width, height);
    let main = ctx.targets.main_color;

    ctx.stream.reset();

    let time = ctx.elapsed();
    ctx.global.time = time;
    ctx.global.frame_index = ctx.stats.frame_number as u32;
    ctx.registry.write_mapped(
        backend,
        ctx.global_buffer,
        0,
        bytemuck::bytes_of(&ctx.global),
    )?;
    ctx.animated
        .update(backend, &ctx.registry, time, width, height)?;

    transition(
        ctx,
        main,
        ImageLayout::Undefined,
        ImageLayout::TransferDst,
        "main_color_to_transfer",
    );
    ctx.stream.append(GraphicsCommand::ClearImage {
        image: main,
        color: ctx.config.clear_color,
        label: "clear_main_color",
    });
    transition(
        ctx,
        main,
        ImageLayout::TransferDst,
        ImageLayout::ColorAttachment,
        "main_color_to_render",
    );
    timestamp(ctx, "frame_start");

    let scene = pipeline(ctx, ShaderProgramId::Scene)?;
    ctx.main_pass.start(&mut ctx.stream);
    ctx.stream.append(GraphicsCommand::SetScissor(full));
    ctx.animated
        .record(&mut ctx.stream, scene, ctx.global_descriptor);
    ctx.main_pass.end(&mut ctx.stream);
    timestamp(ctx, "main_pass_end");

    if let Some(overlay) = overlay.filter(|_| ctx.overlay_visible) {
        let overlay_ctx = OverlayContext {
            pipeline: pipeline(ctx, ShaderProgramId::Overlay)?,
            global_descriptor: ctx.global_descriptor,
            width,
            height,
            cursor: ctx.cursor,
            stats: ctx.stats,
        };
        ctx.overlay_pass.start(&mut ctx.stream);
        ctx.stream.append(GraphicsCommand::SetScissor(full));
        overlay.record(&overlay_ctx, &mut ctx.stream);
        ctx.overlay_pass.end(&mut ctx.stream);
    }

    transition(
        ctx,
        main,
        ImageLayout::ColorAttachment,
        ImageLayout::ShaderReadOnly,
        "main_color_to_read",
    );
    transition(
        ctx,
        image,
        ImageLayout::Undefined,
        ImageLayout::ColorAttachment,
        "swapchain_to_render",
    );

    let blit = pipeline(ctx, ShaderProgramId::Blit)?;
    ctx.blit_pass.configure(
        width,
        height,
        &[image],
        None,
        backend.max_color_targets(),
        "blit",
    )?;
    ctx.blit_pass.start(&mut ctx.stream);
    ctx.stream.append(GraphicsCommand::SetScissor(full));
    let mut descriptors = DescriptorBindings::new();
    let _ = descriptors.try_push(ctx.blit_descriptor);
    let _ = descriptors.try_push(ctx.geometry.vertex_descriptor);
    ctx.stream.append(GraphicsCommand::Draw(DrawCall {
        pipeline: blit,
        descriptors,
        vertex_count: DefaultGeometry::VERTEX_COUNT,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 0,
        blend: BlendState::Replace,
        depth: DepthState::OffNoCull,
        label: "swapchain_blit",
    }));
    ctx.blit_pass.end(&mut ctx.stream);
    transition(
        ctx,
        image,
        ImageLayout::ColorAttachment,
        ImageLayout::Present,
        "swapchain_to_present",
    );
    Ok(())
}

/// Releases everything in `ctx`. Failures are logged and teardown continues.
fn teardown<B: GraphicsBackend>(backend: &mut B, ctx: FrameContext) {
    let FrameContext {
        mut stream,
        mut registry,
        mut shaders,
        targets,
        global_buffer,
        geometry,
        animated,
        ..
    } = ctx;

    // Descriptors go first so no resource below is still bound.
    registry.destroy_all_descriptors(backend);

    let released = [
        ("window targets", targets.destroy(backend, &mut registry)),
        ("default geometry", geometry.destroy(backend, &mut registry)),
        ("animated content", animated.destroy(backend, &mut registry)),
        ("global data buffer", registry.destroy_resource(backend, global_buffer)),
    ];
    for (what, result) in released {
        if let Err(err) = result {
            log::warn!("Failed to release {what}: {err}");
        }
    }
    if registry.resource_count() > 0 {
        log::warn!("{} resources outlived teardown", registry.resource_count());
    }

    shaders.shutdown(backend);
    stream.reset();
    log::debug!(
        "Released command stream storage ({} commands)",
        stream.capacity()
    );
}
