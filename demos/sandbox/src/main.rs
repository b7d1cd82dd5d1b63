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

// Cinder sandbox
// Drives the frame orchestrator on the headless backend for a fixed number of
// frames, optionally minimizing the window and reloading shaders on the way.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cinder_core::renderer::{RendererConfig, ShaderProgramId, ShaderStage};
use cinder_infra::{HeadlessBackend, ShaderDirWatcher};
use cinder_render::shader::{artifact_path, SPIRV_MAGIC};
use cinder_render::{FrameOrchestrator, FrameState, InputState};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "sandbox", about = "Headless Cinder renderer sandbox")]
struct Args {
    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// RON renderer configuration. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured compiled shader directory.
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// Minimizes the window for ten frames starting at this frame.
    #[arg(long)]
    minimize_at: Option<u64>,

    /// Requests a shader reload at this frame.
    #[arg(long)]
    reload_at: Option<u64>,

    /// Writes placeholder SPIR-V artifacts into the shader directory first.
    #[arg(long)]
    stub_shaders: bool,

    /// Watches the shader directory and reloads on change.
    #[arg(long)]
    watch: bool,

    /// Log filter, e.g. `debug` or `cinder_render=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

const MINIMIZED_FRAMES: u64 = 10;

fn write_stub_shaders(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating shader directory '{}'", dir.display()))?;
    let words = [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0];
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    for program in ShaderProgramId::ALL {
        for stage in ShaderStage::ALL {
            let path = artifact_path(dir, program, stage);
            std::fs::write(&path, &bytes)
                .with_context(|| format!("writing '{}'", path.display()))?;
        }
    }
    log::info!("Wrote placeholder shaders to '{}'", dir.display());
    Ok(())
}

fn load_config(args: &Args) -> Result<RendererConfig> {
    let mut config = match &args.config {
        Some(path) => RendererConfig::load(path)
            .with_context(|| format!("loading renderer config '{}'", path.display()))?,
        None => RendererConfig::default(),
    };
    if let Some(dir) = &args.shader_dir {
        config.shader_dir = dir.clone();
    }
    if args.watch {
        config.hot_reload = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    let args = Args::parse();

    let mut logger = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(filter) = &args.log {
        logger.parse_filters(filter);
    }
    logger.init();

    let config = load_config(&args)?;
    if args.stub_shaders {
        write_stub_shaders(&config.shader_dir)?;
    }

    let shader_dir = config.shader_dir.clone();
    let mut renderer = FrameOrchestrator::new(HeadlessBackend::new(), config);
    if args.watch {
        let watcher = ShaderDirWatcher::new(&shader_dir)
            .with_context(|| format!("watching '{}'", shader_dir.display()))?;
        renderer = renderer.with_shader_monitor(watcher);
    }

    let minimized = args
        .minimize_at
        .map(|start| start..start + MINIMIZED_FRAMES);

    for frame in 0..args.frames {
        let (width, height) = match &minimized {
            Some(range) if range.contains(&frame) => (0, 0),
            _ => (args.width, args.height),
        };

        let was_minimized = renderer.state() == FrameState::Minimized;
        if (width == 0) != was_minimized
            && renderer.state() != FrameState::Uninitialized
            && renderer.resize(width, height) != 0
        {
            bail!("resize to {width}x{height} failed at frame {frame}");
        }

        let input = InputState {
            reload_shaders: args.reload_at == Some(frame),
            cursor_delta: [1.5, 0.75],
            ..InputState::default()
        };
        if renderer.update(width, height, &input) != 0 {
            bail!("frame {frame} failed");
        }
    }

    let stats = renderer.stats();
    let submitted = renderer.backend().frames_submitted();
    renderer.destroy();

    log::info!(
        "Rendered {} frames ({submitted} submitted, {} skipped), last frame: {} commands, {} draws, {} passes",
        stats.frame_number,
        stats.skipped_frames,
        stats.commands_recorded,
        stats.draw_calls,
        stats.render_passes
    );
    Ok(())
}
