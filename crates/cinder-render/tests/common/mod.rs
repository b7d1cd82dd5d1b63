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

//! Shared fixtures for the orchestrator integration tests.

#![allow(dead_code)]

use std::path::Path;

use cinder_core::renderer::{RendererConfig, ShaderProgramId, ShaderStage};
use cinder_infra::HeadlessBackend;
use cinder_render::shader::{artifact_path, SPIRV_MAGIC};
use cinder_render::FrameOrchestrator;
use tempfile::TempDir;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 360;

/// A minimal SPIR-V header: magic, version, generator, bound, schema.
pub fn stub_spirv() -> Vec<u8> {
    [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect()
}

pub fn write_stub_shaders(dir: &Path) {
    for program in ShaderProgramId::ALL {
        for stage in ShaderStage::ALL {
            std::fs::write(artifact_path(dir, program, stage), stub_spirv()).unwrap();
        }
    }
}

pub fn shader_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_stub_shaders(dir.path());
    dir
}

pub fn config(dir: &Path) -> RendererConfig {
    RendererConfig {
        shader_dir: dir.to_path_buf(),
        command_capacity: 256,
        animated_quads: 4,
        ..RendererConfig::default()
    }
}

pub fn orchestrator(dir: &Path) -> FrameOrchestrator<HeadlessBackend> {
    FrameOrchestrator::new(HeadlessBackend::new(), config(dir))
}
