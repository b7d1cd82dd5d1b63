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

//! Shader reload through the orchestrator: on demand, on file change and
//! after a broken rebuild.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use cinder_core::renderer::{RendererConfig, ShaderChangeMonitor, ShaderProgramId, ShaderStage};
use cinder_infra::HeadlessBackend;
use cinder_render::shader::artifact_path;
use cinder_render::{FrameOrchestrator, InputState};
use common::{config, orchestrator, shader_dir, HEIGHT, WIDTH};

fn reload() -> InputState {
    InputState {
        reload_shaders: true,
        ..InputState::default()
    }
}

fn sorted(mut handles: Vec<cinder_core::PipelineHandle>) -> Vec<cinder_core::PipelineHandle> {
    handles.sort();
    handles
}

#[test]
fn reload_hotkey_replaces_every_permutation() {
    let dir = shader_dir();
    let mut renderer = orchestrator(dir.path());
    renderer.update(WIDTH, HEIGHT, &InputState::default());
    let before = sorted(renderer.backend().pipeline_handles());

    assert_eq!(renderer.update(WIDTH, HEIGHT, &reload()), 0);

    let after = sorted(renderer.backend().pipeline_handles());
    assert_eq!(after.len(), ShaderProgramId::ALL.len());
    assert!(after.iter().all(|h| !before.contains(h)));

    let mut programs: Vec<_> = renderer
        .backend()
        .pipeline_keys()
        .iter()
        .map(|k| k.program)
        .collect();
    programs.sort();
    assert_eq!(programs, ShaderProgramId::ALL.to_vec());
    assert_eq!(renderer.context().unwrap().shaders.generation(), 2);
}

#[test]
fn broken_rebuild_keeps_rendering_with_previous_pipelines() {
    let dir = shader_dir();
    let mut renderer = orchestrator(dir.path());
    renderer.update(WIDTH, HEIGHT, &InputState::default());
    let before = sorted(renderer.backend().pipeline_handles());

    std::fs::remove_file(artifact_path(dir.path(), ShaderProgramId::Blit, ShaderStage::Fragment))
        .unwrap();
    assert_eq!(renderer.update(WIDTH, HEIGHT, &reload()), 0);

    assert_eq!(sorted(renderer.backend().pipeline_handles()), before);
    assert_eq!(renderer.backend().frames_submitted(), 2);
    assert_eq!(renderer.context().unwrap().shaders.generation(), 1);
}

#[test]
fn broken_rebuild_on_resize_is_an_error() {
    let dir = shader_dir();
    let mut renderer = orchestrator(dir.path());
    renderer.update(WIDTH, HEIGHT, &InputState::default());

    std::fs::write(
        artifact_path(dir.path(), ShaderProgramId::Scene, ShaderStage::Vertex),
        [1u8, 2, 3],
    )
    .unwrap();
    assert_eq!(renderer.resize(WIDTH * 2, HEIGHT * 2), 1);
}

#[derive(Clone)]
struct FlagMonitor(Rc<Cell<bool>>);

impl ShaderChangeMonitor for FlagMonitor {
    fn take_pending_change(&mut self) -> bool {
        self.0.replace(false)
    }
}

#[test]
fn monitor_triggers_reload_when_hot_reload_is_enabled() {
    let dir = shader_dir();
    let flag = Rc::new(Cell::new(false));
    let mut renderer = FrameOrchestrator::new(
        HeadlessBackend::new(),
        RendererConfig {
            hot_reload: true,
            ..config(dir.path())
        },
    )
    .with_shader_monitor(FlagMonitor(Rc::clone(&flag)));

    renderer.update(WIDTH, HEIGHT, &InputState::default());
    renderer.update(WIDTH, HEIGHT, &InputState::default());
    assert_eq!(renderer.context().unwrap().shaders.generation(), 1);

    flag.set(true);
    renderer.update(WIDTH, HEIGHT, &InputState::default());
    assert_eq!(renderer.context().unwrap().shaders.generation(), 2);
    assert!(!flag.get());
}

#[test]
fn monitor_is_ignored_when_hot_reload_is_disabled() {
    let dir = shader_dir();
    let flag = Rc::new(Cell::new(true));
    let mut renderer = orchestrator(dir.path())
        .with_shader_monitor(FlagMonitor(Rc::clone(&flag)));

    renderer.update(WIDTH, HEIGHT, &InputState::default());
    renderer.update(WIDTH, HEIGHT, &InputState::default());
    assert_eq!(renderer.context().unwrap().shaders.generation(), 1);
    assert!(flag.get());
}
