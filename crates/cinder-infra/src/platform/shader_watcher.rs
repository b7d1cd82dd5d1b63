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

//! Watches the compiled-shader directory for changes.

use std::path::{Path, PathBuf};

use cinder_core::renderer::ShaderChangeMonitor;
use crossbeam_channel::{Receiver, TryRecvError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// A [`ShaderChangeMonitor`] fed by filesystem notifications on a directory
/// of compiled `.spv` artifacts.
///
/// Notifications arrive on a background thread owned by `notify` and are
/// queued on a channel; [`take_pending_change`](ShaderChangeMonitor::take_pending_change)
/// drains the queue on the render thread without blocking.
#[derive(Debug)]
pub struct ShaderDirWatcher {
    dir: PathBuf,
    events: Receiver<notify::Result<Event>>,
    // Dropping the watcher stops delivery.
    _watcher: RecommendedWatcher,
}

impl ShaderDirWatcher {
    /// Starts watching `dir` (non-recursively).
    pub fn new(dir: impl Into<PathBuf>) -> notify::Result<Self> {
        let dir = dir.into();
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching '{}' for shader changes", dir.display());
        Ok(Self {
            dir,
            events: rx,
            _watcher: watcher,
        })
    }

    /// The watched directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ShaderChangeMonitor for ShaderDirWatcher {
    fn take_pending_change(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    if is_shader_event(&event) {
                        log::debug!("Shader change detected: {:?}", event.paths);
                        changed = true;
                    }
                }
                Ok(Err(err)) => log::warn!("Shader watcher error: {err}"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Shader watcher for '{}' disconnected", self.dir.display());
                    break;
                }
            }
        }
        changed
    }
}

/// Returns `true` if `event` creates, modifies or removes a compiled shader.
pub fn is_shader_event(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| is_compiled_shader(p))
}

fn is_compiled_shader(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("spv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn only_spv_mutations_count() {
        let modify = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("shaders/scene.frag.spv"));
        assert!(is_shader_event(&modify));

        let create_other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("shaders/scene.frag.glsl"));
        assert!(!is_shader_event(&create_other));

        let access = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("shaders/blit.vert.SPV"));
        assert!(!is_shader_event(&access));
    }

    #[test]
    fn no_events_means_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = ShaderDirWatcher::new(dir.path()).unwrap();
        assert_eq!(watcher.dir(), dir.path());
        assert!(!watcher.take_pending_change());
    }
}
