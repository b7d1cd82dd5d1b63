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

//! Shader loading and pipeline permutation management.

use std::path::PathBuf;

use cinder_core::memory::{ArenaSpan, ByteArena};
use cinder_core::renderer::{
    DescriptorLayout, GraphicsBackend, PipelineDesc, PipelineKey, ResourceError, ShaderError,
    ShaderProgramId, ShaderStage,
};
use cinder_core::PipelineHandle;

use super::loader::ShaderBytecodeLoader;
use super::programs::{application_layouts, program_spec};
use crate::registry::ResourceRegistry;

/// One compiled pipeline and the bytecode it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    /// The permutation key.
    pub key: PipelineKey,
    /// The backend pipeline.
    pub pipeline: PipelineHandle,
    /// Vertex bytecode in the manager's arena.
    pub vertex: ArenaSpan,
    /// Fragment bytecode in the manager's arena.
    pub fragment: ArenaSpan,
}

/// The live pipeline permutations, one per program.
#[derive(Debug, Clone, Default)]
pub struct PermutationTable {
    entries: Vec<Permutation>,
}

impl PermutationTable {
    /// The permutation built for `program`.
    pub fn get(&self, program: ShaderProgramId) -> Option<&Permutation> {
        self.entries.iter().find(|p| p.key.program == program)
    }

    /// Every permutation, in build order.
    pub fn iter(&self) -> std::slice::Iter<'_, Permutation> {
        self.entries.iter()
    }

    /// Backend handles of every permutation.
    pub fn handles(&self) -> Vec<PipelineHandle> {
        self.entries.iter().map(|p| p.pipeline).collect()
    }

    /// Number of permutations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no permutation is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads compiled shaders and owns the pipeline permutations built from them.
///
/// Loading is a two-phase commit: a complete new set of permutations is built
/// into a fresh arena first, and only once every program succeeded does it
/// replace the live set, whose pipelines are then destroyed. A failed load
/// leaves the live set untouched.
#[derive(Debug)]
pub struct ShaderManager {
    loader: ShaderBytecodeLoader,
    arena: ByteArena,
    table: PermutationTable,
    generation: u64,
    viewport: (u32, u32),
}

impl ShaderManager {
    /// Creates a manager reading artifacts from `shader_dir`.
    pub fn new(shader_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: ShaderBytecodeLoader::new(shader_dir),
            arena: ByteArena::new(),
            table: PermutationTable::default(),
            generation: 0,
            viewport: (0, 0),
        }
    }

    /// Caps the loaded bytecode of one generation at `limit` bytes.
    pub fn with_arena_limit(mut self, limit: usize) -> Self {
        self.arena = std::mem::take(&mut self.arena).with_limit(limit);
        self
    }

    /// Declares every descriptor layout the application uses, then loads
    /// every shader. Called once at initialization.
    pub fn load_all_shader_resources<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        registry: &mut ResourceRegistry,
        width: u32,
        height: u32,
    ) -> Result<(), ShaderError> {
        for (id, slots) in application_layouts() {
            let layout = DescriptorLayout::new(slots).map_err(ResourceError::from)?;
            registry.create_descriptor_layout(backend, id, &layout)?;
        }
        log::debug!("Declared {} descriptor layouts", registry.layout_count());
        self.load_all_shaders(backend, width, height)
    }

    /// Builds a permutation of every program for a `width` x `height`
    /// viewport and makes it live.
    pub fn load_all_shaders<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), ShaderError> {
        let mut arena = ByteArena::with_capacity(self.arena.capacity())
            .with_limit(self.arena.limit());
        let mut table = PermutationTable::default();

        if let Err(err) = self.build_into(backend, &mut arena, &mut table, (width, height)) {
            backend.destroy_pipelines(&table.handles());
            return Err(err);
        }

        let previous = std::mem::replace(&mut self.table, table);
        backend.destroy_pipelines(&previous.handles());
        self.arena = arena;
        self.generation += 1;
        self.viewport = (width, height);
        log::info!(
            "Loaded {} shader permutations at {width}x{height} ({} bytes of bytecode, generation {})",
            self.table.len(),
            self.arena.len(),
            self.generation
        );
        Ok(())
    }

    fn build_into<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        arena: &mut ByteArena,
        table: &mut PermutationTable,
        viewport: (u32, u32),
    ) -> Result<(), ShaderError> {
        let swapchain_format = backend.swapchain_format();
        for program in ShaderProgramId::ALL {
            let spec = program_spec(program, swapchain_format);
            let vertex = self.loader.load(arena, program, ShaderStage::Vertex)?;
            let fragment = self.loader.load(arena, program, ShaderStage::Fragment)?;
            let key = spec.key(viewport)?;
            let pipeline = backend.create_pipeline(&PipelineDesc {
                key,
                vertex_bytecode: arena.get(vertex).unwrap_or_default(),
                fragment_bytecode: arena.get(fragment).unwrap_or_default(),
                label: program.name(),
            })?;
            table.entries.push(Permutation {
                key,
                pipeline,
                vertex,
                fragment,
            });
        }
        Ok(())
    }

    /// Rebuilds every permutation from the artifacts currently on disk.
    ///
    /// On failure a warning is logged and the previous permutations stay live.
    pub fn reload_shaders<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), ShaderError> {
        log::info!("Reloading shaders from '{}'", self.loader.dir().display());
        self.load_all_shaders(backend, width, height).inspect_err(|err| {
            log::warn!(
                "Shader reload failed, keeping {} active permutations: {err}",
                self.table.len()
            );
        })
    }

    /// Rebuilds the permutations for a new window size.
    ///
    /// Every permutation embeds its viewport, so all of them are rebuilt,
    /// whether or not a given program actually depends on the size.
    pub fn create_window_dependent_resources<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), ShaderError> {
        log::debug!("Rebuilding window-dependent pipelines for {width}x{height}");
        self.reload_shaders(backend, width, height)
    }

    /// Destroys every permutation and frees the bytecode arena.
    pub fn shutdown<B: GraphicsBackend>(&mut self, backend: &mut B) {
        let table = std::mem::take(&mut self.table);
        backend.destroy_pipelines(&table.handles());
        self.arena.release();
        log::info!("Shader manager shut down");
    }

    /// The live pipeline of `program`.
    pub fn pipeline(&self, program: ShaderProgramId) -> Option<PipelineHandle> {
        self.table.get(program).map(|p| p.pipeline)
    }

    /// The live permutations.
    pub fn permutations(&self) -> &PermutationTable {
        &self.table
    }

    /// The loaded bytecode of one stage of `program`.
    pub fn bytecode(&self, program: ShaderProgramId, stage: ShaderStage) -> Option<&[u8]> {
        let permutation = self.table.get(program)?;
        let span = match stage {
            ShaderStage::Vertex => permutation.vertex,
            ShaderStage::Fragment => permutation.fragment,
        };
        self.arena.get(span)
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Viewport of the live permutations.
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Bytes of bytecode currently held.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{artifact_path, SPIRV_MAGIC};
    use cinder_infra::HeadlessBackend;
    use std::path::Path;

    fn write_stubs(dir: &Path) {
        for program in ShaderProgramId::ALL {
            for stage in ShaderStage::ALL {
                let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
                bytes.resize(20, 0);
                std::fs::write(artifact_path(dir, program, stage), bytes).unwrap();
            }
        }
    }

    fn loaded() -> (tempfile::TempDir, HeadlessBackend, ResourceRegistry, ShaderManager) {
        let dir = tempfile::tempdir().unwrap();
        write_stubs(dir.path());
        let mut backend = HeadlessBackend::new();
        backend.create_context(100, 50).unwrap();
        let mut registry = ResourceRegistry::new();
        let mut shaders = ShaderManager::new(dir.path());
        shaders
            .load_all_shader_resources(&mut backend, &mut registry, 100, 50)
            .unwrap();
        (dir, backend, registry, shaders)
    }

    #[test]
    fn initial_load_builds_every_program() {
        let (_dir, backend, registry, shaders) = loaded();
        assert_eq!(registry.layout_count(), 4);
        assert_eq!(shaders.permutations().len(), ShaderProgramId::ALL.len());
        assert_eq!(backend.pipeline_keys().len(), ShaderProgramId::ALL.len());
        assert_eq!(shaders.arena_len(), 20 * 2 * ShaderProgramId::ALL.len());
        assert_eq!(
            shaders
                .bytecode(ShaderProgramId::Blit, ShaderStage::Vertex)
                .map(<[u8]>::len),
            Some(20)
        );
    }

    #[test]
    fn reload_replaces_every_permutation() {
        let (_dir, mut backend, _registry, mut shaders) = loaded();
        let before = shaders.permutations().handles();

        shaders.reload_shaders(&mut backend, 100, 50).unwrap();
        let after = shaders.permutations().handles();

        assert_eq!(after.len(), ShaderProgramId::ALL.len());
        assert!(after.iter().all(|h| !before.contains(h)));
        let mut live = backend.pipeline_handles();
        live.sort();
        let mut expected = after.clone();
        expected.sort();
        assert_eq!(live, expected);
        assert_eq!(shaders.generation(), 2);
    }

    #[test]
    fn failed_reload_keeps_active_permutations() {
        let (dir, mut backend, _registry, mut shaders) = loaded();
        let before = shaders.permutations().handles();

        std::fs::write(
            artifact_path(dir.path(), ShaderProgramId::Overlay, ShaderStage::Fragment),
            b"not spirv",
        )
        .unwrap();
        let err = shaders.reload_shaders(&mut backend, 100, 50).unwrap_err();
        assert!(matches!(err, ShaderError::InvalidBytecode { .. }));
        assert_eq!(shaders.permutations().handles(), before);
        assert_eq!(backend.pipeline_handles().len(), before.len());
        assert_eq!(shaders.generation(), 1);
    }

    #[test]
    fn backend_compile_failure_rolls_back_partial_build() {
        let (_dir, mut backend, _registry, mut shaders) = loaded();
        let before = shaders.permutations().handles();
        backend.set_pipeline_failure(Some(ShaderProgramId::Blit));

        let err = shaders.reload_shaders(&mut backend, 100, 50).unwrap_err();
        assert!(matches!(err, ShaderError::Pipeline(_)));
        let mut live = backend.pipeline_handles();
        live.sort();
        assert_eq!(live, before);
    }

    #[test]
    fn bytecode_over_the_arena_limit_keeps_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        write_stubs(dir.path());
        let mut backend = HeadlessBackend::new();
        backend.create_context(100, 50).unwrap();
        let mut registry = ResourceRegistry::new();
        let limit = 20 * 2 * ShaderProgramId::ALL.len();
        let mut shaders = ShaderManager::new(dir.path()).with_arena_limit(limit);
        shaders
            .load_all_shader_resources(&mut backend, &mut registry, 100, 50)
            .unwrap();
        let before = shaders.permutations().handles();

        let mut bigger = SPIRV_MAGIC.to_le_bytes().to_vec();
        bigger.resize(24, 0);
        let path = artifact_path(dir.path(), ShaderProgramId::Blit, ShaderStage::Fragment);
        std::fs::write(path, bigger).unwrap();

        let err = shaders.reload_shaders(&mut backend, 100, 50).unwrap_err();
        assert!(matches!(err, ShaderError::TooLarge { limit: l, .. } if l == limit));
        assert_eq!(shaders.permutations().handles(), before);
        assert_eq!(shaders.arena_len(), limit);
        assert_eq!(backend.pipeline_handles().len(), before.len());
    }

    #[test]
    fn resize_rebuilds_for_new_viewport() {
        let (_dir, mut backend, _registry, mut shaders) = loaded();
        shaders
            .create_window_dependent_resources(&mut backend, 300, 200)
            .unwrap();
        assert_eq!(shaders.viewport(), (300, 200));
        assert!(backend
            .pipeline_keys()
            .iter()
            .all(|k| k.viewport == (300, 200)));
    }

    #[test]
    fn shutdown_destroys_pipelines_and_arena() {
        let (_dir, mut backend, _registry, mut shaders) = loaded();
        shaders.shutdown(&mut backend);
        assert!(backend.pipeline_handles().is_empty());
        assert!(shaders.permutations().is_empty());
        assert_eq!(shaders.arena_len(), 0);
    }
}
