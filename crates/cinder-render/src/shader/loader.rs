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

//! Reading compiled SPIR-V artifacts from disk.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use cinder_core::memory::{ArenaSpan, ByteArena};
use cinder_core::renderer::{ShaderError, ShaderProgramId, ShaderStage};

/// First word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Location of the compiled artifact for one stage of one program:
/// `<dir>/<program>.<stage>.spv`.
pub fn artifact_path(dir: &Path, program: ShaderProgramId, stage: ShaderStage) -> PathBuf {
    dir.join(format!("{}.{}.spv", program.name(), stage.extension()))
}

/// Checks that `bytes` looks like a SPIR-V module.
pub fn validate_bytecode(path: &Path, bytes: &[u8]) -> Result<(), ShaderError> {
    let invalid = |reason| ShaderError::InvalidBytecode {
        path: path.to_path_buf(),
        reason,
    };
    if bytes.is_empty() {
        return Err(invalid("file is empty"));
    }
    if bytes.len() % 4 != 0 {
        return Err(invalid("size is not a multiple of 4"));
    }
    let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != SPIRV_MAGIC {
        return Err(invalid("missing SPIR-V magic number"));
    }
    Ok(())
}

/// Reads compiled shader artifacts into a [`ByteArena`].
#[derive(Debug, Clone)]
pub struct ShaderBytecodeLoader {
    dir: PathBuf,
}

impl ShaderBytecodeLoader {
    /// Loads artifacts from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The compiled-shader directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads one stage into `arena` and returns where it landed.
    ///
    /// The blob size comes from the filesystem; the file carries no header.
    /// A file that would not fit under the arena's limit is rejected before
    /// it is read.
    pub fn load(
        &self,
        arena: &mut ByteArena,
        program: ShaderProgramId,
        stage: ShaderStage,
    ) -> Result<ArenaSpan, ShaderError> {
        let path = artifact_path(&self.dir, program, stage);
        let io_err = |source: std::io::Error| ShaderError::Io {
            path: path.clone(),
            source,
        };

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ShaderError::Missing { path: path.clone() });
            }
            Err(err) => return Err(io_err(err)),
        };
        let size = file.metadata().map_err(io_err)?.len();
        let limit = arena.limit();
        let too_large = || ShaderError::TooLarge {
            path: path.clone(),
            size,
            limit,
        };
        let len = usize::try_from(size).map_err(|_| too_large())?;
        let span = arena.alloc(len).map_err(|_| too_large())?;
        let dst = arena
            .get_mut(span)
            .ok_or_else(|| io_err(ErrorKind::OutOfMemory.into()))?;
        file.read_exact(dst).map_err(io_err)?;
        validate_bytecode(&path, dst)?;

        log::trace!("Loaded '{}' ({len} bytes)", path.display());
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spirv(words: usize) -> Vec<u8> {
        let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
        bytes.resize(words * 4, 0);
        bytes
    }

    #[test]
    fn artifact_names_follow_convention() {
        let path = artifact_path(
            Path::new("spv"),
            ShaderProgramId::Overlay,
            ShaderStage::Vertex,
        );
        assert_eq!(path, Path::new("spv").join("overlay.vert.spv"));
    }

    #[test]
    fn validation_rejects_malformed_blobs() {
        let path = Path::new("x.spv");
        assert!(validate_bytecode(path, &spirv(5)).is_ok());
        assert!(matches!(
            validate_bytecode(path, &[]),
            Err(ShaderError::InvalidBytecode {
                reason: "file is empty",
                ..
            })
        ));
        assert!(matches!(
            validate_bytecode(path, &spirv(5)[..7]),
            Err(ShaderError::InvalidBytecode { .. })
        ));
        assert!(matches!(
            validate_bytecode(path, &[0u8; 8]),
            Err(ShaderError::InvalidBytecode {
                reason: "missing SPIR-V magic number",
                ..
            })
        ));
    }

    #[test]
    fn load_reads_whole_file_into_arena() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = spirv(6);
        std::fs::write(
            artifact_path(dir.path(), ShaderProgramId::Scene, ShaderStage::Fragment),
            &bytes,
        )
        .unwrap();

        let loader = ShaderBytecodeLoader::new(dir.path());
        let mut arena = ByteArena::new();
        arena.alloc_copy(&[0xAA; 4]).unwrap();
        let span = loader
            .load(&mut arena, ShaderProgramId::Scene, ShaderStage::Fragment)
            .unwrap();
        assert_eq!(span.offset, 4);
        assert_eq!(arena.get(span), Some(bytes.as_slice()));
    }

    #[test]
    fn artifact_over_the_arena_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            artifact_path(dir.path(), ShaderProgramId::Blit, ShaderStage::Vertex),
            spirv(8),
        )
        .unwrap();

        let loader = ShaderBytecodeLoader::new(dir.path());
        let mut arena = ByteArena::new().with_limit(16);
        let err = loader
            .load(&mut arena, ShaderProgramId::Blit, ShaderStage::Vertex)
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::TooLarge {
                size: 32,
                limit: 16,
                ..
            }
        ));
        assert!(arena.is_empty());
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ShaderBytecodeLoader::new(dir.path());
        let err = loader
            .load(
                &mut ByteArena::new(),
                ShaderProgramId::Blit,
                ShaderStage::Vertex,
            )
            .unwrap_err();
        assert!(matches!(err, ShaderError::Missing { .. }));
    }
}
