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

//! The per-frame command stream: a bounded, append-only list of
//! [`GraphicsCommand`]s recorded in submission order.

use crate::memory::BoundedVec;

use super::command::{CommandKind, GraphicsCommand};

/// The append-only log of one frame's GPU operations.
///
/// Storage is allocated once at a fixed capacity. [`reset`](Self::reset)
/// rewinds the length without releasing storage, so steady-state frames never
/// allocate. Overflowing the capacity is a configuration error and panics:
/// silently dropping commands would leave the rest of the frame operating on
/// GPU state that was never established.
#[derive(Debug, Clone)]
pub struct GraphicsCommandStream {
    commands: BoundedVec<GraphicsCommand>,
}

impl GraphicsCommandStream {
    /// Allocates a stream that can hold `capacity` commands per frame.
    pub fn new(capacity: usize) -> Self {
        Self {
            commands: BoundedVec::with_capacity(capacity),
        }
    }

    /// Sets the length to zero. Capacity is unchanged.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Appends `command` after every previously appended command.
    ///
    /// # Panics
    ///
    /// Panics if the stream already holds `capacity` commands.
    pub fn append(&mut self, command: GraphicsCommand) {
        if let Err(err) = self.commands.try_push(command) {
            panic!(
                "graphics command stream overflow while appending {:?}: {}",
                command.kind(),
                err
            );
        }
    }

    /// Number of commands recorded since the last reset.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing has been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Maximum number of commands per frame.
    pub fn capacity(&self) -> usize {
        self.commands.capacity()
    }

    /// Recorded commands, in append order.
    pub fn commands(&self) -> &[GraphicsCommand] {
        self.commands.as_slice()
    }

    /// Iterates recorded commands in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, GraphicsCommand> {
        self.commands().iter()
    }

    /// Counts recorded commands of one kind.
    pub fn count_of(&self, kind: CommandKind) -> usize {
        self.iter().filter(|c| c.kind() == kind).count()
    }
}

impl<'a> IntoIterator for &'a GraphicsCommandStream {
    type Item = &'a GraphicsCommand;
    type IntoIter = std::slice::Iter<'a, GraphicsCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
