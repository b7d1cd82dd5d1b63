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

//! Allocation helpers for data that is rebuilt wholesale instead of updated.
//!
//! - [`ByteArena`] holds raw blobs (compiled shader bytecode) whose extent is
//!   re-derived every time the set is reloaded.
//! - [`BoundedVec`] and [`InlineVec`] are append-only sequences with a fixed
//!   capacity, used wherever a hard limit (command budget, color target
//!   count, descriptor slot count) is part of the contract.

mod arena;
mod bounded;

pub use arena::{ArenaLimitError, ArenaSpan, ByteArena};
pub use bounded::{BoundedVec, CapacityError, InlineVec};
