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

//! An in-memory graphics backend.
//!
//! [`HeadlessBackend`] implements the full [`GraphicsBackend`] contract
//! without a GPU. Translation validates each recorded command against the
//! live object tables and the tracked image layouts, so ordering and
//! handle-lifetime mistakes in frame recording surface as
//! [`BackendError::Translation`] errors naming the offending command.
//!
//! [`GraphicsBackend`]: cinder_core::renderer::GraphicsBackend
//! [`BackendError::Translation`]: cinder_core::renderer::BackendError::Translation

mod backend;
mod tables;
mod validate;

pub use self::backend::{FailurePoint, HeadlessBackend, HeadlessConfig, SubmittedFrame};
