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

use std::collections::HashMap;

use cinder_core::renderer::{
    DescriptorLayout, DescriptorLayoutId, DescriptorSetData, ImageLayout, PipelineKey, ResourceDesc,
    ResourceUsage,
};
use cinder_core::{DescriptorHandle, PipelineHandle, ResourceHandle};

#[derive(Debug)]
pub(crate) struct ResourceEntry {
    pub(crate) desc: ResourceDesc,
    /// Host-visible contents; empty for device-local resources.
    pub(crate) bytes: Vec<u8>,
    pub(crate) mapped: bool,
    pub(crate) layout: ImageLayout,
    pub(crate) swapchain: bool,
}

#[derive(Debug)]
pub(crate) struct DescriptorEntry {
    pub(crate) layout: DescriptorLayoutId,
    pub(crate) data: Option<DescriptorSetData>,
}

#[derive(Debug)]
pub(crate) struct PipelineEntry {
    pub(crate) key: PipelineKey,
    pub(crate) vertex_len: usize,
    pub(crate) fragment_len: usize,
}

/// Every object the backend owns, keyed by the handle it handed out.
#[derive(Debug, Default)]
pub(crate) struct ObjectTables {
    pub(crate) resources: HashMap<ResourceHandle, ResourceEntry>,
    pub(crate) layouts: HashMap<DescriptorLayoutId, DescriptorLayout>,
    pub(crate) descriptors: HashMap<DescriptorHandle, DescriptorEntry>,
    pub(crate) pipelines: HashMap<PipelineHandle, PipelineEntry>,

    next_resource_id: u32,
    next_descriptor_id: u32,
    next_pipeline_id: u32,
}

impl ObjectTables {
    // Ids are never reused, so a stale handle can never alias a new object.
    fn next_resource(&mut self) -> ResourceHandle {
        let id = ResourceHandle(self.next_resource_id);
        self.next_resource_id += 1;
        id
    }

    pub(crate) fn next_descriptor(&mut self) -> DescriptorHandle {
        let id = DescriptorHandle(self.next_descriptor_id);
        self.next_descriptor_id += 1;
        id
    }

    pub(crate) fn next_pipeline(&mut self) -> PipelineHandle {
        let id = PipelineHandle(self.next_pipeline_id);
        self.next_pipeline_id += 1;
        id
    }

    pub(crate) fn insert_resource(
        &mut self,
        desc: ResourceDesc,
        swapchain: bool,
    ) -> ResourceHandle {
        let handle = self.next_resource();
        let bytes = match desc.buffer_size() {
            Some(size) if desc.usage.contains(ResourceUsage::HOST_VISIBLE) => {
                vec![0; size as usize]
            }
            _ => Vec::new(),
        };
        self.resources.insert(
            handle,
            ResourceEntry {
                desc,
                bytes,
                mapped: false,
                layout: ImageLayout::Undefined,
                swapchain,
            },
        );
        handle
    }
}
