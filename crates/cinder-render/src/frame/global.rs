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

use bytemuck::{Pod, Zeroable};

use super::camera::Camera;

/// Per-frame data visible to every shader through the global descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalData {
    /// Column-major projection from window pixels to clip space.
    pub projection: [[f32; 4]; 4],
    /// Column-major world-to-clip transform of the scene camera.
    pub view_projection: [[f32; 4]; 4],
    /// Window size in pixels.
    pub viewport: [f32; 2],
    /// Seconds since initialization.
    pub time: f32,
    /// Index of the frame being recorded.
    pub frame_index: u32,
}

impl GlobalData {
    /// Global data for a `width` x `height` window at time zero.
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        Self {
            projection: orthographic_projection(width, height),
            view_projection: camera.view_projection(width, height),
            viewport: [width as f32, height as f32],
            time: 0.0,
            frame_index: 0,
        }
    }

    /// Recomputes the size-dependent fields.
    pub fn resize(&mut self, camera: &Camera, width: u32, height: u32) {
        self.projection = orthographic_projection(width, height);
        self.view_projection = camera.view_projection(width, height);
        self.viewport = [width as f32, height as f32];
    }
}

/// An orthographic projection mapping window pixels to clip space.
///
/// The origin is the top-left corner and +Y points down; depth passes
/// through unchanged. A zero dimension is treated as one pixel.
pub fn orthographic_projection(width: u32, height: u32) -> [[f32; 4]; 4] {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    [
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, -2.0 / h, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transform(m: &[[f32; 4]; 4], p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (col, &component) in m.iter().zip(p.iter()) {
            for row in 0..4 {
                out[row] += col[row] * component;
            }
        }
        out
    }

    #[test]
    fn corners_map_to_clip_space() {
        let m = orthographic_projection(800, 600);
        let top_left = transform(&m, [0.0, 0.0, 0.0, 1.0]);
        let bottom_right = transform(&m, [800.0, 600.0, 0.0, 1.0]);
        let center = transform(&m, [400.0, 300.0, 0.5, 1.0]);

        assert_relative_eq!(top_left[0], -1.0);
        assert_relative_eq!(top_left[1], 1.0);
        assert_relative_eq!(bottom_right[0], 1.0);
        assert_relative_eq!(bottom_right[1], -1.0);
        assert_relative_eq!(center[0], 0.0);
        assert_relative_eq!(center[1], 0.0);
        assert_relative_eq!(center[2], 0.5);
    }

    #[test]
    fn global_data_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<GlobalData>(), 144);
        let data = GlobalData::new(&Camera::default(), 2, 2);
        assert_eq!(bytemuck::bytes_of(&data).len(), 144);
        assert_relative_eq!(data.projection[0][0], 1.0);
    }

    #[test]
    fn resize_tracks_the_camera_aspect() {
        let camera = Camera::default();
        let mut data = GlobalData::new(&camera, 800, 600);
        data.resize(&camera, 1600, 600);
        assert_eq!(data.view_projection, camera.view_projection(1600, 600));
        assert_eq!(data.viewport, [1600.0, 600.0]);
    }
}
