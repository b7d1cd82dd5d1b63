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


//! A look-at camera producing the scene's view-projection matrix.
//!
//! Matrices are column-major `[[f32; 4]; 4]`, right-handed, with a `[0, 1]`
//! depth range.

type Vec3 = [f32; 3];
type Mat4 = [[f32; 4]; 4];

const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// A perspective camera looking from `eye` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera position.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// World up direction.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y_radians: f32,
    /// Distance to the near clipping plane.
    pub z_near: f32,
    /// Distance to the far clipping plane.
    pub z_far: f32,
}

impl Default for Camera {
    /// Looks at the origin from `(27, 27, 27)` with a 60 degree field of view.
    fn default() -> Self {
        Self {
            eye: [27.0, 27.0, 27.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_y_radians: 60.0_f32.to_radians(),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

impl Camera {
    /// The world-to-view matrix, or `None` if `eye` and `target` coincide or
    /// the view direction is parallel to `up`.
    pub fn view_matrix(&self) -> Option<Mat4> {
        look_at_rh(self.eye, self.target, self.up)
    }

    /// The projection for a `width` x `height` viewport. A zero dimension is
    /// treated as one pixel.
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        perspective_rh_zo(self.fov_y_radians, aspect, self.z_near, self.z_far)
    }

    /// `projection * view` for a `width` x `height` viewport.
    ///
    /// A degenerate view falls back to the identity view.
    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        let view = self.view_matrix().unwrap_or_else(|| {
            log::warn!(
                "Degenerate camera at {:?}, using the identity view",
                self.eye
            );
            IDENTITY
        });
        mul(&self.projection_matrix(width, height), &view)
    }
}

fn perspective_rh_zo(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y_radians * 0.5).tan();
    let range = near - far;
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far / range, -1.0],
        [0.0, 0.0, near * far / range, 0.0],
    ]
}

fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Mat4> {
    let f = normalize(sub(target, eye))?;
    let s = normalize(cross(f, up))?;
    let u = cross(s, f);
    Some([
        [s[0], u[0], -f[0], 0.0],
        [s[1], u[1], -f[1], 0.0],
        [s[2], u[2], -f[2], 0.0],
        [-dot(eye, s), -dot(eye, u), dot(eye, f), 1.0],
    ])
}

fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (col, b_col) in out.iter_mut().zip(b.iter()) {
        for (row, value) in col.iter_mut().enumerate() {
            *value = (0..4).map(|k| a[k][row] * b_col[k]).sum();
        }
    }
    out
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: Vec3) -> Option<Vec3> {
    let len = dot(v, v).sqrt();
    (len > f32::EPSILON).then(|| [v[0] / len, v[1] / len, v[2] / len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transform(m: &Mat4, p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (col, &component) in m.iter().zip(p.iter()) {
            for row in 0..4 {
                out[row] += col[row] * component;
            }
        }
        out
    }

    #[test]
    fn target_lands_at_screen_center() {
        let camera = Camera::default();
        let clip = transform(&camera.view_projection(800, 600), [0.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(clip[0] / clip[3], 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip[1] / clip[3], 0.0, epsilon = 1e-5);
        let depth = clip[2] / clip[3];
        assert!((0.0..=1.0).contains(&depth), "{depth}");
    }

    #[test]
    fn view_moves_eye_to_origin() {
        let camera = Camera::default();
        let view = camera.view_matrix().unwrap();
        let eye = transform(&view, [27.0, 27.0, 27.0, 1.0]);
        for component in &eye[..3] {
            assert_relative_eq!(*component, 0.0, epsilon = 1e-4);
        }
        // The target sits straight ahead, down -Z.
        let target = transform(&view, [0.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(target[2], -(3.0_f32 * 27.0 * 27.0).sqrt(), epsilon = 1e-3);
    }

    #[test]
    fn near_and_far_planes_map_to_depth_range() {
        let camera = Camera {
            eye: [0.0, 0.0, 5.0],
            ..Camera::default()
        };
        let m = camera.projection_matrix(100, 100);
        let near = transform(&m, [0.0, 0.0, -camera.z_near, 1.0]);
        let far = transform(&m, [0.0, 0.0, -camera.z_far, 1.0]);
        assert_relative_eq!(near[2] / near[3], 0.0, epsilon = 1e-5);
        assert_relative_eq!(far[2] / far[3], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_view_falls_back_to_identity() {
        let camera = Camera {
            eye: [0.0, 5.0, 0.0],
            target: [0.0, 0.0, 0.0],
            ..Camera::default()
        };
        assert_eq!(camera.view_matrix(), None);
        assert_eq!(camera.view_projection(4, 4), camera.projection_matrix(4, 4));
    }
}
