use core::ops::Mul;

use super::Vec3;

/// 4x4 matrix stored as four columns.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Perspective projection with depth mapped to `[0, 1]`.
    ///
    /// `fovy_deg` is the full vertical field of view in degrees.
    pub fn perspective(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fovy_deg.to_radians() * 0.5).tan();
        let range = near - far;
        Mat4 {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, far / range, -1.0],
                [0.0, 0.0, near * far / range, 0.0],
            ],
        }
    }

    /// View matrix for a camera at `eye` looking at `center`.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let f = (center - eye).normalized();
        let s = f.cross(up).normalized();
        let u = s.cross(f);
        Mat4 {
            cols: [
                [s.x, u.x, -f.x, 0.0],
                [s.y, u.y, -f.y, 0.0],
                [s.z, u.z, -f.z, 0.0],
                [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
            ],
        }
    }

    /// Counter-clockwise rotation of `angle_deg` degrees about `axis`.
    pub fn rotation(axis: Vec3, angle_deg: f32) -> Mat4 {
        let a = axis.normalized();
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let t = 1.0 - cos;
        Mat4 {
            cols: [
                [t * a.x * a.x + cos, t * a.x * a.y + sin * a.z, t * a.x * a.z - sin * a.y, 0.0],
                [t * a.x * a.y - sin * a.z, t * a.y * a.y + cos, t * a.y * a.z + sin * a.x, 0.0],
                [t * a.x * a.z + sin * a.y, t * a.y * a.z - sin * a.x, t * a.z * a.z + cos, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn translation(v: Vec3) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.cols[3] = [v.x, v.y, v.z, 1.0];
        m
    }

    /// `self * [x, y, z, w]`.
    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, o) in out.iter_mut().enumerate() {
                *o += col[r] * v[c];
            }
        }
        out
    }

    /// Transforms a point and divides by `w`.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let [x, y, z, w] = self.transform([p.x, p.y, p.z, 1.0]);
        Vec3::new(x / w, y / w, z / w)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            *col = self.transform(rhs.cols[c]);
        }
        Mat4 { cols }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_is_neutral() {
        let t = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::IDENTITY * t, t);
        assert_eq!(t * Mat4::IDENTITY, t);
    }

    #[test]
    fn translation_moves_points() {
        let t = Mat4::translation(Vec3::new(-0.5, -0.5, -0.5));
        assert!(approx(t.transform_point(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn rotation_about_z_turns_x_into_y() {
        let r = Mat4::rotation(Vec3::new(0.0, 0.0, 1.0), 90.0);
        assert!(approx(r.transform_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn rotation_keeps_its_axis() {
        let axis = Vec3::new(0.0, 1.0, 1.0);
        let r = Mat4::rotation(axis, 37.0);
        assert!(approx(r.transform_point(axis), axis));
    }

    #[test]
    fn look_at_puts_eye_at_origin() {
        let v = Mat4::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));
        assert!(approx(v.transform_point(Vec3::new(0.0, 0.0, 3.0)), Vec3::zero()));
        // The target sits straight ahead, down -Z.
        assert!(approx(v.transform_point(Vec3::zero()), Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let p = Mat4::perspective(60.0, 1.0, 0.5, 100.0);
        let near = p.transform_point(Vec3::new(0.0, 0.0, -0.5));
        let far = p.transform_point(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn composition_applies_right_to_left() {
        let t = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        let r = Mat4::rotation(Vec3::new(0.0, 0.0, 1.0), 90.0);
        // Translate first, then rotate.
        let p = (r * t).transform_point(Vec3::zero());
        assert!(approx(p, Vec3::new(0.0, 1.0, 0.0)));
    }
}
