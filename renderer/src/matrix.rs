//! Row-major 4x4 transform matrices in homogeneous coordinates
//!
//! `m[row][col]`, column vectors: `v' = M * v`. `a.multiply(b)` applies `b`
//! first and `a` second.

use core::fmt;
use core::ops::Mul;
use core::str::FromStr;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::vector::{Vector3, Vector4};

/// Pivots smaller than this make a matrix count as singular
const SINGULAR_EPSILON: f64 = 1e-10;

/// World axis used by the fixed-axis rotation primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl FromStr for Axis {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(RenderError::InvalidAxis(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    pub const ZERO: Self = Self { m: [[0.0; 4]; 4] };

    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][3] = x;
        r.m[1][3] = y;
        r.m[2][3] = z;
        r
    }

    pub fn from_scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut r = Self::IDENTITY;
        r.m[0][0] = sx;
        r.m[1][1] = sy;
        r.m[2][2] = sz;
        r
    }

    /// Rotation about +X by `angle` radians
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = (libm::sinf(angle), libm::cosf(angle));
        let mut r = Self::IDENTITY;
        r.m[1][1] = c;
        r.m[1][2] = -s;
        r.m[2][1] = s;
        r.m[2][2] = c;
        r
    }

    /// Rotation about +Y by `angle` radians
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = (libm::sinf(angle), libm::cosf(angle));
        let mut r = Self::IDENTITY;
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    /// Rotation about +Z by `angle` radians
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = (libm::sinf(angle), libm::cosf(angle));
        let mut r = Self::IDENTITY;
        r.m[0][0] = c;
        r.m[0][1] = -s;
        r.m[1][0] = s;
        r.m[1][1] = c;
        r
    }

    /// Euler rotation composed as `Rz * Ry * Rx` (X applied first)
    pub fn from_rotation_xyz(rx: f32, ry: f32, rz: f32) -> Self {
        Self::from_rotation_z(rz)
            .multiply(&Self::from_rotation_y(ry))
            .multiply(&Self::from_rotation_x(rx))
    }

    pub fn from_axis_rotation(axis: Axis, angle: f32) -> Self {
        match axis {
            Axis::X => Self::from_rotation_x(angle),
            Axis::Y => Self::from_rotation_y(angle),
            Axis::Z => Self::from_rotation_z(angle),
        }
    }

    /// `self * other`
    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        let mut r = Self::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        r
    }

    /// Apply to the homogeneous point `(x, y, z, 1)`. No perspective divide.
    pub fn transform_point(&self, p: Vector3) -> Vector4 {
        let m = &self.m;
        Vector4::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
            m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3],
        )
    }

    /// Apply to a full homogeneous vector
    pub fn transform_vector4(&self, v: Vector4) -> Vector4 {
        let m = &self.m;
        Vector4::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3] * v.w,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3] * v.w,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3] * v.w,
            m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3] * v.w,
        )
    }

    pub fn transpose(&self) -> Matrix4 {
        let mut r = Self::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                r.m[j][i] = self.m[i][j];
            }
        }
        r
    }

    pub fn row(&self, i: usize) -> [f32; 4] {
        self.m[i]
    }

    /// General inverse (Gauss-Jordan with partial pivoting).
    ///
    /// Returns `None` for singular or near-singular matrices instead of
    /// producing NaNs; callers must check before use.
    pub fn inverse(&self) -> Option<Matrix4> {
        let mut a = [[0.0f64; 8]; 4];
        for (i, row) in a.iter_mut().enumerate() {
            for j in 0..4 {
                row[j] = self.m[i][j] as f64;
            }
            row[4 + i] = 1.0;
        }

        for col in 0..4 {
            let mut pivot = col;
            for r in (col + 1)..4 {
                if a[r][col].abs() > a[pivot][col].abs() {
                    pivot = r;
                }
            }
            if !(a[pivot][col].abs() >= SINGULAR_EPSILON) {
                return None;
            }
            a.swap(col, pivot);

            let p = a[col][col];
            for v in a[col].iter_mut() {
                *v /= p;
            }

            for r in 0..4 {
                if r == col {
                    continue;
                }
                let factor = a[r][col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..8 {
                    a[r][c] -= factor * a[col][c];
                }
            }
        }

        let mut inv = Self::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                let v = a[i][4 + j] as f32;
                if !v.is_finite() {
                    return None;
                }
                inv.m[i][j] = v;
            }
        }
        Some(inv)
    }

    /// Element-wise comparison within `eps`
    pub fn approx_eq(&self, other: &Matrix4, eps: f32) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Self::Output {
        self.multiply(&rhs)
    }
}

impl From<Matrix4> for Mat4 {
    fn from(m: Matrix4) -> Self {
        // glam stores columns; our rows become its columns, then transpose back
        Mat4::from_cols_array_2d(&m.m).transpose()
    }
}

impl From<Mat4> for Matrix4 {
    fn from(m: Mat4) -> Self {
        Self::from_rows(m.transpose().to_cols_array_2d())
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix4[")?;
        for row in &self.m {
            writeln!(
                f,
                "  [{:7.2}, {:7.2}, {:7.2}, {:7.2}]",
                row[0], row[1], row[2], row[3]
            )?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI, TAU};
    use glam::Vec3;

    fn approx_v(a: Vector3, b: Vector3, eps: f32) -> bool {
        (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps && (a.z - b.z).abs() < eps
    }

    fn sample_matrices() -> Vec<Matrix4> {
        vec![
            Matrix4::from_translation(10.0, -3.0, 0.5),
            Matrix4::from_scale(2.0, 3.0, 0.25),
            Matrix4::from_rotation_xyz(0.3, -1.1, 2.0),
            Matrix4::from_rotation_y(0.7).multiply(&Matrix4::from_translation(1.0, 2.0, 3.0)),
            Matrix4::from_rows([
                [1.0, 2.0, 3.0, 4.0],
                [5.0, 6.0, 7.0, 8.0],
                [9.0, 10.0, 11.0, 12.0],
                [13.0, 14.0, 15.0, 16.0],
            ]),
        ]
    }

    #[test]
    fn test_identity_is_neutral() {
        for m in sample_matrices() {
            assert_eq!(Matrix4::identity().multiply(&m), m);
            assert_eq!(m.multiply(&Matrix4::identity()), m);
        }
    }

    #[test]
    fn test_constructors_do_not_share_state() {
        let mut a = Matrix4::identity();
        a.m[0][0] = 5.0;
        assert_eq!(Matrix4::identity().m[0][0], 1.0);
    }

    #[test]
    fn test_translate_point() {
        let t = Matrix4::from_translation(10.0, 20.0, 30.0);
        let p = t.transform_point(Vector3::new(5.0, 5.0, 5.0));
        assert_eq!(p, Vector4::new(15.0, 25.0, 35.0, 1.0));
    }

    #[test]
    fn test_composition_order() {
        // T * S: scale first, then translate
        let c = Matrix4::from_translation(10.0, 20.0, 30.0).multiply(&Matrix4::from_scale(2.0, 2.0, 2.0));
        let p = c.transform_point(Vector3::ONE);
        assert_eq!(p.xyz(), Vector3::new(12.0, 22.0, 32.0));

        // S * T: translate first, then scale
        let c = Matrix4::from_scale(2.0, 2.0, 2.0).multiply(&Matrix4::from_translation(10.0, 20.0, 30.0));
        let p = c.transform_point(Vector3::ONE);
        assert_eq!(p.xyz(), Vector3::new(22.0, 42.0, 62.0));
    }

    #[test]
    fn test_multiply_is_associative_not_commutative() {
        let a = Matrix4::from_rotation_x(0.4);
        let b = Matrix4::from_translation(1.0, 2.0, 3.0);
        let c = Matrix4::from_scale(2.0, 1.0, 0.5);

        let left = a.multiply(&b).multiply(&c);
        let right = a.multiply(&b.multiply(&c));
        assert!(left.approx_eq(&right, 1e-5));

        assert!(!a.multiply(&b).approx_eq(&b.multiply(&a), 1e-3));
    }

    #[test]
    fn test_rotation_directions() {
        let p = Matrix4::from_rotation_z(FRAC_PI_2).transform_point(Vector3::X);
        assert!(approx_v(p.xyz(), Vector3::Y, 1e-6));

        let p = Matrix4::from_rotation_x(FRAC_PI_2).transform_point(Vector3::Y);
        assert!(approx_v(p.xyz(), Vector3::Z, 1e-6));

        let p = Matrix4::from_rotation_y(FRAC_PI_2).transform_point(Vector3::Z);
        assert!(approx_v(p.xyz(), Vector3::X, 1e-6));
    }

    #[test]
    fn test_rotation_xyz_applies_x_first() {
        let m = Matrix4::from_rotation_xyz(FRAC_PI_2, 0.0, FRAC_PI_2);
        // X: (0,1,0) -> (0,0,1); Z leaves +Z alone
        let p = m.transform_point(Vector3::Y);
        assert!(approx_v(p.xyz(), Vector3::Z, 1e-6));
    }

    #[test]
    fn test_translation_inverse_round_trip() {
        let points = [
            Vector3::ZERO,
            Vector3::new(1.0, -2.0, 3.5),
            Vector3::new(-100.0, 42.0, 0.001),
        ];
        let offsets = [
            (10.0, 20.0, 30.0),
            (-5.5, 0.0, 2.25),
            (0.0, 0.0, 0.0),
            (1000.0, -1000.0, 7.0),
        ];
        for (x, y, z) in offsets {
            let t = Matrix4::from_translation(x, y, z);
            let inv = t.inverse().expect("translations are invertible");
            for p in points {
                let back = inv.transform_point(t.transform_point(p).xyz());
                assert!(approx_v(back.xyz(), p, 1e-3), "{:?} -> {:?}", p, back);
            }
        }
    }

    #[test]
    fn test_inverse_of_composite() {
        let c = Matrix4::from_translation(10.0, 20.0, 30.0).multiply(&Matrix4::from_scale(2.0, 2.0, 2.0));
        let inv = c.inverse().unwrap();
        let p = inv.transform_point(Vector3::new(12.0, 22.0, 32.0));
        assert!(approx_v(p.xyz(), Vector3::ONE, 1e-5));
        assert!(c.multiply(&inv).approx_eq(&Matrix4::identity(), 1e-5));
    }

    #[test]
    fn test_inverse_matches_glam() {
        for m in sample_matrices().into_iter().take(4) {
            let ours = m.inverse().unwrap();
            let theirs = Matrix4::from(Mat4::from(m).inverse());
            assert!(ours.approx_eq(&theirs, 1e-4), "{}\n{}", ours, theirs);
        }
    }

    #[test]
    fn test_singular_inverse_is_none() {
        assert!(Matrix4::from_scale(0.0, 0.0, 0.0).inverse().is_none());
        assert!(Matrix4::ZERO.inverse().is_none());
        // rank 2 rows
        let m = sample_matrices().pop().unwrap();
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_full_turn_returns_to_start() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let start = Matrix4::from_translation(1.0, 2.0, 3.0);
            let mut m = start;
            for _ in 0..8 {
                m = Matrix4::from_axis_rotation(axis, TAU / 8.0).multiply(&m);
            }
            assert!(m.approx_eq(&start, 1e-4), "axis {}: {}", axis, m);

            let once = Matrix4::from_axis_rotation(axis, 2.0 * PI).multiply(&start);
            assert!(once.approx_eq(&start, 1e-5));
        }
    }

    #[test]
    fn test_glam_round_trip() {
        let m = Matrix4::from_translation(1.0, 2.0, 3.0);
        let g: Mat4 = m.into();
        assert_eq!(g.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Matrix4::from(g), m);
    }

    #[test]
    fn test_axis_parse() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!(" Y ".parse::<Axis>().unwrap(), Axis::Y);
        assert_eq!("z".parse::<Axis>().unwrap(), Axis::Z);
        assert!(matches!("w".parse::<Axis>(), Err(RenderError::InvalidAxis(s)) if s == "w"));
    }

    #[test]
    fn test_transpose_and_vector4() {
        let m = Matrix4::from_translation(1.0, 2.0, 3.0);
        assert_eq!(m.transpose().row(3), [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(m.transpose().transpose(), m);

        // w = 0 is a direction and ignores translation
        let d = m.transform_vector4(Vector4::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(d, Vector4::new(1.0, 1.0, 1.0, 0.0));
        let p = m.transform_vector4(Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(p, m.transform_point(Vector3::ONE));
    }
}
