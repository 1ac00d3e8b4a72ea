//! A transformation maps points and vectors from one coordinate frame
//! into another. Scene statements build them up on a transform stack
//! (see **core::api**); regions keep one to move world space points
//! into the local frame of their bounding box.
//!
//! ```rust
//! use rs_fluo::core::geometry::{Point3f, Vector3f};
//! use rs_fluo::core::transform::Transform;
//!
//!     let t = Transform::translate(&Vector3f::new(1.0, 2.0, 3.0));
//!     let p = t.transform_point(&Point3f::new(0.0, 0.0, 0.0));
//!     assert_eq!(p, Point3f::new(1.0, 2.0, 3.0));
//!     let back = Transform::inverse(&t).transform_point(&p);
//!     assert_eq!(back, Point3f::new(0.0, 0.0, 0.0));
//! ```

// std
use std::ops::Mul;
// others
use log::warn;
// fluo
use crate::core::geometry::{bnd3_union_pnt3f, vec3_cross_vec3};
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::pbrt::radians;
use crate::core::pbrt::Float;

// see transform.h

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Matrix4x4 {
    /// Sixteen values in row-major order.
    pub fn from_row_major(v: &[Float; 16]) -> Self {
        let mut m: Matrix4x4 = Matrix4x4::default();
        for (i, row) in m.m.iter_mut().enumerate() {
            row.copy_from_slice(&v[i * 4..i * 4 + 4]);
        }
        m
    }
    pub fn transpose(m: &Matrix4x4) -> Matrix4x4 {
        let mut r: Matrix4x4 = Matrix4x4::default();
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = m.m[j][i];
            }
        }
        r
    }
    /// Gauss-Jordan elimination with full pivoting, `None` for a
    /// singular matrix.
    pub fn inverse(m: &Matrix4x4) -> Option<Matrix4x4> {
        let mut indxc: [usize; 4] = [0; 4];
        let mut indxr: [usize; 4] = [0; 4];
        let mut ipiv: [usize; 4] = [0; 4];
        let mut minv: Matrix4x4 = *m;
        for i in 0..4 {
            let mut irow: usize = 0;
            let mut icol: usize = 0;
            let mut big: Float = 0.0;
            // choose pivot
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for k in 0..4 {
                        if ipiv[k] == 0 {
                            if minv.m[j][k].abs() >= big {
                                big = minv.m[j][k].abs();
                                irow = j;
                                icol = k;
                            }
                        } else if ipiv[k] > 1 {
                            return None;
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            // swap rows _irow_ and _icol_ for pivot
            if irow != icol {
                minv.m.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv.m[icol][icol] == 0.0 {
                return None;
            }
            // set $m[icol][icol]$ to one by scaling row _icol_ appropriately
            let pivinv: Float = 1.0 / minv.m[icol][icol];
            minv.m[icol][icol] = 1.0;
            for j in 0..4 {
                minv.m[icol][j] *= pivinv;
            }
            // subtract this row from others to zero out their columns
            for j in 0..4 {
                if j != icol {
                    let save: Float = minv.m[j][icol];
                    minv.m[j][icol] = 0.0;
                    for k in 0..4 {
                        minv.m[j][k] -= minv.m[icol][k] * save;
                    }
                }
            }
        }
        // swap columns to reflect permutation
        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for k in 0..4 {
                    minv.m[k].swap(indxr[j], indxc[j]);
                }
            }
        }
        Some(minv)
    }
}

/// The product of two matrices.
pub fn mtx_mul(m1: &Matrix4x4, m2: &Matrix4x4) -> Matrix4x4 {
    let mut r: Matrix4x4 = Matrix4x4::default();
    for i in 0..4 {
        for j in 0..4 {
            r.m[i][j] = (0..4).map(|k| m1.m[i][k] * m2.m[k][j]).sum();
        }
    }
    r
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Transform {
    pub m: Matrix4x4,
    pub m_inv: Matrix4x4,
}

impl Transform {
    /// Wrap a matrix, `None` if it can't be inverted.
    pub fn from_matrix(m: Matrix4x4) -> Option<Transform> {
        Matrix4x4::inverse(&m).map(|m_inv| Transform { m, m_inv })
    }
    pub fn inverse(t: &Transform) -> Transform {
        Transform {
            m: t.m_inv,
            m_inv: t.m,
        }
    }
    pub fn translate(delta: &Vector3f) -> Transform {
        let mut m: Matrix4x4 = Matrix4x4::default();
        let mut m_inv: Matrix4x4 = Matrix4x4::default();
        m.m[0][3] = delta.x;
        m.m[1][3] = delta.y;
        m.m[2][3] = delta.z;
        m_inv.m[0][3] = -delta.x;
        m_inv.m[1][3] = -delta.y;
        m_inv.m[2][3] = -delta.z;
        Transform { m, m_inv }
    }
    pub fn scale(x: Float, y: Float, z: Float) -> Transform {
        let mut m: Matrix4x4 = Matrix4x4::default();
        let mut m_inv: Matrix4x4 = Matrix4x4::default();
        m.m[0][0] = x;
        m.m[1][1] = y;
        m.m[2][2] = z;
        m_inv.m[0][0] = 1.0 / x;
        m_inv.m[1][1] = 1.0 / y;
        m_inv.m[2][2] = 1.0 / z;
        Transform { m, m_inv }
    }
    /// Rotation by `theta` degrees around an arbitrary axis.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Transform {
        let a: Vector3f = axis.normalize();
        let sin_theta: Float = radians(theta).sin();
        let cos_theta: Float = radians(theta).cos();
        let mut m: Matrix4x4 = Matrix4x4::default();
        // compute rotation of first basis vector
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        // compute rotations of second basis vectors
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        // compute rotations of third basis vectors
        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;
        Transform {
            m,
            m_inv: Matrix4x4::transpose(&m),
        }
    }
    pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Transform {
        let mut camera_to_world: Matrix4x4 = Matrix4x4::default();
        // initialize fourth column of viewing matrix
        camera_to_world.m[0][3] = pos.x;
        camera_to_world.m[1][3] = pos.y;
        camera_to_world.m[2][3] = pos.z;
        // initialize first three columns of viewing matrix
        let dir: Vector3f = (*look - *pos).normalize();
        let cross: Vector3f = vec3_cross_vec3(&up.normalize(), &dir);
        if cross.length() == 0.0 {
            warn!(
                "\"up\" vector ({}, {}, {}) and viewing direction ({}, {}, {}) passed to \
                 LookAt are pointing in the same direction. Using the identity \
                 transformation.",
                up.x, up.y, up.z, dir.x, dir.y, dir.z
            );
            return Transform::default();
        }
        let left: Vector3f = cross.normalize();
        let new_up: Vector3f = vec3_cross_vec3(&dir, &left);
        for (column, v) in [left, new_up, dir].iter().enumerate() {
            camera_to_world.m[0][column] = v.x;
            camera_to_world.m[1][column] = v.y;
            camera_to_world.m[2][column] = v.z;
        }
        // rigid motion, the inverse always exists
        let world_to_camera: Matrix4x4 =
            Matrix4x4::inverse(&camera_to_world).unwrap_or_default();
        Transform {
            m: world_to_camera,
            m_inv: camera_to_world,
        }
    }
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m.m;
        let xp: Float = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let yp: Float = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let zp: Float = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let wp: Float = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];
        if wp == 1.0 as Float || wp == 0.0 as Float {
            Point3f::new(xp, yp, zp)
        } else {
            let inv: Float = 1.0 as Float / wp;
            Point3f::new(inv * xp, inv * yp, inv * zp)
        }
    }
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m.m;
        Vector3f {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        }
    }
    /// Normals transform with the inverse transpose.
    pub fn transform_normal(&self, n: &Normal3f) -> Normal3f {
        let mi = &self.m_inv.m;
        Normal3f {
            x: mi[0][0] * n.x + mi[1][0] * n.y + mi[2][0] * n.z,
            y: mi[0][1] * n.x + mi[1][1] * n.y + mi[2][1] * n.z,
            z: mi[0][2] * n.x + mi[1][2] * n.y + mi[2][2] * n.z,
        }
    }
    pub fn transform_ray(&self, r: &Ray) -> Ray {
        Ray {
            o: self.transform_point(&r.o),
            d: self.transform_vector(&r.d),
            ..*r
        }
    }
    pub fn transform_bounds(&self, b: &Bounds3f) -> Bounds3f {
        let p: Point3f = self.transform_point(&b.p_min);
        let mut ret: Bounds3f = Bounds3f { p_min: p, p_max: p };
        for corner in 1..8_u8 {
            let c: Point3f = Point3f {
                x: b[corner & 1].x,
                y: b[(corner >> 1) & 1].y,
                z: b[(corner >> 2) & 1].z,
            };
            ret = bnd3_union_pnt3f(&ret, &self.transform_point(&c));
        }
        ret
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            m: mtx_mul(&self.m, &rhs.m),
            m_inv: mtx_mul(&rhs.m_inv, &self.m_inv),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: &Point3f, b: &Point3f) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4 && (a.z - b.z).abs() < 1e-4
    }

    #[test]
    fn inverse_of_product() {
        let t = Transform::translate(&Vector3f::new(1.0, -2.0, 0.5))
            * Transform::rotate(30.0, &Vector3f::new(0.0, 1.0, 1.0))
            * Transform::scale(2.0, 3.0, 4.0);
        let m_inv = Matrix4x4::inverse(&t.m).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert!((m_inv.m[i][j] - t.m_inv.m[i][j]).abs() < 1e-4);
            }
        }
        let p = Point3f::new(0.3, 0.7, -1.1);
        let q = Transform::inverse(&t).transform_point(&t.transform_point(&p));
        assert!(close(&p, &q));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let mut m = Matrix4x4::default();
        m.m[2][2] = 0.0;
        assert!(Matrix4x4::inverse(&m).is_none());
        assert!(Transform::from_matrix(m).is_none());
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Point3f::new(0.0, 0.0, -10.0);
        let t = Transform::look_at(&eye, &Point3f::default(), &Vector3f::new(0.0, 1.0, 0.0));
        assert!(close(&t.transform_point(&eye), &Point3f::default()));
        let ahead = t.transform_point(&Point3f::new(0.0, 0.0, 0.0));
        assert!((ahead.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn bounds_of_rotated_box() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let t = Transform::rotate(45.0, &Vector3f::new(0.0, 0.0, 1.0));
        let r = t.transform_bounds(&b);
        assert!((r.p_max.x - std::f32::consts::SQRT_2).abs() < 1e-4);
        assert!((r.p_max.z - 1.0).abs() < 1e-5);
    }
}
