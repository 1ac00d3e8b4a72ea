//! Draw random samples from a chosen probability distribution.

// std
use std::f32::consts::PI;
// fluo
use crate::core::geometry::{Point2f, Vector2f, Vector3f};
use crate::core::pbrt::Float;
use crate::core::pbrt::{INV_4_PI, PI_OVER_2, PI_OVER_4};
use crate::core::rng::Rng;

// see sampling.h

/// Randomly permute an array of *count* sample values, each of which
/// has *n_dimensions* dimensions.
pub fn shuffle<T>(samp: &mut [T], count: usize, n_dimensions: usize, rng: &mut Rng) {
    for i in 0..count {
        let other: usize = i + rng.uniform_uint32_bounded((count - i) as u32) as usize;
        for j in 0..n_dimensions {
            samp.swap(n_dimensions * i + j, n_dimensions * other + j);
        }
    }
}

// see sampling.cpp

/// Uniformly sample rays in a full sphere. Choose a direction.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z: Float = 1.0 as Float - 2.0 as Float * u[0];
    let r: Float = (0.0 as Float).max(1.0 as Float - z * z).sqrt();
    let phi: Float = 2.0 as Float * PI * u[1];
    Vector3f {
        x: r * phi.cos(),
        y: r * phi.sin(),
        z,
    }
}

/// Probability density function (PDF) of a sphere.
pub fn uniform_sphere_pdf() -> Float {
    INV_4_PI
}

/// Uniformly distribute samples over a unit disk.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // map uniform random numbers to $[-1,1]^2$
    let u_offset: Point2f = *u * 2.0 as Float - Vector2f { x: 1.0, y: 1.0 };
    // handle degeneracy at the origin
    if u_offset.x == 0.0 as Float && u_offset.y == 0.0 as Float {
        return Point2f::default();
    }
    // apply concentric mapping to point
    let (r, theta): (Float, Float) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, PI_OVER_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, PI_OVER_2 - PI_OVER_4 * (u_offset.x / u_offset.y))
    };
    Point2f {
        x: theta.cos(),
        y: theta.sin(),
    } * r
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sphere_samples_are_unit_vectors() {
        let mut rng = Rng::new();
        let mut mean = Vector3f::default();
        for _ in 0..4000 {
            let u = Point2f {
                x: rng.uniform_float(),
                y: rng.uniform_float(),
            };
            let w = uniform_sample_sphere(&u);
            assert!((w.length() - 1.0).abs() < 1e-4);
            mean += w;
        }
        assert!((mean / 4000.0).length() < 0.05);
    }

    #[test]
    fn disk_samples_stay_inside() {
        let mut rng = Rng::new();
        for _ in 0..1000 {
            let u = Point2f {
                x: rng.uniform_float(),
                y: rng.uniform_float(),
            };
            let d = concentric_sample_disk(&u);
            assert!(d.x * d.x + d.y * d.y <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn shuffle_keeps_groups_together() {
        let mut rng = Rng::new();
        let mut v: Vec<u32> = vec![0, 0, 1, 1, 2, 2, 3, 3];
        shuffle(&mut v, 4, 2, &mut rng);
        for pair in v.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
        let mut sorted = v.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }
}
