//! Henyey-Greenstein phase function and the transient state carried
//! by a photon during a random walk.

// std
use std::f32::consts::PI;
// fluo
use crate::core::geometry::{spherical_direction_vec3, vec3_coordinate_system, vec3_dot_vec3f};
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::pbrt::{Float, INV_4_PI};

// see volume.h

/// Henyey-Greenstein phase function for the angle between the
/// propagation directions `w` and `wp` before and after scattering.
/// Positive `g` favours `w == wp`.
pub fn phase_hg(w: &Vector3f, wp: &Vector3f, g: Float) -> Float {
    let costheta: Float = vec3_dot_vec3f(w, wp);
    hg_pdf(costheta, g)
}

fn hg_pdf(costheta: Float, g: Float) -> Float {
    let denom: Float = 1.0 as Float + g * g - 2.0 as Float * g * costheta;
    INV_4_PI * (1.0 as Float - g * g) / (denom * denom.sqrt())
}

/// Sample a direction around `w` distributed like the phase
/// function, returns the direction and its density.
pub fn sample_hg(w: &Vector3f, g: Float, u1: Float, u2: Float) -> (Vector3f, Float) {
    let costheta: Float = if g.abs() < 1e-3 {
        1.0 as Float - 2.0 as Float * u1
    } else {
        let sqr_term: Float = (1.0 as Float - g * g) / (1.0 as Float - g + 2.0 as Float * g * u1);
        -(1.0 as Float + g * g - sqr_term * sqr_term) / (2.0 as Float * g)
    };
    let costheta: Float = costheta.max(-1.0).min(1.0);
    let sintheta: Float = (0.0 as Float).max(1.0 as Float - costheta * costheta).sqrt();
    let phi: Float = 2.0 as Float * PI * u2;
    let (v1, v2) = vec3_coordinate_system(w);
    let wi: Vector3f = spherical_direction_vec3(sintheta, costheta, phi, &v1, &v2, w);
    (wi, hg_pdf(costheta, g))
}

/// Which set of optical coefficients a photon currently sees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PhotonRole {
    Excitation,
    Emission,
}

/// Free-flight distance drawn from the medium.
#[derive(Debug, Copy, Clone)]
pub struct DistanceSample {
    /// absolute ray parameter of the new position
    pub t: Float,
    pub p: Point3f,
    pub pdf: Float,
    /// false if the new position left the region
    pub inside: bool,
}

/// Position, direction, role and weight of one photon during a walk.
#[derive(Debug, Copy, Clone)]
pub struct PhotonState {
    pub index: u64,
    pub p: Point3f,
    pub w: Vector3f,
    pub role: PhotonRole,
    pub weight: Float,
    pub scatterings: u32,
}

impl PhotonState {
    pub fn new(index: u64, p: Point3f, w: Vector3f, role: PhotonRole) -> Self {
        PhotonState {
            index,
            p,
            w,
            role,
            weight: 1.0,
            scatterings: 0,
        }
    }
    /// Move to `p` and continue in direction `w`.
    pub fn scatter(&mut self, p: Point3f, w: Vector3f) {
        self.p = p;
        self.w = w;
        self.scatterings += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::rng::Rng;

    #[test]
    fn isotropic_phase_is_constant() {
        let a = Vector3f::new(0.0, 0.0, 1.0);
        let b = Vector3f::new(1.0, 0.0, 0.0);
        assert!((phase_hg(&a, &b, 0.0) - INV_4_PI).abs() < 1e-7);
        assert!((phase_hg(&a, &a, 0.0) - INV_4_PI).abs() < 1e-7);
    }

    #[test]
    fn forward_scattering_prefers_small_angles() {
        let w = Vector3f::new(0.0, 0.0, 1.0);
        let g: Float = 0.8;
        assert!(phase_hg(&w, &w, g) > phase_hg(&w, &-w, g));
        let mut rng = Rng::new();
        let mut mean_cos: Float = 0.0;
        let n = 20_000;
        for _ in 0..n {
            let (wi, pdf) = sample_hg(&w, g, rng.uniform_float(), rng.uniform_float());
            assert!((wi.length() - 1.0).abs() < 1e-3);
            assert!((pdf - phase_hg(&w, &wi, g)).abs() < 1e-2 * pdf.max(1.0));
            mean_cos += vec3_dot_vec3f(&w, &wi);
        }
        // the mean cosine of HG equals g
        assert!((mean_cos / n as Float - g).abs() < 0.02);
    }

    #[test]
    fn photon_state_counts_scatterings() {
        let mut photon = PhotonState::new(
            3,
            Point3f::default(),
            Vector3f::new(0.0, 1.0, 0.0),
            PhotonRole::Excitation,
        );
        photon.scatter(Point3f::new(0.0, 1.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(photon.scatterings, 1);
        assert_eq!(photon.weight, 1.0);
    }
}
