//! In order for the tissue to fluoresce, there must be a source of
//! excitation light. A **Light** answers two questions: how much
//! light arrives at a point inside the volume (**sample_l()**, used
//! by the ray marching integrators) and where photons leave the
//! source (**sample_le()**, used by the photon random walks).

// fluo
use crate::core::geometry::{Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::pbrt::{Float, Spectrum};
use crate::core::scene::Scene;
use crate::lights::laser::LaserLight;
use crate::lights::point::PointLight;

// see light.h

/// Sample values used to pick a point on (or a direction from) a
/// light source.
#[derive(Debug, Default, Copy, Clone)]
pub struct LightSample {
    pub u_component: Float,
    pub u_pos: Point2f,
}

impl LightSample {
    pub fn new(u_component: Float, u_pos0: Float, u_pos1: Float) -> Self {
        LightSample {
            u_component,
            u_pos: Point2f {
                x: u_pos0,
                y: u_pos1,
            },
        }
    }
}

/// Light arriving at a point, see **Light::sample_l()**.
#[derive(Debug, Copy, Clone)]
pub struct LightIncidence {
    pub l: Spectrum,
    /// direction towards the light
    pub wi: Vector3f,
    pub pdf: Float,
    pub vis: VisibilityTester,
}

/// Photon launched from a light, see **Light::sample_le()**.
#[derive(Debug, Copy, Clone)]
pub struct LightEmission {
    pub l: Spectrum,
    pub ray: Ray,
    pub n_light: Normal3f,
    pub pdf_pos: Float,
    pub pdf_dir: Float,
}

/// A closure - an object that encapsulates a small amount of data and
/// some computation that is yet to be done.
#[derive(Debug, Default, Copy, Clone)]
pub struct VisibilityTester {
    pub p0: Point3f,
    pub p1: Point3f,
}

impl VisibilityTester {
    pub fn new(p0: Point3f, p1: Point3f) -> Self {
        VisibilityTester { p0, p1 }
    }
    /// The segment between both points, slightly shortened at both
    /// ends.
    pub fn ray(&self) -> Ray {
        Ray::segment(self.p0, self.p1 - self.p0, 1e-3, 1.0 - 1e-3, 0.0, 0)
    }
    /// True if no bead blocks the segment.
    pub fn unoccluded(&self, scene: &Scene) -> bool {
        !scene.intersect_p(&self.ray())
    }
}

pub enum Light {
    Point(Box<PointLight>),
    Laser(Box<LaserLight>),
}

impl Light {
    /// Incident light at `p`, black with a zero density if the light
    /// does not reach `p`.
    pub fn sample_l(&self, p: &Point3f, ls: &LightSample) -> LightIncidence {
        match self {
            Light::Point(light) => light.sample_l(p, ls),
            Light::Laser(light) => light.sample_l(p, ls),
        }
    }
    pub fn sample_le(&self, u1: &Point2f, u2: &Point2f) -> LightEmission {
        match self {
            Light::Point(light) => light.sample_le(u1, u2),
            Light::Laser(light) => light.sample_le(u1, u2),
        }
    }
    pub fn power(&self) -> Spectrum {
        match self {
            Light::Point(light) => light.power(),
            Light::Laser(light) => light.power(),
        }
    }
    pub fn is_laser(&self) -> bool {
        match self {
            Light::Point(_) => false,
            Light::Laser(_) => true,
        }
    }
    /// Wavelength bin the laser emits at, `None` for other lights.
    pub fn laser_wavelength_index(&self) -> Option<usize> {
        match self {
            Light::Point(_) => None,
            Light::Laser(light) => Some(light.wavelength_index),
        }
    }
}
