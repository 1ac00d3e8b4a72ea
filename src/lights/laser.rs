// std
use std::f32::consts::PI;
// others
use log::warn;
// fluo
use crate::core::geometry::{vec3_coordinate_system, vec3_dot_vec3f};
use crate::core::geometry::{Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::light::{LightEmission, LightIncidence, LightSample, VisibilityTester};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::sampling::concentric_sample_disk;
use crate::core::spectrum::{wavelength_index, SampledSpectrum, N_SPECTRAL_SAMPLES};
use crate::core::transform::Transform;

/// Collimated beam of a given radius leaving a fiber at `p_light`,
/// emitting at a single wavelength bin.
#[derive(Debug, Copy, Clone)]
pub struct LaserLight {
    pub p_light: Point3f,
    /// unit beam direction
    pub dir: Vector3f,
    pub radius: Float,
    pub l: Spectrum,
    pub wavelength_index: usize,
}

impl LaserLight {
    pub fn new(from: Point3f, dir: Vector3f, radius: Float, l: Spectrum, wavelength_index: usize) -> Self {
        LaserLight {
            p_light: from,
            dir: dir.normalize(),
            radius,
            l,
            wavelength_index,
        }
    }
    pub fn area(&self) -> Float {
        PI * self.radius * self.radius
    }
    /// Points inside the beam cylinder receive the beam radiance from
    /// the direction opposite to the beam.
    pub fn sample_l(&self, p: &Point3f, _ls: &LightSample) -> LightIncidence {
        let v: Vector3f = *p - self.p_light;
        let s: Float = vec3_dot_vec3f(&v, &self.dir);
        let perp: Vector3f = v - self.dir * s;
        let p_fiber: Point3f = *p - self.dir * s;
        if s < 0.0 as Float || perp.length_squared() > self.radius * self.radius {
            return LightIncidence {
                l: SampledSpectrum::new(0.0),
                wi: -self.dir,
                pdf: 0.0,
                vis: VisibilityTester::new(*p, p_fiber),
            };
        }
        LightIncidence {
            l: self.l,
            wi: -self.dir,
            pdf: 1.0 as Float,
            vis: VisibilityTester::new(*p, p_fiber),
        }
    }
    /// Uniform point on the fiber's exit disk, direction along the beam.
    pub fn sample_le(&self, u1: &Point2f, _u2: &Point2f) -> LightEmission {
        let pd: Point2f = concentric_sample_disk(u1);
        let (v1, v2) = vec3_coordinate_system(&self.dir);
        let o: Point3f = self.p_light + v1 * (pd.x * self.radius) + v2 * (pd.y * self.radius);
        let area: Float = self.area();
        LightEmission {
            l: self.l,
            ray: Ray::new(o, self.dir),
            n_light: Normal3f::from(self.dir),
            pdf_pos: if area > 0.0 as Float {
                1.0 as Float / area
            } else {
                1.0 as Float
            },
            pdf_dir: 1.0 as Float,
        }
    }
    pub fn power(&self) -> Spectrum {
        self.l * self.area()
    }
}

pub fn create_laser_light(light_to_world: &Transform, params: &ParamSet) -> LaserLight {
    let l: Spectrum = params.find_one_spectrum("L", SampledSpectrum::new(1.0));
    let from: Point3f = params.find_one_point3f("from", Point3f::new(0.0, 0.0, 0.0));
    let to: Point3f = params.find_one_point3f("to", Point3f::new(0.0, 0.0, 1.0));
    let radius: Float = params.find_one_float("radius", 0.1).max(0.0);
    let wavelength: Float = params.find_one_float("wavelength", 0.0);
    let index: i32 = if wavelength > 0.0 as Float {
        wavelength_index(wavelength) as i32
    } else {
        params.find_one_int("wavelengthindex", 0)
    };
    let index: usize = if index < 0 || index as usize >= N_SPECTRAL_SAMPLES {
        warn!(
            "Laser wavelength index {} out of range, using {}",
            index,
            N_SPECTRAL_SAMPLES - 1
        );
        (index.max(0) as usize).min(N_SPECTRAL_SAMPLES - 1)
    } else {
        index as usize
    };
    let p0: Point3f = light_to_world.transform_point(&from);
    let p1: Point3f = light_to_world.transform_point(&to);
    LaserLight::new(p0, p1 - p0, radius, l, index)
}

#[cfg(test)]
mod test {
    use super::*;

    fn laser() -> LaserLight {
        let mut ps = ParamSet::default();
        ps.add_point3f("from", Point3f::new(0.0, 0.0, -5.0));
        ps.add_point3f("to", Point3f::new(0.0, 0.0, 0.0));
        ps.add_float("radius", 0.5);
        ps.add_float("wavelength", 488.0);
        create_laser_light(&Transform::default(), &ps)
    }

    #[test]
    fn beam_cylinder() {
        let light = laser();
        assert_eq!(light.wavelength_index, wavelength_index(488.0));
        let inside = light.sample_l(&Point3f::new(0.2, 0.0, 1.0), &LightSample::default());
        assert_eq!(inside.pdf, 1.0);
        assert!(!inside.l.is_black());
        assert!((inside.wi.z + 1.0).abs() < 1e-6);
        assert!((inside.vis.p1.z + 5.0).abs() < 1e-5);
        let outside = light.sample_l(&Point3f::new(1.0, 0.0, 1.0), &LightSample::default());
        assert_eq!(outside.pdf, 0.0);
        let behind = light.sample_l(&Point3f::new(0.0, 0.0, -6.0), &LightSample::default());
        assert!(behind.l.is_black());
    }

    #[test]
    fn photons_leave_the_fiber() {
        let light = laser();
        for i in 0..10 {
            let u = Point2f {
                x: i as Float / 10.0,
                y: 0.3,
            };
            let le = light.sample_le(&u, &Point2f::default());
            assert!((le.ray.o.z + 5.0).abs() < 1e-5);
            assert!(le.ray.o.x * le.ray.o.x + le.ray.o.y * le.ray.o.y <= 0.25 + 1e-5);
            assert_eq!(le.ray.d, Vector3f::new(0.0, 0.0, 1.0));
        }
    }
}
