// std
use std::f32::consts::PI;
// fluo
use crate::core::geometry::{Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::light::{LightEmission, LightIncidence, LightSample, VisibilityTester};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::sampling::{uniform_sample_sphere, uniform_sphere_pdf};
use crate::core::spectrum::SampledSpectrum;
use crate::core::transform::Transform;

// see point.h

#[derive(Debug, Copy, Clone)]
pub struct PointLight {
    // private data (see point.h)
    pub p_light: Point3f,
    pub i: Spectrum,
}

impl PointLight {
    pub fn new(light_to_world: &Transform, i: &Spectrum) -> Self {
        PointLight {
            p_light: light_to_world.transform_point(&Point3f::default()),
            i: *i,
        }
    }
    pub fn sample_l(&self, p: &Point3f, _ls: &LightSample) -> LightIncidence {
        let d: Vector3f = self.p_light - *p;
        let dist2: Float = d.length_squared();
        if dist2 == 0.0 as Float {
            return LightIncidence {
                l: SampledSpectrum::new(0.0),
                wi: Vector3f::default(),
                pdf: 0.0,
                vis: VisibilityTester::new(*p, self.p_light),
            };
        }
        LightIncidence {
            l: self.i / dist2,
            wi: d.normalize(),
            pdf: 1.0 as Float,
            vis: VisibilityTester::new(*p, self.p_light),
        }
    }
    pub fn sample_le(&self, u1: &Point2f, _u2: &Point2f) -> LightEmission {
        let w: Vector3f = uniform_sample_sphere(u1);
        LightEmission {
            l: self.i,
            ray: Ray::new(self.p_light, w),
            n_light: Normal3f::from(w),
            pdf_pos: 1.0 as Float,
            pdf_dir: uniform_sphere_pdf(),
        }
    }
    pub fn power(&self) -> Spectrum {
        self.i * (4.0 as Float * PI)
    }
}

pub fn create_point_light(light_to_world: &Transform, params: &ParamSet) -> PointLight {
    let i: Spectrum = params.find_one_spectrum("I", SampledSpectrum::new(1.0));
    let from: Point3f = params.find_one_point3f("from", Point3f::default());
    let tr: Transform = Transform::translate(&Vector3f::from(from));
    let l2w: Transform = *light_to_world * tr;
    PointLight::new(&l2w, &i)
}
