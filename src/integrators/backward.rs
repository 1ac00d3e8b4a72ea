//! Backward scattering estimates the photon density seen along a
//! camera ray. Instead of sampling the light sources, a random walk
//! starts where the ray enters the volume and accumulates the photon
//! density at every scattering event.

// std
use std::str::FromStr;
// others
use log::warn;
use strum_macros::{Display, EnumString};
// fluo
use crate::core::geometry::{Bounds3f, Point3f, Ray, Vector3f};
use crate::core::integrator::{march_transmittance, russian_roulette};
use crate::core::medium::{DistanceSample, PhotonRole};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::scene::Scene;
use crate::integrators::single::march_range;

// see vsdbsg.h

#[derive(Debug, Copy, Clone, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BackwardMode {
    /// random walk through the volume
    Multiple,
    /// photon density emitted along the ray only
    Single,
}

pub struct BackwardIntegrator {
    pub step_size: Float,
    pub mode: BackwardMode,
    tau_sample_offset: usize,
    scatter_sample_offset: usize,
}

impl BackwardIntegrator {
    pub fn new(step_size: Float, mode: BackwardMode) -> Self {
        BackwardIntegrator {
            step_size,
            mode,
            tau_sample_offset: usize::MAX,
            scatter_sample_offset: usize::MAX,
        }
    }
    pub fn request_samples(&mut self, sample: &mut Sample) {
        self.tau_sample_offset = sample.add_1d(1);
        self.scatter_sample_offset = sample.add_1d(1);
    }
    pub fn transmittance(&self, scene: &Scene, ray: &Ray, sample: Option<&Sample>, rng: &mut Rng) -> Spectrum {
        march_transmittance(scene, ray, self.step_size, sample, self.tau_sample_offset, rng)
    }
    pub fn li(&self, scene: &Scene, ray: &Ray, sample: Option<&Sample>, rng: &mut Rng) -> (Spectrum, Spectrum) {
        match self.mode {
            BackwardMode::Multiple => self.li_multiple_scattering(scene, ray, rng),
            BackwardMode::Single => self.li_single_scattering(scene, ray, sample, rng),
        }
    }
    fn li_multiple_scattering(&self, scene: &Scene, ray: &Ray, rng: &mut Rng) -> (Spectrum, Spectrum) {
        let mut lv: Spectrum = Spectrum::new(0.0);
        let mut tr: Spectrum = Spectrum::new(1.0);
        let vr = match &scene.volume_region {
            Some(vr) => vr,
            None => return (lv, tr),
        };
        let t0: Float = match vr.intersect_p(ray) {
            Some((t0, _t1)) => t0,
            None => return (lv, tr),
        };
        let bound: Bounds3f = vr.world_bound();
        // step over the boundary, round-off would leave t0 just outside
        let ray_n: Ray = Ray::new(ray.o, ray.d.normalize());
        let t_entry: Float = t0 * ray.d.length() + bound.height() * 0.01 as Float;
        let mut p: Point3f = ray_n.position(t_entry);
        let wi: Vector3f = -ray_n.d;
        while bound.inside(&p) {
            let (wo, pdf_direction) =
                match vr.sample_direction(&p, &wi, rng.uniform_float(), rng.uniform_float(), PhotonRole::Excitation) {
                    Some(direction) => direction,
                    None => break,
                };
            let r: Ray = Ray::new(p, wo);
            let ds: DistanceSample = match vr.sample_distance(&r, rng.uniform_float(), PhotonRole::Excitation) {
                Some(ds) => ds,
                None => break,
            };
            let p_prev: Point3f = p;
            p = ds.p;
            let tau_ray: Ray = Ray::segment(p_prev, p - p_prev, 0.0, 1.0, r.time, r.depth);
            let step_tau: Spectrum = vr.tau(&tau_ray, 0.5 as Float * self.step_size, rng.uniform_float());
            tr *= (-step_tau).exp();
            if !russian_roulette(&mut tr, rng) {
                break;
            }
            let pdf: Float = ds.pdf * pdf_direction;
            if pdf > 0.0 as Float {
                lv += tr * (vr.photon_density(&p) / pdf);
            }
        }
        if lv.has_nans() {
            warn!("Not-a-number photon density from backward scattering, setting to black");
            lv = Spectrum::new(0.0);
        }
        (lv, tr)
    }
    fn li_single_scattering(
        &self,
        scene: &Scene,
        ray: &Ray,
        sample: Option<&Sample>,
        rng: &mut Rng,
    ) -> (Spectrum, Spectrum) {
        let mut lv: Spectrum = Spectrum::new(0.0);
        let mut tr: Spectrum = Spectrum::new(1.0);
        let vr = match &scene.volume_region {
            Some(vr) => vr,
            None => return (lv, tr),
        };
        let (t0, step, n_steps) = match march_range(scene, ray, self.step_size) {
            Some(range) => range,
            None => return (lv, tr),
        };
        let u: Float = sample
            .and_then(|s| s.get_1d(self.scatter_sample_offset))
            .unwrap_or_else(|| rng.uniform_float());
        let mut p: Point3f = ray.position(t0);
        let mut t: Float = t0 + u * step;
        for _ in 0..n_steps {
            let p_prev: Point3f = p;
            p = ray.position(t);
            let tau_ray: Ray = Ray::segment(p_prev, p - p_prev, 0.0, 1.0, ray.time, ray.depth);
            let step_tau: Spectrum = vr.tau(&tau_ray, 0.5 as Float * self.step_size, rng.uniform_float());
            tr *= (-step_tau).exp();
            if !russian_roulette(&mut tr, rng) {
                break;
            }
            // emission from the voxels, not from the light sources
            lv += tr * vr.photon_density(&p);
            t += step;
        }
        (lv * step, tr)
    }
}

pub fn create_backward_integrator(params: &ParamSet) -> BackwardIntegrator {
    let step_size: Float = params.find_one_float("stepsize", 1.0);
    let mode_name: String = params.find_one_string("mode", "multiple");
    let mode: BackwardMode = BackwardMode::from_str(&mode_name).unwrap_or_else(|_| {
        warn!("Backward scattering mode {:?} unknown, using \"multiple\"", mode_name);
        BackwardMode::Multiple
    });
    BackwardIntegrator::new(step_size, mode)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::spectrum::SampledSpectrum;
    use crate::core::transform::Transform;
    use crate::core::volume::{Coefficients, RegionProperties, VolumeRegion};
    use crate::media::homogeneous::HomogeneousRegion;

    fn cube_scene(sigma_a: Float, sigma_s: Float) -> Scene {
        let c = Coefficients::new(
            SampledSpectrum::new(sigma_a),
            SampledSpectrum::new(sigma_s),
            0.0,
        );
        let vr = VolumeRegion::Homogeneous(HomogeneousRegion::new(
            RegionProperties::new(
                &Transform::default(),
                Bounds3f::new(Point3f::new(-5.0, -5.0, -5.0), Point3f::new(5.0, 5.0, 5.0)),
                c,
                c,
                SampledSpectrum::new(0.0),
            ),
            1.0,
        ));
        Scene::new(Some(vr), Vec::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn modes_parse() {
        let mut ps = ParamSet::default();
        ps.add_string("mode", "single");
        assert_eq!(create_backward_integrator(&ps).mode, BackwardMode::Single);
        let mut ps = ParamSet::default();
        ps.add_string("mode", "sideways");
        assert_eq!(create_backward_integrator(&ps).mode, BackwardMode::Multiple);
    }

    #[test]
    fn random_walk_accumulates_density() {
        let scene = cube_scene(0.1, 0.4);
        let integrator = BackwardIntegrator::new(1.0, BackwardMode::Multiple);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -20.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut rng = Rng::new();
        let mut total: Float = 0.0;
        for _ in 0..100 {
            let (lv, tr) = integrator.li(&scene, &ray, None, &mut rng);
            assert!(!lv.has_nans());
            assert!(tr.c.iter().all(|v| *v >= 0.0));
            total += lv.y();
        }
        assert!(total > 0.0);
        // a ray missing the cube
        let miss = Ray::new(Point3f::new(0.0, 10.0, -20.0), Vector3f::new(0.0, 0.0, 1.0));
        let (lv, tr) = integrator.li(&scene, &miss, None, &mut rng);
        assert!(lv.is_black());
        assert_eq!(tr, Spectrum::new(1.0));
    }

    #[test]
    fn single_mode_integrates_density_along_ray() {
        let scene = cube_scene(0.0, 0.0);
        let integrator = BackwardIntegrator::new(0.5, BackwardMode::Single);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -20.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut rng = Rng::new();
        let (lv, tr) = integrator.li(&scene, &ray, None, &mut rng);
        // density one over ten units of clear volume
        assert!((lv.y() - 10.0).abs() < 0.6);
        assert!((tr.y() - 1.0).abs() < 1e-5);
    }
}
