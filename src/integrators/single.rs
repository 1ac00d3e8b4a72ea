//! Single scattering: light from the light sources is scattered
//! exactly once inside the volume towards the camera. The ray is
//! marched through the volume with a fixed step, each step samples
//! one light.

// others
use log::warn;
// fluo
use crate::core::geometry::{Point2f, Point3f, Ray, Vector3f};
use crate::core::integrator::{march_transmittance, russian_roulette};
use crate::core::light::{Light, LightIncidence, LightSample};
use crate::core::lowdiscrepancy::{ld_shuffle_scrambled_1d, ld_shuffle_scrambled_2d};
use crate::core::medium::PhotonRole;
use crate::core::memory::MemoryArena;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::scene::Scene;

// see single.h

pub struct SingleScatteringIntegrator {
    pub step_size: Float,
    tau_sample_offset: usize,
    scatter_sample_offset: usize,
}

/// Per step sample values for light selection and light sampling.
pub struct LightSamples<'a> {
    pub light_num: &'a mut [Float],
    pub light_comp: &'a mut [Float],
    pub light_pos: &'a mut [Point2f],
}

impl<'a> LightSamples<'a> {
    /// Decorrelated low discrepancy values for `n_steps` steps,
    /// allocated from `arena`.
    pub fn new(n_steps: usize, arena: &'a MemoryArena, rng: &mut Rng) -> Self {
        let light_num: &mut [Float] = arena.alloc_floats(n_steps);
        ld_shuffle_scrambled_1d(1, n_steps, light_num, rng);
        let light_comp: &mut [Float] = arena.alloc_floats(n_steps);
        ld_shuffle_scrambled_1d(1, n_steps, light_comp, rng);
        let light_pos: &mut [Point2f] = arena.alloc_points(n_steps);
        ld_shuffle_scrambled_2d(1, n_steps, light_pos, rng);
        LightSamples {
            light_num,
            light_comp,
            light_pos,
        }
    }
    /// Pick one of `n_lights` lights uniformly for step `i`.
    pub fn light_index(&self, i: usize, n_lights: usize) -> usize {
        ((self.light_num[i] * n_lights as Float) as usize).min(n_lights - 1)
    }
    pub fn light_sample(&self, i: usize) -> LightSample {
        LightSample::new(self.light_comp[i], self.light_pos[i].x, self.light_pos[i].y)
    }
}

/// Parametric range of the ray inside the volume, split into equal
/// steps no longer than `step_size`. Returns `(t0, step, n_steps)`.
pub fn march_range(scene: &Scene, ray: &Ray, step_size: Float) -> Option<(Float, Float, usize)> {
    let vr = scene.volume_region.as_ref()?;
    let (t0, t1) = vr.intersect_p(ray)?;
    if t1 - t0 <= 0.0 as Float || step_size <= 0.0 as Float {
        return None;
    }
    let n_steps: usize = (((t1 - t0) / step_size).ceil() as usize).max(1);
    Some((t0, (t1 - t0) / n_steps as Float, n_steps))
}

/// Light `light` delivers to `p`, attenuated by the volume between
/// both. `None` if the light does not reach `p`.
pub fn sample_light_at(
    scene: &Scene,
    light: &Light,
    p: &Point3f,
    ls: &LightSample,
    step_size: Float,
    rng: &mut Rng,
) -> Option<(LightIncidence, Spectrum)> {
    let li: LightIncidence = light.sample_l(p, ls);
    if li.l.is_black() || li.pdf <= 0.0 as Float || !li.vis.unoccluded(scene) {
        return None;
    }
    let ld: Spectrum = li.l * march_transmittance(scene, &li.vis.ray(), step_size, None, 0, rng);
    Some((li, ld))
}

impl SingleScatteringIntegrator {
    pub fn new(step_size: Float) -> Self {
        SingleScatteringIntegrator {
            step_size,
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
    pub fn li(
        &self,
        scene: &Scene,
        ray: &Ray,
        sample: Option<&Sample>,
        rng: &mut Rng,
        arena: &MemoryArena,
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
        let samples: LightSamples = LightSamples::new(n_steps, arena, rng);
        let w: Vector3f = -ray.d.normalize();
        let u: Float = sample
            .and_then(|s| s.get_1d(self.scatter_sample_offset))
            .unwrap_or_else(|| rng.uniform_float());
        let mut p: Point3f = ray.position(t0);
        let mut t: Float = t0 + u * step;
        for i in 0..n_steps {
            // advance to sample at _t_ and update _tr_
            let p_prev: Point3f = p;
            p = ray.position(t);
            let tau_ray: Ray = Ray::segment(p_prev, p - p_prev, 0.0, 1.0, ray.time, ray.depth);
            let step_tau: Spectrum = vr.tau(&tau_ray, 0.5 as Float * self.step_size, rng.uniform_float());
            tr *= (-step_tau).exp();
            if !russian_roulette(&mut tr, rng) {
                break;
            }
            lv += tr * vr.lve(&p);
            let ss: Spectrum = vr.sigma_s(&p, PhotonRole::Excitation);
            let n_lights: usize = scene.lights.len();
            if !ss.is_black() && n_lights > 0 {
                let light: &Light = &scene.lights[samples.light_index(i, n_lights)];
                if let Some((li, ld)) =
                    sample_light_at(scene, light, &p, &samples.light_sample(i), self.step_size, rng)
                {
                    let phase: Float = vr.phase(&p, &w, &-li.wi, PhotonRole::Excitation);
                    lv += tr * ss * ld * (phase * n_lights as Float / li.pdf);
                }
            }
            t += step;
        }
        if lv.has_nans() {
            warn!("Not-a-number radiance from single scattering, setting to black");
            lv = Spectrum::new(0.0);
        }
        (lv * step, tr)
    }
}

pub fn create_single_scattering_integrator(params: &ParamSet) -> SingleScatteringIntegrator {
    let step_size: Float = params.find_one_float("stepsize", 1.0);
    SingleScatteringIntegrator::new(step_size)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Bounds3f;
    use crate::core::spectrum::SampledSpectrum;
    use crate::core::transform::Transform;
    use crate::core::volume::{Coefficients, RegionProperties, VolumeRegion};
    use crate::lights::point::PointLight;
    use crate::media::homogeneous::HomogeneousRegion;

    fn slab_scene(sigma_a: Float, sigma_s: Float, with_light: bool) -> Scene {
        let c = Coefficients::new(
            SampledSpectrum::new(sigma_a),
            SampledSpectrum::new(sigma_s),
            0.0,
        );
        let vr = VolumeRegion::Homogeneous(HomogeneousRegion::new(
            RegionProperties::new(
                &Transform::default(),
                Bounds3f::new(Point3f::new(-5.0, -5.0, 0.0), Point3f::new(5.0, 5.0, 10.0)),
                c,
                c,
                SampledSpectrum::new(0.0),
            ),
            1.0,
        ));
        let lights: Vec<Light> = if with_light {
            vec![Light::Point(Box::new(PointLight::new(
                &Transform::translate(&Vector3f::new(0.0, 0.0, -1.0)),
                &SampledSpectrum::new(1.0),
            )))]
        } else {
            Vec::new()
        };
        Scene::new(Some(vr), lights, Vec::new(), Vec::new())
    }

    #[test]
    fn slab_transmittance_at_normal_incidence() {
        let scene = slab_scene(0.1, 0.9, false);
        let mut integrator = SingleScatteringIntegrator::new(1.0);
        let mut sample = Sample::new();
        integrator.request_samples(&mut sample);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let expected: Float = (-10.0 as Float).exp();
        let mut rng = Rng::new();
        for _ in 0..8 {
            sample.fill(Point2f::default(), &mut rng);
            let tr = integrator.transmittance(&scene, &ray, Some(&sample), &mut rng);
            assert!((tr.y() - expected).abs() < 1e-2 * expected);
            assert!(tr.c.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn zero_length_range_is_transparent() {
        let scene = slab_scene(0.1, 0.9, true);
        let integrator = SingleScatteringIntegrator::new(1.0);
        let arena = MemoryArena::new();
        let mut rng = Rng::new();
        // ends exactly where it enters the slab
        let ray = Ray::segment(
            Point3f::new(-6.0, 0.0, 5.0),
            Vector3f::new(1.0, 0.0, 0.0),
            0.0,
            1.0,
            0.0,
            0,
        );
        let (lv, tr) = integrator.li(&scene, &ray, None, &mut rng, &arena);
        assert!(lv.is_black());
        assert_eq!(tr, Spectrum::new(1.0));
        // a ray missing the volume entirely
        let miss = Ray::new(Point3f::new(20.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let (lv, tr) = integrator.li(&scene, &miss, None, &mut rng, &arena);
        assert!(lv.is_black());
        assert_eq!(tr, Spectrum::new(1.0));
    }

    #[test]
    fn scattering_adds_radiance() {
        let scene = slab_scene(0.0, 0.1, true);
        let integrator = SingleScatteringIntegrator::new(0.5);
        let arena = MemoryArena::new();
        let mut rng = Rng::new();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 20.0), Vector3f::new(0.0, 0.0, -1.0));
        let (lv, tr) = integrator.li(&scene, &ray, None, &mut rng, &arena);
        assert!(lv.y() > 0.0);
        assert!(tr.y() < 1.0 && tr.y() > 0.0);
        // nothing scatters without scattering coefficient
        let dark = slab_scene(0.5, 0.0, true);
        let (lv, _) = integrator.li(&dark, &ray, None, &mut rng, &arena);
        assert!(lv.is_black());
    }
}
