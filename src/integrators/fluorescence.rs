//! Single scattering fluorescence: laser light is absorbed by the
//! fluorophores along the camera ray and re-emitted with the
//! fluorophore's emission profile. Scattering of the emitted light is
//! ignored, which is only valid for optically cleared tissue.

// others
use log::{info, warn};
// fluo
use crate::core::error::{FluoError, Result};
use crate::core::geometry::{Point3f, Ray, Vector3f};
use crate::core::integrator::{march_transmittance, russian_roulette, Preprocessed};
use crate::core::light::Light;
use crate::core::medium::PhotonRole;
use crate::core::memory::MemoryArena;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::scene::Scene;
use crate::core::volume::Fluorescence;
use crate::integrators::single::{march_range, sample_light_at, LightSamples};

pub struct SingleScatteringFluorescenceIntegrator {
    pub step_size: Float,
    tau_sample_offset: usize,
    scatter_sample_offset: usize,
}

impl SingleScatteringFluorescenceIntegrator {
    pub fn new(step_size: Float) -> Self {
        SingleScatteringFluorescenceIntegrator {
            step_size,
            tau_sample_offset: usize::MAX,
            scatter_sample_offset: usize::MAX,
        }
    }
    pub fn request_samples(&mut self, sample: &mut Sample) {
        self.tau_sample_offset = sample.add_1d(1);
        self.scatter_sample_offset = sample.add_1d(1);
    }
    /// Only laser beams excite the fluorophores, and only cleared
    /// volumes are supported.
    pub fn preprocess(&self, scene: &Scene) -> Result<Preprocessed> {
        if scene.lights.iter().any(|light| !light.is_laser()) {
            return Err(FluoError::NonLaserLight);
        }
        if let Some(vr) = &scene.volume_region {
            if vr.has_non_cleared_fluorescent_volumes() {
                return Err(FluoError::NonClearedVolume);
            }
        }
        info!(
            "Single scattering fluorescence with {} laser(s), step size {}",
            scene.lights.len(),
            self.step_size
        );
        Ok(Preprocessed::Ready)
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
        let fluorescence: &Fluorescence = vr.fluorescence();
        let samples: LightSamples = LightSamples::new(n_steps, arena, rng);
        let w: Vector3f = -ray.d.normalize();
        let u: Float = sample
            .and_then(|s| s.get_1d(self.scatter_sample_offset))
            .unwrap_or_else(|| rng.uniform_float());
        let mut p: Point3f = ray.position(t0);
        let mut t: Float = t0 + u * step;
        for i in 0..n_steps {
            let p_prev: Point3f = p;
            p = ray.position(t);
            let tau_ray: Ray = Ray::segment(p_prev, p - p_prev, 0.0, 1.0, ray.time, ray.depth);
            let step_tau: Spectrum = vr.tau(&tau_ray, 0.5 as Float * self.step_size, rng.uniform_float());
            tr *= (-step_tau).exp();
            if !russian_roulette(&mut tr, rng) {
                break;
            }
            // fluorophore absorption
            let sigma: Spectrum = vr.mu(&p);
            let n_lights: usize = scene.lights.len();
            if !sigma.is_black() && n_lights > 0 {
                let light: &Light = &scene.lights[samples.light_index(i, n_lights)];
                if let Some(idx) = light.laser_wavelength_index() {
                    if let Some((li, ld)) =
                        sample_light_at(scene, light, &p, &samples.light_sample(i), self.step_size, rng)
                    {
                        let l_power: Float = ld.at_index(idx);
                        let excitation: Float = fluorescence.fex.at_index(idx);
                        let phase: Float = vr.phase(&p, &w, &-li.wi, PhotonRole::Excitation);
                        lv += tr
                            * sigma
                            * fluorescence.fem
                            * (l_power * phase * excitation * fluorescence.quantum_yield * n_lights as Float
                                / li.pdf);
                    }
                }
            }
            t += step;
        }
        if lv.has_nans() {
            warn!("Not-a-number radiance from fluorescence, setting to black");
            lv = Spectrum::new(0.0);
        }
        (lv * step, tr)
    }
}

pub fn create_single_scattering_fluorescence_integrator(
    params: &ParamSet,
) -> SingleScatteringFluorescenceIntegrator {
    let step_size: Float = params.find_one_float("stepsize", 1.0);
    SingleScatteringFluorescenceIntegrator::new(step_size)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Bounds3f;
    use crate::core::spectrum::{wavelength_index, SampledSpectrum};
    use crate::core::transform::Transform;
    use crate::core::volume::{Coefficients, RegionProperties, VolumeRegion};
    use crate::lights::laser::LaserLight;
    use crate::lights::point::PointLight;
    use crate::media::homogeneous::HomogeneousRegion;

    fn fluorescent_slab(cleared: bool, fex: Float) -> VolumeRegion {
        let c = Coefficients::new(SampledSpectrum::new(0.05), SampledSpectrum::new(0.0), 0.0);
        let mut props = RegionProperties::new(
            &Transform::default(),
            Bounds3f::new(Point3f::new(-5.0, -5.0, 0.0), Point3f::new(5.0, 5.0, 10.0)),
            c,
            c,
            SampledSpectrum::new(0.0),
        );
        props.fluorescence = Fluorescence {
            fex: SampledSpectrum::new(fex),
            fem: SampledSpectrum::new(1.0),
            quantum_yield: 0.8,
            cleared,
        };
        VolumeRegion::Homogeneous(HomogeneousRegion::new(props, 1.0))
    }

    fn laser() -> Light {
        Light::Laser(Box::new(LaserLight::new(
            Point3f::new(0.0, 0.0, -1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            1.0,
            SampledSpectrum::new(1.0),
            wavelength_index(488.0),
        )))
    }

    #[test]
    fn only_lasers_and_cleared_volumes() {
        let point = Light::Point(Box::new(PointLight::new(
            &Transform::default(),
            &SampledSpectrum::new(1.0),
        )));
        let integrator = SingleScatteringFluorescenceIntegrator::new(1.0);
        let scene = Scene::new(Some(fluorescent_slab(true, 1.0)), vec![point], Vec::new(), Vec::new());
        assert!(matches!(integrator.preprocess(&scene), Err(FluoError::NonLaserLight)));
        let scene = Scene::new(Some(fluorescent_slab(false, 1.0)), vec![laser()], Vec::new(), Vec::new());
        assert!(matches!(integrator.preprocess(&scene), Err(FluoError::NonClearedVolume)));
        let scene = Scene::new(Some(fluorescent_slab(true, 1.0)), vec![laser()], Vec::new(), Vec::new());
        assert!(matches!(integrator.preprocess(&scene), Ok(Preprocessed::Ready)));
    }

    #[test]
    fn emission_scales_with_excitation() {
        let integrator = SingleScatteringFluorescenceIntegrator::new(0.5);
        let arena = MemoryArena::new();
        // looking along the laser beam from the far side
        let ray = Ray::new(Point3f::new(0.0, 0.0, 20.0), Vector3f::new(0.0, 0.0, -1.0));
        let bright = Scene::new(Some(fluorescent_slab(true, 1.0)), vec![laser()], Vec::new(), Vec::new());
        let mut rng = Rng::new();
        let (lv_bright, tr) = integrator.li(&bright, &ray, None, &mut rng, &arena);
        assert!(lv_bright.y() > 0.0);
        assert!(tr.y() > 0.0 && tr.y() < 1.0);
        let dark = Scene::new(Some(fluorescent_slab(true, 0.0)), vec![laser()], Vec::new(), Vec::new());
        let mut rng = Rng::new();
        let (lv_dark, _) = integrator.li(&dark, &ray, None, &mut rng, &arena);
        assert!(lv_dark.is_black());
    }
}
