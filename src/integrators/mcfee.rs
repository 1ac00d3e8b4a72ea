//! Excitation/emission simulation for fluorescent beads embedded in
//! tissue. Every photon leaves the first light (the fiber, which has
//! to be a laser), scatters
//! through the tissue with the excitation coefficients and, if it
//! reaches a bead, is re-emitted isotropically and followed with the
//! emission coefficients until it hits a sensor.

// others
use log::info;
// fluo
use crate::core::error::{FluoError, Result};
use crate::core::geometry::{Bounds3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::integrator::{march_transmittance, Preprocessed, SimulationReport};
use crate::core::light::{Light, LightEmission};
use crate::core::medium::{DistanceSample, PhotonRole, PhotonState};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::sampling::uniform_sample_sphere;
use crate::core::scene::Scene;
use crate::core::sensor::SensorTally;
use crate::core::volume::VolumeRegion;
use crate::integrators::simulate_photons;

// see mcfee.h

pub struct McfeeIntegrator {
    pub number_photons: u64,
    pub step_size: Float,
    pub seed: u64,
    tau_sample_offset: usize,
}

fn random_point2(rng: &mut Rng) -> Point2f {
    Point2f {
        x: rng.uniform_float(),
        y: rng.uniform_float(),
    }
}

/// Decide between scattering and absorption at the photon's
/// position. On scattering the free-flight distance along `ray` is
/// returned, `None` means the photon was absorbed (or the medium does
/// not attenuate there).
pub fn scatter_or_absorb(vr: &VolumeRegion, ray: &Ray, role: PhotonRole, rng: &mut Rng) -> Option<DistanceSample> {
    let sigma_t: Float = vr.sigma_t(&ray.o, role).y();
    if sigma_t <= 0.0 as Float {
        return None;
    }
    let scattering_prob: Float = vr.sigma_s(&ray.o, role).y() / sigma_t;
    if scattering_prob > rng.uniform_float() {
        vr.sample_distance(ray, rng.uniform_float(), role)
    } else {
        None
    }
}

/// Follow a photon from the fiber until it hits a bead. Returns the
/// hit point, `None` if the photon was absorbed or left the tissue.
pub fn excitation_path(scene: &Scene, vr: &VolumeRegion, fiber: &Light, photon: u64, rng: &mut Rng) -> Option<Point3f> {
    let u1: Point2f = random_point2(rng);
    let u2: Point2f = random_point2(rng);
    let le: LightEmission = fiber.sample_le(&u1, &u2);
    let bound: Bounds3f = vr.world_bound();
    let mut state: PhotonState = PhotonState::new(photon, le.ray.o, le.ray.d.normalize(), PhotonRole::Excitation);
    while bound.inside(&state.p) {
        let ray: Ray = Ray::new(state.p, state.w);
        let ds: DistanceSample = scatter_or_absorb(vr, &ray, state.role, rng)?;
        let segment: Ray = Ray::segment(state.p, state.w, 0.0, ds.t, 0.0, 0);
        if let Some((_bead, t_hit)) = scene.intersect_bead(&segment) {
            return Some(ray.position(t_hit));
        }
        // HG with g_ex instead of a uniform sphere direction
        let (wo, _pdf) = vr.sample_direction(&ds.p, &state.w, rng.uniform_float(), rng.uniform_float(), state.role)?;
        state.scatter(ds.p, wo);
    }
    None
}

/// Follow the photon re-emitted at `p_hit` until it is absorbed,
/// leaves the tissue or reaches a sensor. Returns true on a sensor hit.
pub fn emission_path(
    scene: &Scene,
    vr: &VolumeRegion,
    p_hit: &Point3f,
    photon: u64,
    rng: &mut Rng,
    tally: &mut SensorTally,
) -> bool {
    let bound: Bounds3f = vr.world_bound();
    let mut state: PhotonState = PhotonState::new(photon, *p_hit, Vector3f::default(), PhotonRole::Emission);
    while bound.inside(&state.p) {
        // isotropic re-emission
        state.w = uniform_sample_sphere(&random_point2(rng));
        let ray: Ray = Ray::new(state.p, state.w);
        let ds: DistanceSample = match scatter_or_absorb(vr, &ray, state.role, rng) {
            Some(ds) => ds,
            None => return false,
        };
        for (i, sensor) in scene.sensors.iter().enumerate() {
            if let Some(t_hit) = sensor.hit(&ray, ds.t) {
                tally.record_hit(
                    i,
                    sensor,
                    state.index,
                    &ray.position(t_hit),
                    &state.w,
                    &Spectrum::new(state.weight),
                );
                return true;
            }
        }
        state.scatter(ds.p, state.w);
    }
    false
}

impl McfeeIntegrator {
    pub fn new(number_photons: u64, step_size: Float, seed: u64) -> Self {
        McfeeIntegrator {
            number_photons,
            step_size,
            seed,
            tau_sample_offset: usize::MAX,
        }
    }
    pub fn request_samples(&mut self, sample: &mut Sample) {
        self.tau_sample_offset = sample.add_1d(1);
    }
    pub fn transmittance(&self, scene: &Scene, ray: &Ray, sample: Option<&Sample>, rng: &mut Rng) -> Spectrum {
        march_transmittance(scene, ray, self.step_size, sample, self.tau_sample_offset, rng)
    }
    /// Run the whole simulation and write the sensor data.
    pub fn preprocess(
        &self,
        scene: &Scene,
        num_threads: u8,
        progress: &mut dyn FnMut(u64, u64),
    ) -> Result<Preprocessed> {
        let vr: &VolumeRegion = scene.volume_region.as_ref().ok_or(FluoError::NoVolume)?;
        let fiber: &Light = scene.lights.first().ok_or(FluoError::NoLights)?;
        if !fiber.is_laser() {
            return Err(FluoError::NonLaserLight);
        }
        if scene.sensors.is_empty() {
            return Err(FluoError::NoSensors);
        }
        info!(
            "McFee simulation of {} photons, {} bead(s), {} sensor(s)",
            self.number_photons,
            scene.beads.len(),
            scene.sensors.len()
        );
        let tally: SensorTally = simulate_photons(
            scene.sensors.len(),
            self.number_photons,
            self.seed,
            num_threads,
            progress,
            |photon: u64, rng: &mut Rng, tally: &mut SensorTally| {
                if let Some(p_hit) = excitation_path(scene, vr, fiber, photon, rng) {
                    emission_path(scene, vr, &p_hit, photon, rng, tally);
                }
            },
        )?;
        let report: SimulationReport = SimulationReport::new(scene, self.number_photons, tally);
        report.write_sensors(scene)?;
        Ok(Preprocessed::Simulated(report))
    }
}

pub fn create_mcfee_integrator(params: &ParamSet) -> McfeeIntegrator {
    let number_photons: i32 = params.find_one_int("numberphotons", 10000);
    let step_size: Float = params.find_one_float("stepsize", 1.0);
    let seed: i32 = params.find_one_int("seed", 0);
    McfeeIntegrator::new(number_photons.max(0) as u64, step_size, seed.max(0) as u64)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::sensor::{create_disk_sensor, Sensor};
    use crate::core::spectrum::SampledSpectrum;
    use crate::core::transform::Transform;
    use crate::core::volume::{Coefficients, RegionProperties};
    use crate::lights::laser::LaserLight;
    use crate::lights::point::PointLight;
    use crate::media::homogeneous::HomogeneousRegion;
    use crate::shapes::sphere::Bead;

    fn tissue() -> VolumeRegion {
        let c = Coefficients::new(SampledSpectrum::new(0.01), SampledSpectrum::new(1.0), 0.0);
        VolumeRegion::Homogeneous(HomogeneousRegion::new(
            RegionProperties::new(
                &Transform::default(),
                Bounds3f::new(Point3f::new(-5.0, -5.0, -5.0), Point3f::new(5.0, 5.0, 5.0)),
                c,
                c,
                SampledSpectrum::new(0.0),
            ),
            1.0,
        ))
    }

    fn fiber_at(z: Float) -> Light {
        Light::Laser(Box::new(LaserLight::new(
            Point3f::new(0.0, 0.0, z),
            Vector3f::new(0.0, 0.0, 1.0),
            0.5,
            SampledSpectrum::new(1.0),
            0,
        )))
    }

    fn sensor() -> Sensor {
        let mut ps = ParamSet::default();
        ps.add_float("radius", 10.0);
        ps.add_string("name", "top");
        create_disk_sensor(&Transform::translate(&Vector3f::new(0.0, 0.0, 4.5)), &ps, 0).unwrap()
    }

    fn bead_scene(fiber_z: Float) -> Scene {
        Scene::new(
            Some(tissue()),
            vec![fiber_at(fiber_z)],
            vec![Bead::new(Transform::default(), 1.0, "bead".to_string())],
            vec![sensor()],
        )
    }

    #[test]
    fn missing_scene_elements() {
        let integrator = McfeeIntegrator::new(10, 1.0, 0);
        let mut progress = |_: u64, _: u64| {};
        let scene = Scene::new(None, vec![fiber_at(-4.0)], Vec::new(), vec![sensor()]);
        assert!(matches!(integrator.preprocess(&scene, 1, &mut progress), Err(FluoError::NoVolume)));
        let scene = Scene::new(Some(tissue()), Vec::new(), Vec::new(), vec![sensor()]);
        assert!(matches!(integrator.preprocess(&scene, 1, &mut progress), Err(FluoError::NoLights)));
        let scene = Scene::new(Some(tissue()), vec![fiber_at(-4.0)], Vec::new(), Vec::new());
        assert!(matches!(integrator.preprocess(&scene, 1, &mut progress), Err(FluoError::NoSensors)));
    }

    #[test]
    fn point_light_fiber_is_rejected() {
        let integrator = McfeeIntegrator::new(100, 1.0, 0);
        let point = Light::Point(Box::new(PointLight::new(
            &Transform::translate(&Vector3f::new(0.0, 0.0, -4.0)),
            &SampledSpectrum::new(1.0),
        )));
        let scene = Scene::new(
            Some(tissue()),
            vec![point],
            vec![Bead::new(Transform::default(), 1.0, "bead".to_string())],
            vec![sensor()],
        );
        let mut calls = 0;
        match integrator.preprocess(&scene, 1, &mut |_, _| calls += 1) {
            Err(e) => {
                assert!(matches!(e, FluoError::NonLaserLight));
                assert!(!e.is_missing_requirement());
            }
            Ok(_) => panic!("a point light can't drive the excitation"),
        }
        // no transport was started
        assert_eq!(calls, 0);
    }

    #[test]
    fn launch_outside_fails_immediately() {
        let scene = bead_scene(-10.0);
        let vr = scene.volume_region.as_ref().unwrap();
        let mut rng = Rng::for_photon(0, 0);
        for i in 0..100 {
            assert!(excitation_path(&scene, vr, &scene.lights[0], i, &mut rng).is_none());
        }
    }

    #[test]
    fn excitation_reaches_bead() {
        let scene = bead_scene(-4.0);
        let vr = scene.volume_region.as_ref().unwrap();
        let mut hits = 0;
        for i in 0..200 {
            let mut rng = Rng::for_photon(1, i);
            if let Some(p) = excitation_path(&scene, vr, &scene.lights[0], i, &mut rng) {
                // on the bead surface
                let r = (p - Point3f::default()).length();
                assert!((r - 1.0).abs() < 1e-3);
                hits += 1;
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn zero_photons_report_zero_hits() {
        let integrator = McfeeIntegrator::new(0, 1.0, 0);
        let scene = bead_scene(-4.0);
        match integrator.preprocess(&scene, 2, &mut |_, _| {}) {
            Ok(Preprocessed::Simulated(report)) => {
                assert_eq!(report.number_photons, 0);
                assert_eq!(report.sensors, vec![("top".to_string(), 0)]);
            }
            _ => panic!("expected a simulation report"),
        }
    }

    #[test]
    fn hits_grow_with_photon_count() {
        let scene = bead_scene(-4.0);
        let mut counts: Vec<u64> = Vec::new();
        for n in [500_u64, 4000].iter() {
            let integrator = McfeeIntegrator::new(*n, 1.0, 3);
            match integrator.preprocess(&scene, 2, &mut |_, _| {}) {
                Ok(Preprocessed::Simulated(report)) => counts.push(report.total_hits()),
                _ => panic!("expected a simulation report"),
            }
        }
        assert!(counts[0] > 0);
        assert!(counts[1] > counts[0]);
    }
}
