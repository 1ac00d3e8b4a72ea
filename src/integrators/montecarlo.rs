//! Photons emitted by a single fluorescent bead are followed through
//! the tissue until they cross the tissue surface (the *interface*
//! sensor). Crossing photons are refracted and counted again if the
//! refracted ray reaches the *detector*.

// others
use log::info;
// fluo
use crate::core::error::{FluoError, Result};
use crate::core::geometry::{Bounds3f, Point2f, Point3f, Ray};
use crate::core::integrator::{march_transmittance, Preprocessed, SimulationReport};
use crate::core::medium::{DistanceSample, PhotonRole, PhotonState};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::sampling::uniform_sample_sphere;
use crate::core::scene::Scene;
use crate::core::sensor::{Sensor, SensorRole, SensorTally};
use crate::core::volume::VolumeRegion;
use crate::integrators::mcfee::scatter_or_absorb;
use crate::integrators::simulate_photons;

// see montecarlofluorescence.h

pub struct MonteCarloFluorescenceIntegrator {
    pub bead_position: Point3f,
    pub number_photons: u64,
    pub step_size: Float,
    pub seed: u64,
    tau_sample_offset: usize,
}

/// Where a photon's walk ended.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WalkEnd {
    Absorbed,
    LeftTissue,
    /// crossed the interface, total internal reflection
    Reflected,
    /// refracted, but missed the detector
    Refracted,
    Detected,
}

impl MonteCarloFluorescenceIntegrator {
    pub fn new(bead_position: Point3f, number_photons: u64, step_size: Float, seed: u64) -> Self {
        MonteCarloFluorescenceIntegrator {
            bead_position,
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
    /// Random walk of one photon starting at the bead.
    pub fn walk(
        &self,
        scene: &Scene,
        vr: &VolumeRegion,
        (detector, interface): (usize, usize),
        photon: u64,
        rng: &mut Rng,
        tally: &mut SensorTally,
    ) -> WalkEnd {
        let bound: Bounds3f = vr.world_bound();
        let w = uniform_sample_sphere(&Point2f {
            x: rng.uniform_float(),
            y: rng.uniform_float(),
        });
        let mut state: PhotonState = PhotonState::new(photon, self.bead_position, w, PhotonRole::Excitation);
        let unit: Spectrum = Spectrum::new(1.0);
        while bound.inside(&state.p) {
            let ray: Ray = Ray::new(state.p, state.w);
            let ds: DistanceSample = match scatter_or_absorb(vr, &ray, state.role, rng) {
                Some(ds) => ds,
                None => return WalkEnd::Absorbed,
            };
            let surface: &Sensor = &scene.sensors[interface];
            if let Some(t_hit) = surface.hit(&ray, ds.t) {
                tally.record_hit(interface, surface, photon, &ray.position(t_hit), &ray.d, &unit);
                let refracted: Ray = match surface.refracted_ray(&ray, t_hit) {
                    Some(r) => r,
                    None => return WalkEnd::Reflected,
                };
                let sensor: &Sensor = &scene.sensors[detector];
                return match sensor.intersect(&refracted) {
                    Some(t_sensor) => {
                        tally.record_hit(
                            detector,
                            sensor,
                            photon,
                            &refracted.position(t_sensor),
                            &refracted.d,
                            &unit,
                        );
                        WalkEnd::Detected
                    }
                    None => WalkEnd::Refracted,
                };
            }
            match vr.sample_direction(&ds.p, &ray.d, rng.uniform_float(), rng.uniform_float(), state.role) {
                Some((wo, _pdf)) => state.scatter(ds.p, wo),
                None => return WalkEnd::LeftTissue,
            }
        }
        WalkEnd::LeftTissue
    }
    pub fn preprocess(
        &self,
        scene: &Scene,
        num_threads: u8,
        progress: &mut dyn FnMut(u64, u64),
    ) -> Result<Preprocessed> {
        let vr: &VolumeRegion = scene.volume_region.as_ref().ok_or(FluoError::NoVolume)?;
        if scene.sensors.is_empty() {
            return Err(FluoError::NoSensors);
        }
        let detector: usize = scene
            .sensor_by_role(SensorRole::Detector)
            .ok_or(FluoError::MissingDetector)?;
        let interface: usize = scene
            .sensor_by_role(SensorRole::Interface)
            .ok_or(FluoError::MissingInterface)?;
        info!(
            "Monte Carlo fluorescence of {} photons from bead at {:?}",
            self.number_photons, self.bead_position
        );
        let tally: SensorTally = simulate_photons(
            scene.sensors.len(),
            self.number_photons,
            self.seed,
            num_threads,
            progress,
            |photon: u64, rng: &mut Rng, tally: &mut SensorTally| {
                self.walk(scene, vr, (detector, interface), photon, rng, tally);
            },
        )?;
        let report: SimulationReport = SimulationReport::new(scene, self.number_photons, tally);
        report.write_sensors(scene)?;
        Ok(Preprocessed::Simulated(report))
    }
}

pub fn create_monte_carlo_fluorescence_integrator(params: &ParamSet) -> MonteCarloFluorescenceIntegrator {
    let bead_position: Point3f = params.find_one_point3f("beadposition", Point3f::default());
    let number_photons: i32 = params.find_one_int("numberphotons", 10000);
    let step_size: Float = params.find_one_float("stepsize", 1.0);
    let seed: i32 = params.find_one_int("seed", 0);
    MonteCarloFluorescenceIntegrator::new(
        bead_position,
        number_photons.max(0) as u64,
        step_size,
        seed.max(0) as u64,
    )
}
