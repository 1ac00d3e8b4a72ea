//! Light transport through the tissue volume is handled by one of the
//! **VolumeIntegrator** variants. Two kinds exist:
//!
//! 1. Per camera ray estimators (single scattering, single scattering
//!    fluorescence and the backward estimator). They are evaluated by
//!    the render loop for every camera ray via **li()** and
//!    **transmittance()**.
//! 2. Photon simulations (McFee and Monte Carlo fluorescence). All the
//!    work is done in **preprocess()**, which returns a
//!    **SimulationReport** instead of letting the render loop run.

// std
use std::fmt;
// others
use log::info;
// fluo
use crate::core::error::Result;
use crate::core::geometry::Ray;
use crate::core::memory::MemoryArena;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::scene::Scene;
use crate::core::sensor::SensorTally;
use crate::integrators::backward::BackwardIntegrator;
use crate::integrators::fluorescence::SingleScatteringFluorescenceIntegrator;
use crate::integrators::mcfee::McfeeIntegrator;
use crate::integrators::montecarlo::MonteCarloFluorescenceIntegrator;
use crate::integrators::single::SingleScatteringIntegrator;

// see volume.h

/// Below this luminance a path plays Russian roulette.
pub const ROULETTE_THRESHOLD: Float = 1e-3;
/// Survival probability of the roulette.
pub const ROULETTE_SURVIVAL: Float = 0.5;

pub enum VolumeIntegrator {
    Single(SingleScatteringIntegrator),
    Fluorescence(SingleScatteringFluorescenceIntegrator),
    Backward(BackwardIntegrator),
    Mcfee(McfeeIntegrator),
    MonteCarlo(MonteCarloFluorescenceIntegrator),
}

/// What **VolumeIntegrator::preprocess()** did.
#[derive(Debug)]
pub enum Preprocessed {
    /// go on and render the image
    Ready,
    /// the photon simulation replaced rendering
    Simulated(SimulationReport),
}

/// Result of a photon simulation. Its **Display** output is the
/// summary printed at the end of a run.
#[derive(Debug)]
pub struct SimulationReport {
    pub number_photons: u64,
    /// sensor names and hit counts, in scene order
    pub sensors: Vec<(String, u64)>,
    pub tally: SensorTally,
}

impl SimulationReport {
    pub fn new(scene: &Scene, number_photons: u64, tally: SensorTally) -> Self {
        let sensors: Vec<(String, u64)> = scene
            .sensors
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), tally.hit_count(i)))
            .collect();
        SimulationReport {
            number_photons,
            sensors,
            tally,
        }
    }
    pub fn total_hits(&self) -> u64 {
        self.tally.total_hits()
    }
    /// Write the film and the hit records of every sensor.
    pub fn write_sensors(&self, scene: &Scene) -> Result<()> {
        for (i, sensor) in scene.sensors.iter().enumerate() {
            if let Some(film) = self.tally.films.get(i) {
                if film.is_empty() {
                    sensor.write_film(&vec![0.0 as Float; sensor.x_resolution * sensor.y_resolution])?;
                } else {
                    sensor.write_film(film)?;
                }
            }
            if let Some(records) = self.tally.records.get(i) {
                sensor.write_records(records)?;
            }
        }
        info!("{} of {} photons reached a sensor", self.total_hits(), self.number_photons);
        Ok(())
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Number of photons used in the simulation [{}]",
            self.number_photons
        )?;
        for (name, hits) in &self.sensors {
            writeln!(f, "[{}] was hit [{}] times", name, hits)?;
        }
        Ok(())
    }
}

impl VolumeIntegrator {
    /// Register the sample slots the integrator reads per camera ray.
    pub fn request_samples(&mut self, sample: &mut Sample) {
        match self {
            VolumeIntegrator::Single(integrator) => integrator.request_samples(sample),
            VolumeIntegrator::Fluorescence(integrator) => integrator.request_samples(sample),
            VolumeIntegrator::Backward(integrator) => integrator.request_samples(sample),
            VolumeIntegrator::Mcfee(integrator) => integrator.request_samples(sample),
            VolumeIntegrator::MonteCarlo(integrator) => integrator.request_samples(sample),
        }
    }
    /// Check the scene and, for the photon simulations, run the whole
    /// simulation. `progress` receives `(photons done, photons
    /// total)` and is only ever called from the calling thread.
    pub fn preprocess(
        &mut self,
        scene: &Scene,
        num_threads: u8,
        progress: &mut dyn FnMut(u64, u64),
    ) -> Result<Preprocessed> {
        match self {
            VolumeIntegrator::Single(_) => Ok(Preprocessed::Ready),
            VolumeIntegrator::Fluorescence(integrator) => integrator.preprocess(scene),
            VolumeIntegrator::Backward(_) => Ok(Preprocessed::Ready),
            VolumeIntegrator::Mcfee(integrator) => integrator.preprocess(scene, num_threads, progress),
            VolumeIntegrator::MonteCarlo(integrator) => integrator.preprocess(scene, num_threads, progress),
        }
    }
    /// Radiance added along the ray by the volume and the
    /// transmittance of the whole ray segment.
    pub fn li(
        &self,
        scene: &Scene,
        ray: &Ray,
        sample: Option<&Sample>,
        rng: &mut Rng,
        arena: &MemoryArena,
    ) -> (Spectrum, Spectrum) {
        match self {
            VolumeIntegrator::Single(integrator) => integrator.li(scene, ray, sample, rng, arena),
            VolumeIntegrator::Fluorescence(integrator) => integrator.li(scene, ray, sample, rng, arena),
            VolumeIntegrator::Backward(integrator) => integrator.li(scene, ray, sample, rng),
            VolumeIntegrator::Mcfee(_) | VolumeIntegrator::MonteCarlo(_) => {
                (Spectrum::new(0.0), Spectrum::new(1.0))
            }
        }
    }
    pub fn transmittance(
        &self,
        scene: &Scene,
        ray: &Ray,
        sample: Option<&Sample>,
        rng: &mut Rng,
    ) -> Spectrum {
        match self {
            VolumeIntegrator::Single(integrator) => integrator.transmittance(scene, ray, sample, rng),
            VolumeIntegrator::Fluorescence(integrator) => integrator.transmittance(scene, ray, sample, rng),
            VolumeIntegrator::Backward(integrator) => integrator.transmittance(scene, ray, sample, rng),
            VolumeIntegrator::Mcfee(integrator) => integrator.transmittance(scene, ray, sample, rng),
            VolumeIntegrator::MonteCarlo(integrator) => integrator.transmittance(scene, ray, sample, rng),
        }
    }
    /// Does **preprocess()** replace rendering?
    pub fn is_simulation(&self) -> bool {
        matches!(self, VolumeIntegrator::Mcfee(_) | VolumeIntegrator::MonteCarlo(_))
    }
}

/// Ray marched transmittance `exp(-tau)`. With a sample the march
/// uses `step_size` and the sample's registered offset, without one
/// a four times coarser step and a random offset.
pub fn march_transmittance(
    scene: &Scene,
    ray: &Ray,
    step_size: Float,
    sample: Option<&Sample>,
    tau_sample_offset: usize,
    rng: &mut Rng,
) -> Spectrum {
    let vr = match &scene.volume_region {
        Some(vr) => vr,
        None => return Spectrum::new(1.0),
    };
    let (step, offset): (Float, Float) = match sample.and_then(|s| s.get_1d(tau_sample_offset)) {
        Some(u) => (step_size, u),
        None => (4.0 as Float * step_size, rng.uniform_float()),
    };
    (-vr.tau(ray, step, offset)).exp().clamp(0.0, 1.0)
}

/// Russian roulette on the path throughput `tr`. Returns false if
/// the path was terminated (and `tr` zeroed).
pub fn russian_roulette(tr: &mut Spectrum, rng: &mut Rng) -> bool {
    if tr.y() < ROULETTE_THRESHOLD {
        if rng.uniform_float() > ROULETTE_SURVIVAL {
            *tr = Spectrum::new(0.0);
            return false;
        }
        *tr = *tr / ROULETTE_SURVIVAL;
    }
    true
}
