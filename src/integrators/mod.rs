//! The **VolumeIntegrator** variants and the two loops driving them.
//!
//! - SingleScatteringIntegrator
//! - SingleScatteringFluorescenceIntegrator
//! - BackwardIntegrator
//! - McfeeIntegrator
//! - MonteCarloFluorescenceIntegrator
//!
//! ## Single Scattering
//!
//! Marches camera rays through the volume and samples one light per
//! step. Light is scattered exactly once towards the camera.
//!
//! ## Single Scattering Fluorescence
//!
//! Like single scattering, but laser light absorbed by fluorophores is
//! re-emitted with the fluorophore's emission profile and quantum
//! yield.
//!
//! ## Backward Scattering
//!
//! A random walk starting at the camera ray's entry point accumulates
//! the photon density of the volume.
//!
//! ## McFee
//!
//! Photons leave the laser (excitation path) and wander through the
//! tissue until they are absorbed, leave the tissue or hit a
//! fluorescent bead. A bead re-emits the photon (emission path),
//! which is counted if it reaches one of the sensors.
//!
//! ## Monte Carlo Fluorescence
//!
//! Photons start at a fluorescent bead and are followed until they
//! cross the tissue surface, where they are refracted towards the
//! detector.
//!
//! The per camera ray integrators run inside **render()**, the photon
//! simulations use **simulate_photons()**. Both hand out blocks of
//! work through a **BlockQueue** to worker threads and collect the
//! results on the calling thread.

// std
use std::ops::Range;
// others
use log::{info, warn};
// fluo
use crate::blockqueue::BlockQueue;
use crate::core::camera::OrthographicCamera;
use crate::core::error::{FluoError, Result};
use crate::core::film::FilmTile;
use crate::core::geometry::{Point2f, Ray};
use crate::core::integrator::VolumeIntegrator;
use crate::core::memory::MemoryArena;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::scene::Scene;
use crate::core::sensor::SensorTally;
use crate::integrators::backward::create_backward_integrator;
use crate::integrators::fluorescence::create_single_scattering_fluorescence_integrator;
use crate::integrators::mcfee::create_mcfee_integrator;
use crate::integrators::montecarlo::create_monte_carlo_fluorescence_integrator;
use crate::integrators::single::create_single_scattering_integrator;

pub mod backward;
pub mod fluorescence;
pub mod mcfee;
pub mod montecarlo;
pub mod single;

/// Photons per block handed to a worker thread.
pub const PHOTON_BATCH_SIZE: u32 = 1024;
/// Edge length of the image tiles.
pub const TILE_SIZE: u32 = 16;

/// Factory for the `Integrator` and `VolumeIntegrator` statements.
pub fn make_integrator(name: &str, params: &ParamSet) -> Result<VolumeIntegrator> {
    let integrator: VolumeIntegrator = match name {
        "single" => VolumeIntegrator::Single(create_single_scattering_integrator(params)),
        "fluorescencesingle" | "singlefluorescence" => {
            VolumeIntegrator::Fluorescence(create_single_scattering_fluorescence_integrator(params))
        }
        "backward" | "vsdbackward" => VolumeIntegrator::Backward(create_backward_integrator(params)),
        "mcfee" => VolumeIntegrator::Mcfee(create_mcfee_integrator(params)),
        "montecarlofluorescence" => {
            VolumeIntegrator::MonteCarlo(create_monte_carlo_fluorescence_integrator(params))
        }
        _ => {
            return Err(FluoError::UnknownName {
                kind: "Integrator".to_string(),
                name: name.to_string(),
            });
        }
    };
    Ok(integrator)
}

fn number_of_cores(num_threads: u8) -> usize {
    if num_threads == 0_u8 {
        num_cpus::get()
    } else {
        num_threads as usize
    }
}

/// Run `walk` for photons `0..number_photons` on `num_threads`
/// worker threads (0: all cores). Photon `i` always gets the same
/// random number stream, the merged tally does not depend on the
/// number of threads.
pub fn simulate_photons<F>(
    n_sensors: usize,
    number_photons: u64,
    seed: u64,
    num_threads: u8,
    progress: &mut dyn FnMut(u64, u64),
    walk: F,
) -> Result<SensorTally>
where
    F: Fn(u64, &mut Rng, &mut SensorTally) + Sync,
{
    let mut total: SensorTally = SensorTally::new(n_sensors);
    if number_photons == 0 {
        progress(0, 0);
        return Ok(total);
    }
    let num_cores: usize = number_of_cores(num_threads);
    info!(
        "Simulating {} photons with {} thread(s) ...",
        number_photons, num_cores
    );
    let block_queue: BlockQueue = BlockQueue::photon_batches(number_photons, PHOTON_BATCH_SIZE);
    let bq: &BlockQueue = &block_queue;
    let walk: &F = &walk;
    let mut done: u64 = 0;
    crossbeam::scope(|scope| {
        let (tally_tx, tally_rx) = crossbeam_channel::bounded(num_cores);
        // spawn worker threads
        for _ in 0..num_cores {
            let tally_tx = tally_tx.clone();
            scope.spawn(move |_| {
                while let Some(block) = bq.next() {
                    let photons: Range<u64> = bq.photon_range(block);
                    let n: u64 = photons.end - photons.start;
                    let mut tally: SensorTally = SensorTally::new(n_sensors);
                    for i in photons {
                        let mut rng: Rng = Rng::for_photon(seed, i);
                        walk(i, &mut rng, &mut tally);
                    }
                    // send the batch through the channel to the calling thread
                    if tally_tx.send((n, tally)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tally_tx);
        // collect on this thread
        for _ in 0..bq.len() {
            match tally_rx.recv() {
                Ok((n, tally)) => {
                    total.merge(tally);
                    done += n;
                    progress(done, number_photons);
                }
                Err(_) => break,
            }
        }
    })
    .map_err(|_| FluoError::WorkerPanic)?;
    total.sort_records();
    Ok(total)
}

/// **Main function** to **render** a scene with one of the per
/// camera ray integrators, one sample per pixel. `progress` receives
/// `(tiles done, tiles total)`.
pub fn render(
    scene: &Scene,
    camera: &OrthographicCamera,
    integrator: &mut VolumeIntegrator,
    num_threads: u8,
    progress: &mut dyn FnMut(u64, u64),
) -> Result<()> {
    let mut proto_sample: Sample = Sample::new();
    integrator.request_samples(&mut proto_sample);
    let film = &camera.film;
    let num_cores: usize = number_of_cores(num_threads);
    info!(
        "Rendering {}x{} pixels with {} thread(s) ...",
        film.x_resolution, film.y_resolution, num_cores
    );
    let block_queue: BlockQueue = BlockQueue::new(
        (film.x_resolution, film.y_resolution),
        (TILE_SIZE, TILE_SIZE),
    );
    let bq: &BlockQueue = &block_queue;
    let integrator: &VolumeIntegrator = integrator;
    let proto_sample: &Sample = &proto_sample;
    let n_tiles_x: u32 = (film.x_resolution + TILE_SIZE - 1) / TILE_SIZE;
    let n_tiles: u64 = bq.len() as u64;
    crossbeam::scope(|scope| {
        let (tile_tx, tile_rx) = crossbeam_channel::bounded::<FilmTile>(num_cores);
        for _ in 0..num_cores {
            let tile_tx = tile_tx.clone();
            scope.spawn(move |_| {
                let mut sample: Sample = proto_sample.clone();
                while let Some((x, y)) = bq.next() {
                    let mut rng: Rng = Rng::new();
                    rng.set_sequence((y * n_tiles_x + x) as u64);
                    let x0: u32 = x * TILE_SIZE;
                    let y0: u32 = y * TILE_SIZE;
                    let mut film_tile: FilmTile = film.get_film_tile(x0, y0, x0 + TILE_SIZE, y0 + TILE_SIZE);
                    for py in film_tile.y0..film_tile.y1 {
                        for px in film_tile.x0..film_tile.x1 {
                            let p_film: Point2f = Point2f {
                                x: px as Float + rng.uniform_float(),
                                y: py as Float + rng.uniform_float(),
                            };
                            sample.fill(p_film, &mut rng);
                            let ray: Ray = camera.generate_ray(&p_film);
                            let arena: MemoryArena = MemoryArena::new();
                            let (mut l, _tr) = integrator.li(scene, &ray, Some(&sample), &mut rng, &arena);
                            let y_l: Float = l.y();
                            if l.has_nans() {
                                warn!("Not-a-number radiance value returned for pixel ({}, {}). Setting to black.", px, py);
                                l = Spectrum::new(0.0);
                            } else if y_l < -10.0e-5 as Float {
                                warn!("Negative luminance value, {}, returned for pixel ({}, {}). Setting to black.", y_l, px, py);
                                l = Spectrum::new(0.0);
                            } else if y_l.is_infinite() {
                                warn!("Infinite luminance value returned for pixel ({}, {}). Setting to black.", px, py);
                                l = Spectrum::new(0.0);
                            }
                            film_tile.add_sample(&p_film, &l, 1.0);
                        } // arena is dropped here !
                    }
                    if tile_tx.send(film_tile).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tile_tx);
        for i in 0..n_tiles {
            match tile_rx.recv() {
                Ok(film_tile) => {
                    film.merge_film_tile(&film_tile);
                    progress(i + 1, n_tiles);
                }
                Err(_) => break,
            }
        }
    })
    .map_err(|_| FluoError::WorkerPanic)?;
    film.write_image()
}
