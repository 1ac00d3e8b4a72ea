//! The core of the engine: geometry, spectra, sampling, the volume
//! and light interfaces, sensors, the scene and the statements of the
//! scene description.

pub mod api;
pub mod camera;
pub mod error;
pub mod film;
pub mod floatfile;
pub mod geometry;
pub mod integrator;
pub mod light;
pub mod lowdiscrepancy;
pub mod medium;
pub mod memory;
pub mod paramset;
pub mod parser;
pub mod pbrt;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod scene;
pub mod sensor;
pub mod spectrum;
pub mod transform;
pub mod volume;
