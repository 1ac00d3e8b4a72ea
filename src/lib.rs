//! # fluo
//!
//! [Rust][rust] crate for Monte Carlo light transport through
//! participating media, aimed at fluorescence microscopy in
//! scattering tissue. Photons are traced through a tissue volume
//! (homogeneous, layered or a voxel grid), excite fluorescent beads
//! and are counted by disk shaped sensors.
//!
//! A scene description is parsed into a **Scene** and one
//! **VolumeIntegrator** (see [api]). Two ways to use an integrator
//! exist:
//!
//! 1. [render loop][render] for the per camera ray integrators
//!    (single scattering, single scattering fluorescence, backward)
//! 2. [photon simulation][simulate] for the McFee and the Monte
//!    Carlo fluorescence integrators, run from **preprocess()**
//!
//! [rust]: https://www.rust-lang.org
//! [api]: core/api/index.html
//! [render]: integrators/fn.render.html
//! [simulate]: integrators/fn.simulate_photons.html

#[macro_use] extern crate impl_ops;

pub mod blockqueue;
pub mod core;
pub mod integrators;
pub mod lights;
pub mod media;
pub mod shapes;
