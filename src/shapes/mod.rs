//! Shapes the photons can run into.
//!
//! - Bead
//! - Disk
//!
//! ## Beads
//!
//! Fluorescent beads (or markers) are spheres embedded in the tissue.
//! An excitation photon reaching one of them is absorbed by the
//! fluorophore and triggers the emission path.
//!
//! ## Disks
//!
//! Sensors are disks: a detector collecting emitted photons, or the
//! interface between tissue and the surrounding medium which refracts
//! photons towards the detector.

pub mod disk;
pub mod sphere;
