//! Implementations of the **VolumeRegion** variants provide various
//! representations of volumetric scattering properties in a region of
//! space.
//!
//! - HomogeneousRegion
//! - GridRegion
//!
//! ## Homogeneous Region
//!
//! Constant coefficients inside a box. The `"tissuelayer"` flavour
//! keeps separate excitation and emission coefficients.
//!
//! ## Grid Region
//!
//! Density samples on a voxel lattice, either inline (`"pbrt"`
//! format) or loaded from a raw volume file.

pub mod grid;
pub mod homogeneous;

// fluo
use crate::core::error::{FluoError, Result};
use crate::core::paramset::ParamSet;
use crate::core::spectrum::SampledSpectrum;
use crate::core::transform::Transform;
use crate::core::volume::{Fluorescence, VolumeRegion};
use crate::media::grid::create_grid_region;
use crate::media::homogeneous::{create_homogeneous_region, create_tissue_layer};

/// Fluorophore parameters shared by all region types.
pub fn fluorescence_from_params(params: &ParamSet) -> Fluorescence {
    let zero = SampledSpectrum::new(0.0);
    Fluorescence {
        fex: params.find_one_spectrum("fex", zero),
        fem: params.find_one_spectrum("fem", zero),
        quantum_yield: params.find_one_float("quantumyield", 1.0),
        cleared: params.find_one_bool("cleared", true),
    }
}

/// Factory for the `Volume` statement.
pub fn make_volume_region(name: &str, volume_to_world: &Transform, params: &ParamSet) -> Result<VolumeRegion> {
    match name {
        "homogeneous" => Ok(VolumeRegion::Homogeneous(create_homogeneous_region(
            volume_to_world,
            params,
        ))),
        "tissuelayer" => Ok(VolumeRegion::Homogeneous(create_tissue_layer(
            volume_to_world,
            params,
        ))),
        "volumegrid" | "grid" => Ok(VolumeRegion::Grid(create_grid_region(volume_to_world, params)?)),
        _ => Err(FluoError::UnknownName {
            kind: "Volume".to_string(),
            name: name.to_string(),
        }),
    }
}
