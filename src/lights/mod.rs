//! Light sources exciting the fluorophores.
//!
//! - LaserLight
//! - PointLight
//!
//! ## Laser
//!
//! A collimated beam of a given radius leaving an optical fiber. All
//! its power sits in one wavelength bin which the fluorescence
//! integrators use to look up the excitation response.
//!
//! ## Point Lights
//!
//! Isotropic point light source that emits the same amount of light
//! in all directions. Only the plain single scattering integrator
//! accepts it.

pub mod laser;
pub mod point;

// fluo
use crate::core::error::{FluoError, Result};
use crate::core::light::Light;
use crate::core::paramset::ParamSet;
use crate::core::transform::Transform;
use crate::lights::laser::create_laser_light;
use crate::lights::point::create_point_light;

/// Factory for the `LightSource` statement.
pub fn make_light(name: &str, light_to_world: &Transform, params: &ParamSet) -> Result<Light> {
    match name {
        "point" => Ok(Light::Point(Box::new(create_point_light(light_to_world, params)))),
        "laser" | "fiber" => Ok(Light::Laser(Box::new(create_laser_light(light_to_world, params)))),
        _ => Err(FluoError::UnknownName {
            kind: "LightSource".to_string(),
            name: name.to_string(),
        }),
    }
}
