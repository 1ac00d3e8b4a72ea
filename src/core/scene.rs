//! # Scene
//!
//! As the scene file is parsed, objects are created that represent
//! the tissue volume, the lights, the fluorescent beads and the
//! sensors in the scene. These are all stored in the **Scene**
//! object.
//!

// fluo
use crate::core::geometry::{bnd3_union_bnd3f, Bounds3f, Ray};
use crate::core::light::Light;
use crate::core::pbrt::Float;
use crate::core::sensor::{Sensor, SensorRole};
use crate::core::volume::VolumeRegion;
use crate::shapes::sphere::Bead;

// see scene.h

pub struct Scene {
    pub volume_region: Option<VolumeRegion>,
    pub lights: Vec<Light>,
    pub beads: Vec<Bead>,
    pub sensors: Vec<Sensor>,
    pub world_bound: Bounds3f,
}

impl Scene {
    pub fn new(
        volume_region: Option<VolumeRegion>,
        lights: Vec<Light>,
        beads: Vec<Bead>,
        sensors: Vec<Sensor>,
    ) -> Self {
        let world_bound: Bounds3f = volume_region
            .iter()
            .map(|vr| vr.world_bound())
            .chain(beads.iter().map(|bead| bead.world_bound()))
            .reduce(|a, b| bnd3_union_bnd3f(&a, &b))
            .unwrap_or_default();
        Scene {
            volume_region,
            lights,
            beads,
            sensors,
            world_bound,
        }
    }
    pub fn world_bound(&self) -> Bounds3f {
        self.world_bound
    }
    /// Does any bead block the ray within `[ray.t_min, ray.t_max]`?
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.beads.iter().any(|bead| bead.intersect_p(ray))
    }
    /// Nearest bead hit: index into **beads** and hit parameter.
    pub fn intersect_bead(&self, ray: &Ray) -> Option<(usize, Float)> {
        let mut nearest: Option<(usize, Float)> = None;
        for (i, bead) in self.beads.iter().enumerate() {
            if let Some(t) = bead.intersect(ray) {
                match nearest {
                    Some((_, t_nearest)) if t_nearest <= t => {}
                    _ => nearest = Some((i, t)),
                }
            }
        }
        nearest
    }
    /// Index of the first sensor with the given role.
    pub fn sensor_by_role(&self, role: SensorRole) -> Option<usize> {
        self.sensors.iter().position(|s| s.role == role)
    }
}
