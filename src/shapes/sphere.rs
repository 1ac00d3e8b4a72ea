// fluo
use crate::core::geometry::{Bounds3f, Point3f, Ray, Vector3f};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::quadratic;
use crate::core::pbrt::Float;
use crate::core::transform::Transform;

// see sphere.h

/// A fluorescent bead: a named sphere centered at the origin of its
/// object space.
#[derive(Debug, Clone)]
pub struct Bead {
    pub name: String,
    pub radius: Float,
    // inherited from class Shape (see shape.h)
    pub object_to_world: Transform,
    pub world_to_object: Transform,
}

impl Bead {
    pub fn new(object_to_world: Transform, radius: Float, name: String) -> Self {
        Bead {
            name,
            radius,
            object_to_world,
            world_to_object: Transform::inverse(&object_to_world),
        }
    }
    pub fn world_bound(&self) -> Bounds3f {
        let r: Float = self.radius;
        self.object_to_world.transform_bounds(&Bounds3f::new(
            Point3f::new(-r, -r, -r),
            Point3f::new(r, r, r),
        ))
    }
    /// First hit parameter within `[ray.t_min, ray.t_max]`.
    pub fn intersect(&self, r: &Ray) -> Option<Float> {
        // transform _Ray_ to object space
        let ray: Ray = self.world_to_object.transform_ray(r);
        // compute quadratic sphere coefficients
        let o: Vector3f = Vector3f::from(ray.o);
        let a: Float = ray.d.length_squared();
        let b: Float = 2.0 as Float * (ray.d.x * o.x + ray.d.y * o.y + ray.d.z * o.z);
        let c: Float = o.length_squared() - self.radius * self.radius;
        if a == 0.0 as Float {
            return None;
        }
        // solve quadratic equation for _t_ values
        let (t0, t1) = quadratic(a, b, c)?;
        // check quadric shape _t0_ and _t1_ for nearest intersection
        if t0 > ray.t_max || t1 < ray.t_min {
            return None;
        }
        let t_shape_hit: Float = if t0 >= ray.t_min { t0 } else { t1 };
        if t_shape_hit > ray.t_max {
            return None;
        }
        Some(t_shape_hit)
    }
    pub fn intersect_p(&self, r: &Ray) -> bool {
        self.intersect(r).is_some()
    }
}

pub fn create_bead(object_to_world: &Transform, params: &ParamSet, name: &str) -> Bead {
    let radius: Float = params.find_one_float("radius", 1.0);
    let name: String = params.find_one_string("name", name);
    Bead::new(*object_to_world, radius, name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bead_hits_within_segment() {
        let bead = Bead::new(
            Transform::translate(&Vector3f::new(0.0, 0.0, 5.0)),
            1.0,
            "bead".to_string(),
        );
        let mut ray = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        let t = bead.intersect(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-4);
        ray.t_max = 3.5;
        assert!(!bead.intersect_p(&ray));
        // starting inside the bead hits the far side
        let inside = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!((bead.intersect(&inside).unwrap() - 1.0).abs() < 1e-4);
        let miss = Ray::new(Point3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!bead.intersect_p(&miss));
    }
}
