// fluo
use crate::core::geometry::{Normal3f, Point2f, Point3f, Ray};
use crate::core::pbrt::Float;
use crate::core::sampling::concentric_sample_disk;
use crate::core::transform::Transform;

// see disk.h

/// Disk of a given radius in the plane `z = height` of its object
/// space, facing `+z`.
#[derive(Debug, Clone)]
pub struct Disk {
    pub height: Float,
    pub radius: Float,
    // inherited from class Shape (see shape.h)
    pub object_to_world: Transform,
    pub world_to_object: Transform,
}

impl Disk {
    pub fn new(object_to_world: Transform, height: Float, radius: Float) -> Self {
        Disk {
            height,
            radius,
            object_to_world,
            world_to_object: Transform::inverse(&object_to_world),
        }
    }
    /// Hit parameter (in the parametrization of the given ray) and the
    /// hit point in object space.
    pub fn intersect_object(&self, r: &Ray) -> Option<(Float, Point3f)> {
        // transform _Ray_ to object space
        let ray: Ray = self.world_to_object.transform_ray(r);
        // reject disk intersections for rays parallel to the disk's plane
        if ray.d.z == 0.0 {
            return None;
        }
        let t_shape_hit: Float = (self.height - ray.o.z) / ray.d.z;
        if t_shape_hit <= ray.t_min.max(0.0) || t_shape_hit >= ray.t_max {
            return None;
        }
        // see if hit point is inside disk radius
        let p_hit: Point3f = ray.position(t_shape_hit);
        let dist2: Float = p_hit.x * p_hit.x + p_hit.y * p_hit.y;
        if dist2 > self.radius * self.radius {
            return None;
        }
        Some((t_shape_hit, p_hit))
    }
    pub fn intersect(&self, r: &Ray) -> Option<Float> {
        self.intersect_object(r).map(|(t, _)| t)
    }
    pub fn intersect_p(&self, r: &Ray) -> bool {
        self.intersect_object(r).is_some()
    }
    /// World space normal.
    pub fn normal(&self) -> Normal3f {
        self.object_to_world
            .transform_normal(&Normal3f {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            })
            .normalize()
    }
    pub fn area(&self) -> Float {
        std::f32::consts::PI * self.radius * self.radius
    }
    /// Uniformly distributed world space point on the disk.
    pub fn sample(&self, u: &Point2f) -> Point3f {
        let pd: Point2f = concentric_sample_disk(u);
        self.object_to_world.transform_point(&Point3f {
            x: pd.x * self.radius,
            y: pd.y * self.radius,
            z: self.height,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Vector3f;

    #[test]
    fn disk_hits_inside_radius() {
        let disk = Disk::new(Transform::translate(&Vector3f::new(0.0, 0.0, 2.0)), 0.0, 1.0);
        let ray = Ray::new(Point3f::new(0.5, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!((disk.intersect(&ray).unwrap() - 2.0).abs() < 1e-5);
        let outside = Ray::new(Point3f::new(1.5, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!disk.intersect_p(&outside));
        let parallel = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(!disk.intersect_p(&parallel));
        let n = disk.normal();
        assert!((n.z - 1.0).abs() < 1e-6);
        let p = disk.sample(&Point2f { x: 0.3, y: 0.8 });
        assert!((p.z - 2.0).abs() < 1e-5);
    }
}
