//! The camera generates the rays the per-ray volume integrators are
//! evaluated for. Only an orthographic projection is provided: the
//! rendered images are maps of the emitted fluorescence seen from
//! one side of the tissue block.

// others
use log::warn;
// fluo
use crate::core::film::Film;
use crate::core::geometry::{Point2f, Point3f, Ray, Vector3f};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::lerp;
use crate::core::pbrt::Float;
use crate::core::transform::Transform;

// see orthographic.h

pub struct OrthographicCamera {
    pub camera_to_world: Transform,
    /// `[x_min, x_max, y_min, y_max]` in camera space
    pub screen_window: [Float; 4],
    pub film: Film,
}

impl OrthographicCamera {
    pub fn new(camera_to_world: Transform, screen_window: [Float; 4], film: Film) -> Self {
        OrthographicCamera {
            camera_to_world,
            screen_window,
            film,
        }
    }
    /// Ray through the raster position `p_film`, looking down `+z` in
    /// camera space.
    pub fn generate_ray(&self, p_film: &Point2f) -> Ray {
        let sx: Float = p_film.x / self.film.x_resolution as Float;
        let sy: Float = p_film.y / self.film.y_resolution as Float;
        let p_camera: Point3f = Point3f {
            x: lerp(sx, self.screen_window[0], self.screen_window[1]),
            // raster y grows downwards
            y: lerp(sy, self.screen_window[3], self.screen_window[2]),
            z: 0.0,
        };
        let ray: Ray = Ray::new(p_camera, Vector3f::new(0.0, 0.0, 1.0));
        let mut r: Ray = self.camera_to_world.transform_ray(&ray);
        r.d = r.d.normalize();
        r
    }
}

pub fn create_orthographic_camera(camera_to_world: &Transform, params: &ParamSet, film: Film) -> OrthographicCamera {
    let frame: Float = params.find_one_float(
        "frameaspectratio",
        film.x_resolution as Float / film.y_resolution as Float,
    );
    let mut screen: [Float; 4] = if frame > 1.0 as Float {
        [-frame, frame, -1.0, 1.0]
    } else {
        [-1.0, 1.0, -1.0 / frame, 1.0 / frame]
    };
    if let Some(sw) = params.find_float("screenwindow") {
        if sw.len() == 4 {
            screen.copy_from_slice(&sw);
        } else {
            warn!("\"screenwindow\" should have four values");
        }
    }
    OrthographicCamera::new(*camera_to_world, screen, film)
}
