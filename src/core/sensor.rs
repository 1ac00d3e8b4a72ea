//! Sensors collect the photons leaving the tissue. Each **Sensor** is
//! a disk with a role: a *detector* counts (and optionally images)
//! the photons reaching it, an *interface* models the boundary between
//! tissue and the surrounding medium and hands refracted photons on to
//! the detector.
//!
//! Sensors themselves are immutable while a simulation runs. Hits are
//! accumulated in a **SensorTally** owned by one worker thread, the
//! tallies of all workers are merged on the calling thread at the end
//! of the batch.

// std
use std::fs::File;
use std::io::{BufWriter, Write};
use std::str::FromStr;
// others
use log::info;
use strum_macros::{Display, EnumString};
// fluo
use crate::core::error::{FluoError, Result};
use crate::core::geometry::{vec3_dot_nrmf, vec3_dot_vec3f};
use crate::core::geometry::{Point3f, Ray, Vector3f};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::clamp_t;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::transform::Transform;
use crate::shapes::disk::Disk;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SensorRole {
    Detector,
    Interface,
}

/// One photon reaching a sensor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HitRecord {
    pub photon: u64,
    pub p: Point3f,
    /// cosine between the photon direction and the sensor normal
    pub cos_theta: Float,
    pub luminance: Float,
}

pub struct Sensor {
    pub name: String,
    pub role: SensorRole,
    pub disk: Disk,
    /// relative index of refraction (inside over outside)
    pub eta: Float,
    pub x_resolution: usize,
    pub y_resolution: usize,
    /// image written after a simulation (empty: none)
    pub filename: String,
    /// keep every single hit and write them next to the image
    pub records: bool,
}

impl Sensor {
    /// Hit parameter if the ray reaches the sensor before `t_dist`.
    pub fn hit(&self, ray: &Ray, t_dist: Float) -> Option<Float> {
        let mut r: Ray = *ray;
        r.t_max = t_dist.min(ray.t_max);
        self.disk.intersect(&r)
    }
    pub fn intersect(&self, ray: &Ray) -> Option<Float> {
        self.disk.intersect(ray)
    }
    pub fn cos_theta(&self, w: &Vector3f) -> Float {
        let length: Float = w.length();
        if length == 0.0 as Float {
            return 0.0;
        }
        vec3_dot_nrmf(&(*w / length), &self.disk.normal()).abs()
    }
    /// The photon travelling along `ray` crosses the sensor at
    /// `t_hit`. Returns the refracted continuation, `None` on total
    /// internal reflection.
    pub fn refracted_ray(&self, ray: &Ray, t_hit: Float) -> Option<Ray> {
        let d: Vector3f = ray.d.normalize();
        let mut n: Vector3f = Vector3f::from(self.disk.normal());
        let mut cos_i: Float = -vec3_dot_vec3f(&d, &n);
        if cos_i < 0.0 as Float {
            // normal faces the other way
            n = -n;
            cos_i = -cos_i;
        }
        let eta: Float = self.eta;
        let sin2_t: Float = eta * eta * (0.0 as Float).max(1.0 as Float - cos_i * cos_i);
        if sin2_t >= 1.0 as Float {
            return None;
        }
        let cos_t: Float = (1.0 as Float - sin2_t).sqrt();
        let wt: Vector3f = d * eta + n * (eta * cos_i - cos_t);
        Some(Ray::segment(
            ray.position(t_hit),
            wt.normalize(),
            1e-4,
            Float::INFINITY,
            ray.time,
            ray.depth + 1,
        ))
    }
    /// Film pixel a world space point on the disk falls into.
    pub fn film_pixel(&self, p: &Point3f) -> Option<usize> {
        if self.x_resolution == 0 || self.y_resolution == 0 || self.disk.radius <= 0.0 {
            return None;
        }
        let p_obj: Point3f = self.disk.world_to_object.transform_point(p);
        let diameter: Float = 2.0 as Float * self.disk.radius;
        let u: Float = (p_obj.x + self.disk.radius) / diameter;
        let v: Float = 1.0 as Float - (p_obj.y + self.disk.radius) / diameter;
        let x: usize = clamp_t(
            (u * self.x_resolution as Float) as i64,
            0,
            self.x_resolution as i64 - 1,
        ) as usize;
        let y: usize = clamp_t(
            (v * self.y_resolution as Float) as i64,
            0,
            self.y_resolution as i64 - 1,
        ) as usize;
        Some(y * self.x_resolution + x)
    }
    /// Normalized 8 bit grey image of the accumulated film.
    pub fn write_film(&self, film: &[Float]) -> Result<()> {
        if self.filename.is_empty() {
            return Ok(());
        }
        let n_pixels: usize = self.x_resolution * self.y_resolution;
        let max_value: Float = film.iter().cloned().fold(0.0 as Float, Float::max);
        let buffer: Vec<u8> = (0..n_pixels)
            .map(|i| {
                let v: Float = film.get(i).cloned().unwrap_or(0.0);
                if max_value > 0.0 as Float {
                    clamp_t(255.0 as Float * v / max_value + 0.5, 0.0, 255.0) as u8
                } else {
                    0_u8
                }
            })
            .collect();
        info!("Writing sensor image {:?}", self.filename);
        image::save_buffer(
            &self.filename,
            &buffer,
            self.x_resolution as u32,
            self.y_resolution as u32,
            image::ColorType::L8,
        )?;
        Ok(())
    }
    /// One line per hit: photon index, position, cosine and luminance.
    pub fn write_records(&self, records: &[HitRecord]) -> Result<()> {
        if self.filename.is_empty() || !self.records {
            return Ok(());
        }
        let filename: String = format!("{}.records", self.filename);
        info!("Writing {} hit records to {:?}", records.len(), filename);
        let mut writer = BufWriter::new(File::create(&filename)?);
        for r in records {
            writeln!(
                writer,
                "{} {} {} {} {} {}",
                r.photon, r.p.x, r.p.y, r.p.z, r.cos_theta, r.luminance
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn create_disk_sensor(object_to_world: &Transform, params: &ParamSet, index: usize) -> Result<Sensor> {
    let radius: Float = params.find_one_float("radius", 1.0);
    let height: Float = params.find_one_float("height", 0.0);
    let name: String = params.find_one_string("name", &format!("sensor{}", index));
    let role_name: String = params.find_one_string("role", "detector");
    let role: SensorRole = SensorRole::from_str(&role_name).map_err(|_| {
        FluoError::InvalidParameter(format!("sensor role {:?}, use \"detector\" or \"interface\"", role_name))
    })?;
    let eta: Float = params.find_one_float("eta", 1.0);
    if eta <= 0.0 as Float {
        return Err(FluoError::InvalidParameter(format!(
            "sensor {:?} has eta = {}",
            name, eta
        )));
    }
    let x_resolution: i32 = params.find_one_int("xresolution", 64);
    let y_resolution: i32 = params.find_one_int("yresolution", 64);
    Ok(Sensor {
        name,
        role,
        disk: Disk::new(*object_to_world, height, radius),
        eta,
        x_resolution: x_resolution.max(0) as usize,
        y_resolution: y_resolution.max(0) as usize,
        filename: params.find_one_string("filename", ""),
        records: params.find_one_bool("records", false),
    })
}

/// Hits accumulated by one worker, indexed like the scene's sensors.
#[derive(Debug, Default, Clone)]
pub struct SensorTally {
    pub counts: Vec<u64>,
    /// per sensor film, empty until the first hit
    pub films: Vec<Vec<Float>>,
    pub records: Vec<Vec<HitRecord>>,
}

impl SensorTally {
    pub fn new(n_sensors: usize) -> Self {
        SensorTally {
            counts: vec![0; n_sensors],
            films: vec![Vec::new(); n_sensors],
            records: vec![Vec::new(); n_sensors],
        }
    }
    /// Count a photon reaching `sensor` (the scene's sensor `index`)
    /// at `p` while travelling along `w`.
    pub fn record_hit(
        &mut self,
        index: usize,
        sensor: &Sensor,
        photon: u64,
        p: &Point3f,
        w: &Vector3f,
        l: &Spectrum,
    ) {
        if index >= self.counts.len() {
            return;
        }
        self.counts[index] += 1;
        let luminance: Float = l.y();
        if let Some(pixel) = sensor.film_pixel(p) {
            let film: &mut Vec<Float> = &mut self.films[index];
            if film.is_empty() {
                *film = vec![0.0; sensor.x_resolution * sensor.y_resolution];
            }
            film[pixel] += luminance;
        }
        if sensor.records {
            self.records[index].push(HitRecord {
                photon,
                p: *p,
                cos_theta: sensor.cos_theta(w),
                luminance,
            });
        }
    }
    pub fn merge(&mut self, other: SensorTally) {
        if self.counts.len() < other.counts.len() {
            self.counts.resize(other.counts.len(), 0);
            self.films.resize(other.counts.len(), Vec::new());
            self.records.resize(other.counts.len(), Vec::new());
        }
        for (i, count) in other.counts.iter().enumerate() {
            self.counts[i] += count;
        }
        for (i, film) in other.films.into_iter().enumerate() {
            if film.is_empty() {
                continue;
            }
            if self.films[i].is_empty() {
                self.films[i] = film;
            } else {
                for (a, b) in self.films[i].iter_mut().zip(film.iter()) {
                    *a += b;
                }
            }
        }
        for (i, mut records) in other.records.into_iter().enumerate() {
            self.records[i].append(&mut records);
        }
    }
    /// Order records by photon index, independent of scheduling.
    pub fn sort_records(&mut self) {
        for records in self.records.iter_mut() {
            records.sort_by_key(|r| r.photon);
        }
    }
    pub fn hit_count(&self, index: usize) -> u64 {
        self.counts.get(index).cloned().unwrap_or(0)
    }
    pub fn total_hits(&self) -> u64 {
        self.counts.iter().sum()
    }
}
