// std
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
// others
use byteorder::{LittleEndian, ReadBytesExt};
use log::info;
use rayon::prelude::*;
// fluo
use crate::core::error::{FluoError, Result};
use crate::core::floatfile::read_float_file;
use crate::core::geometry::{Bounds3f, Point3f, Point3i, Vector3f};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::lerp;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::spectrum::SampledSpectrum;
use crate::core::transform::Transform;
use crate::core::volume::{Coefficients, RegionProperties};
use crate::media::fluorescence_from_params;

// see grid.h

/// Density samples on a regular `nx * ny * nz` lattice spanning the
/// extent, sample `(x, y, z)` sits at the center of its voxel.
pub struct GridRegion {
    pub properties: RegionProperties,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub data: Vec<Float>,
}

impl GridRegion {
    /// Negative samples are clamped to zero.
    pub fn new(properties: RegionProperties, nx: usize, ny: usize, nz: usize, mut data: Vec<Float>) -> Self {
        data.par_iter_mut().for_each(|d| *d = d.max(0.0 as Float));
        GridRegion {
            properties,
            nx: nx.max(1),
            ny: ny.max(1),
            nz: nz.max(1),
            data,
        }
    }
    /// Sample lookup with indices clamped to the lattice.
    pub fn d(&self, p: &Point3i) -> Float {
        let x: usize = p.x.max(0).min(self.nx as i32 - 1) as usize;
        let y: usize = p.y.max(0).min(self.ny as i32 - 1) as usize;
        let z: usize = p.z.max(0).min(self.nz as i32 - 1) as usize;
        self.data
            .get((z * self.ny + y) * self.nx + x)
            .cloned()
            .unwrap_or(0.0)
    }
    /// Trilinearly interpolated density at a point in the local frame.
    pub fn density(&self, p_obj: &Point3f) -> Float {
        if !self.properties.extent.inside(p_obj) {
            return 0.0;
        }
        // compute voxel coordinates and offsets for _p_obj_
        let o: Vector3f = self.properties.extent.offset(p_obj);
        let vox: Point3f = Point3f {
            x: o.x * self.nx as Float - 0.5 as Float,
            y: o.y * self.ny as Float - 0.5 as Float,
            z: o.z * self.nz as Float - 0.5 as Float,
        };
        let pi: Point3i = vox.floor();
        let dx: Float = vox.x - pi.x as Float;
        let dy: Float = vox.y - pi.y as Float;
        let dz: Float = vox.z - pi.z as Float;
        let at = |x: i32, y: i32, z: i32| -> Float {
            self.d(&Point3i {
                x: pi.x + x,
                y: pi.y + y,
                z: pi.z + z,
            })
        };
        // trilinearly interpolate density values to compute local density
        let d00: Float = lerp(dx, at(0, 0, 0), at(1, 0, 0));
        let d10: Float = lerp(dx, at(0, 1, 0), at(1, 1, 0));
        let d01: Float = lerp(dx, at(0, 0, 1), at(1, 0, 1));
        let d11: Float = lerp(dx, at(0, 1, 1), at(1, 1, 1));
        let d0: Float = lerp(dy, d00, d10);
        let d1: Float = lerp(dy, d01, d11);
        lerp(dz, d0, d1)
    }
}

/// Header `<prefix>.hdr` holds `nx ny nz x0 y0 z0 x1 y1 z1`, the
/// voxels follow in `<prefix>.img` as little-endian 32 bit floats.
pub fn read_raw_volume(prefix: &str) -> Result<(usize, usize, usize, Bounds3f, Vec<Float>)> {
    let header: Vec<Float> = read_float_file(format!("{}.hdr", prefix))?;
    if header.len() < 9 {
        return Err(FluoError::InvalidParameter(format!(
            "raw volume header {}.hdr needs 9 values, found {}",
            prefix,
            header.len()
        )));
    }
    let nx: usize = header[0] as usize;
    let ny: usize = header[1] as usize;
    let nz: usize = header[2] as usize;
    let extent: Bounds3f = Bounds3f::new(
        Point3f::new(header[3], header[4], header[5]),
        Point3f::new(header[6], header[7], header[8]),
    );
    let path: PathBuf = PathBuf::from(format!("{}.img", prefix));
    let mut reader = BufReader::new(File::open(&path)?);
    let count: usize = nx * ny * nz;
    let mut data: Vec<Float> = vec![0.0; count];
    reader.read_f32_into::<LittleEndian>(&mut data)?;
    Ok((nx, ny, nz, extent, data))
}

pub fn create_grid_region(volume_to_world: &Transform, params: &ParamSet) -> Result<GridRegion> {
    // initialize common volume region parameters
    let zero: Spectrum = SampledSpectrum::new(0.0);
    let sigma_a: Spectrum = params.find_one_spectrum("sigma_a", zero);
    let sigma_s: Spectrum = params.find_one_spectrum("sigma_s", zero);
    let g: Float = params.find_one_float("g", 0.0);
    let le: Spectrum = params.find_one_spectrum("Le", zero);
    let p0: Point3f = params.find_one_point3f("p0", Point3f::new(0.0, 0.0, 0.0));
    let p1: Point3f = params.find_one_point3f("p1", Point3f::new(1.0, 1.0, 1.0));
    let format: String = params.find_one_string("format", "pbrt");
    let (nx, ny, nz, extent, data) = match format.as_str() {
        "raw" => {
            let prefix: String = params.find_one_string("prefix", "");
            info!("Reading a RAW volume from {:?}", prefix);
            read_raw_volume(&prefix)?
        }
        "pbrt" => {
            let data: Vec<Float> = params
                .find_float("density")
                .ok_or(FluoError::MissingDensity)?;
            let nx: usize = params.find_one_int("nx", 1).max(1) as usize;
            let ny: usize = params.find_one_int("ny", 1).max(1) as usize;
            let nz: usize = params.find_one_int("nz", 1).max(1) as usize;
            if data.len() != nx * ny * nz {
                return Err(FluoError::DensityCountMismatch {
                    found: data.len(),
                    expected: nx * ny * nz,
                });
            }
            (nx, ny, nz, Bounds3f::new(p0, p1), data)
        }
        _ => return Err(FluoError::UnknownFormat(format)),
    };
    let coefficients: Coefficients = Coefficients::new(sigma_a, sigma_s, g);
    let mut properties: RegionProperties =
        RegionProperties::new(volume_to_world, extent, coefficients, coefficients, le);
    properties.fluorescence = fluorescence_from_params(params);
    Ok(GridRegion::new(properties, nx, ny, nz, data))
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    fn row(values: Vec<Float>) -> GridRegion {
        let mut ps = ParamSet::default();
        ps.add_int("nx", values.len() as i32);
        ps.add_floats("density", values);
        create_grid_region(&Transform::default(), &ps).unwrap()
    }

    #[test]
    fn voxel_centers_and_midpoints() {
        let grid = row(vec![1.0, 3.0, 7.0, 5.0]);
        // voxel centers of a 4 wide lattice on [0, 1]
        assert!((grid.density(&Point3f::new(0.125, 0.5, 0.5)) - 1.0).abs() < 1e-5);
        assert!((grid.density(&Point3f::new(0.625, 0.5, 0.5)) - 7.0).abs() < 1e-5);
        // between the 2nd and 3rd sample
        assert!((grid.density(&Point3f::new(0.5, 0.5, 0.5)) - 5.0).abs() < 1e-5);
        // clamped at the border half voxels
        assert!((grid.density(&Point3f::new(0.0, 0.5, 0.5)) - 1.0).abs() < 1e-5);
        assert_eq!(grid.density(&Point3f::new(1.5, 0.5, 0.5)), 0.0);
    }

    #[test]
    fn interpolation_is_continuous() {
        let grid = row(vec![0.0, 2.0, 8.0]);
        let mut last = grid.density(&Point3f::new(0.0, 0.5, 0.5));
        for i in 1..=100 {
            let d = grid.density(&Point3f::new(i as Float / 100.0, 0.5, 0.5));
            assert!((d - last).abs() < 0.25);
            last = d;
        }
    }

    #[test]
    fn density_errors() {
        let mut ps = ParamSet::default();
        ps.add_int("nx", 2);
        match create_grid_region(&Transform::default(), &ps) {
            Err(FluoError::MissingDensity) => {}
            _ => panic!("expected missing density"),
        }
        ps.add_floats("density", vec![1.0, 2.0, 3.0]);
        match create_grid_region(&Transform::default(), &ps) {
            Err(FluoError::DensityCountMismatch { found, expected }) => {
                assert_eq!((found, expected), (3, 2));
            }
            _ => panic!("expected count mismatch"),
        }
        let mut ps = ParamSet::default();
        ps.add_string("format", "vdb");
        assert!(matches!(
            create_grid_region(&Transform::default(), &ps),
            Err(FluoError::UnknownFormat(_))
        ));
    }

    #[test]
    fn raw_volume_files() {
        let prefix = std::env::temp_dir().join("rs_fluo_grid_raw_test");
        let prefix = prefix.to_str().unwrap().to_string();
        {
            let mut hdr = File::create(format!("{}.hdr", prefix)).unwrap();
            writeln!(hdr, "2 1 1 0 0 0 2 1 1").unwrap();
            let mut img = File::create(format!("{}.img", prefix)).unwrap();
            img.write_f32::<LittleEndian>(4.0).unwrap();
            img.write_f32::<LittleEndian>(-2.0).unwrap();
        }
        let mut ps = ParamSet::default();
        ps.add_string("format", "raw");
        ps.add_string("prefix", &prefix);
        let grid = create_grid_region(&Transform::default(), &ps).unwrap();
        assert_eq!((grid.nx, grid.ny, grid.nz), (2, 1, 1));
        assert_eq!(grid.properties.extent.p_max, Point3f::new(2.0, 1.0, 1.0));
        assert_eq!(grid.data, vec![4.0, 0.0]);
        let _ = std::fs::remove_file(format!("{}.hdr", prefix));
        let _ = std::fs::remove_file(format!("{}.img", prefix));
    }
}
