//! The **Film** collects the radiance estimates of the camera rays.
//! Worker threads fill a **FilmTile** each, the tiles are merged into
//! the film on the collecting thread, and the final image is written
//! as an 8 bit sRGB PNG.
//!

// std
use std::path::Path;
use std::sync::RwLock;
// others
use log::info;
use rayon::prelude::*;
// fluo
use crate::core::error::Result;
use crate::core::geometry::Point2f;
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{clamp_t, gamma_correct};
use crate::core::pbrt::{Float, Spectrum};
use crate::core::spectrum::xyz_to_rgb;

// see film.h

#[derive(Debug, Default, Copy, Clone)]
pub struct Pixel {
    xyz: [Float; 3],
    filter_weight_sum: Float,
}

#[derive(Debug, Default, Copy, Clone)]
pub struct FilmTilePixel {
    contrib_sum: Spectrum,
    filter_weight_sum: Float,
}

/// Pixel rectangle `[x0, x1) x [y0, y1)` rendered by one worker.
pub struct FilmTile {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pixels: Vec<FilmTilePixel>,
}

impl FilmTile {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        let n: usize = ((x1 - x0) * (y1 - y0)) as usize;
        FilmTile {
            x0,
            y0,
            x1,
            y1,
            pixels: vec![FilmTilePixel::default(); n],
        }
    }
    /// Box filtered: the sample only contributes to the pixel it
    /// falls into.
    pub fn add_sample(&mut self, p_film: &Point2f, l: &Spectrum, sample_weight: Float) {
        let x: i64 = p_film.x.floor() as i64;
        let y: i64 = p_film.y.floor() as i64;
        if x < self.x0 as i64 || x >= self.x1 as i64 || y < self.y0 as i64 || y >= self.y1 as i64 {
            return;
        }
        let idx: usize = self.get_pixel_index(x as u32, y as u32);
        let pixel: &mut FilmTilePixel = &mut self.pixels[idx];
        pixel.contrib_sum += *l * sample_weight;
        pixel.filter_weight_sum += sample_weight;
    }
    fn get_pixel_index(&self, x: u32, y: u32) -> usize {
        let width: u32 = self.x1 - self.x0;
        ((y - self.y0) * width + (x - self.x0)) as usize
    }
}

pub struct Film {
    pub x_resolution: u32,
    pub y_resolution: u32,
    /// The filename of the output image
    pub filename: String,
    pub pixels: RwLock<Vec<Pixel>>,
}

impl Film {
    pub fn new(x_resolution: u32, y_resolution: u32, filename: String) -> Self {
        let x_resolution: u32 = x_resolution.max(1);
        let y_resolution: u32 = y_resolution.max(1);
        Film {
            x_resolution,
            y_resolution,
            filename,
            pixels: RwLock::new(vec![
                Pixel::default();
                (x_resolution * y_resolution) as usize
            ]),
        }
    }
    pub fn get_film_tile(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> FilmTile {
        FilmTile::new(
            x0.min(self.x_resolution),
            y0.min(self.y_resolution),
            x1.min(self.x_resolution),
            y1.min(self.y_resolution),
        )
    }
    pub fn merge_film_tile(&self, tile: &FilmTile) {
        let width: u32 = self.x_resolution;
        if let Ok(mut pixels_write) = self.pixels.write() {
            for y in tile.y0..tile.y1 {
                for x in tile.x0..tile.x1 {
                    let tile_pixel: &FilmTilePixel = &tile.pixels[tile.get_pixel_index(x, y)];
                    let merge_pixel: &mut Pixel = &mut pixels_write[(y * width + x) as usize];
                    let mut xyz: [Float; 3] = [0.0; 3];
                    tile_pixel.contrib_sum.to_xyz(&mut xyz);
                    for i in 0..3 {
                        merge_pixel.xyz[i] += xyz[i];
                    }
                    merge_pixel.filter_weight_sum += tile_pixel.filter_weight_sum;
                }
            }
        }
    }
    /// Weighted RGB value of every pixel, row by row.
    pub fn rgb(&self) -> Vec<Float> {
        let mut rgb: Vec<Float> = vec![0.0 as Float; (3 * self.x_resolution * self.y_resolution) as usize];
        if let Ok(pixels) = self.pixels.read() {
            rgb.par_chunks_mut(3)
                .zip(pixels.par_iter())
                .for_each(|(out, pixel)| {
                    let mut c: [Float; 3] = [0.0; 3];
                    xyz_to_rgb(&pixel.xyz, &mut c);
                    if pixel.filter_weight_sum != 0.0 as Float {
                        let inv_wt: Float = 1.0 as Float / pixel.filter_weight_sum;
                        for i in 0..3 {
                            out[i] = (0.0 as Float).max(c[i] * inv_wt);
                        }
                    }
                });
        }
        rgb
    }
    pub fn write_image(&self) -> Result<()> {
        let rgb: Vec<Float> = self.rgb();
        let buffer: Vec<u8> = rgb
            .par_iter()
            .map(|v| clamp_t(255.0 as Float * gamma_correct(*v) + 0.5, 0.0, 255.0) as u8)
            .collect();
        info!("Writing image {:?} with bounds {}x{}", self.filename, self.x_resolution, self.y_resolution);
        image::save_buffer(
            &Path::new(&self.filename),
            &buffer,
            self.x_resolution,
            self.y_resolution,
            image::ColorType::Rgb8,
        )?;
        Ok(())
    }
}

pub fn create_film(params: &ParamSet) -> Film {
    let filename: String = params.find_one_string("filename", "fluo.png");
    let xres: i32 = params.find_one_int("xresolution", 256);
    let yres: i32 = params.find_one_int("yresolution", 256);
    Film::new(xres.max(1) as u32, yres.max(1) as u32, filename)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tiles_merge_into_film() {
        let film = Film::new(4, 2, "unused.png".to_string());
        let mut tile = film.get_film_tile(2, 0, 8, 8);
        assert_eq!((tile.x1, tile.y1), (4, 2));
        tile.add_sample(&Point2f { x: 3.5, y: 1.5 }, &Spectrum::new(1.0), 1.0);
        tile.add_sample(&Point2f { x: 3.5, y: 1.5 }, &Spectrum::new(0.0), 1.0);
        // outside the tile
        tile.add_sample(&Point2f { x: 0.5, y: 0.5 }, &Spectrum::new(1.0), 1.0);
        film.merge_film_tile(&tile);
        let rgb = film.rgb();
        assert_eq!(rgb.len(), 24);
        let idx = 3 * (4 + 3);
        // two samples averaged
        assert!(rgb[idx + 1] > 0.3 && rgb[idx + 1] < 0.7);
        assert_eq!(rgb[0], 0.0);
    }
}
