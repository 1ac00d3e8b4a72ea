//! The spectral representation is a fixed number of wavelength bins
//! covering the visible range. Optical coefficients, laser power and
//! fluorescence excitation/emission profiles all share it, which makes
//! a lookup by wavelength index (see **at_index()**) meaningful for
//! the fluorescence estimators.
//!
//! ```rust
//! use rs_fluo::core::spectrum::SampledSpectrum;
//!
//!     let s = SampledSpectrum::new(1.0);
//!     assert!((s.y() - 1.0).abs() < 1e-4);
//! ```

// std
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, MulAssign, Neg, Sub};
// others
use lazy_static::lazy_static;
use num::Zero;
// fluo
use crate::core::pbrt::clamp_t;
use crate::core::pbrt::{lerp, Float};

// see spectrum.h

pub const SAMPLED_LAMBDA_START: Float = 400.0;
pub const SAMPLED_LAMBDA_END: Float = 700.0;
pub const N_SPECTRAL_SAMPLES: usize = 60;

/// Piecewise Gaussian used by the analytic CIE 1931 fits.
fn cie_gauss(x: Float, mu: Float, sigma1: Float, sigma2: Float) -> Float {
    let sigma: Float = if x < mu { sigma1 } else { sigma2 };
    let t: Float = (x - mu) / sigma;
    (-0.5 as Float * t * t).exp()
}

fn cie_x_fit(lambda: Float) -> Float {
    1.056 * cie_gauss(lambda, 599.8, 37.9, 31.0) + 0.362 * cie_gauss(lambda, 442.0, 16.0, 26.7)
        - 0.065 * cie_gauss(lambda, 501.1, 20.4, 26.2)
}

fn cie_y_fit(lambda: Float) -> Float {
    0.821 * cie_gauss(lambda, 568.8, 46.9, 40.5) + 0.286 * cie_gauss(lambda, 530.9, 16.3, 31.1)
}

fn cie_z_fit(lambda: Float) -> Float {
    1.217 * cie_gauss(lambda, 437.0, 11.8, 36.0) + 0.681 * cie_gauss(lambda, 459.0, 26.0, 13.8)
}

struct CieTables {
    x: [Float; N_SPECTRAL_SAMPLES],
    y: [Float; N_SPECTRAL_SAMPLES],
    z: [Float; N_SPECTRAL_SAMPLES],
    y_integral: Float,
}

lazy_static! {
    static ref CIE: CieTables = {
        let mut tables = CieTables {
            x: [0.0; N_SPECTRAL_SAMPLES],
            y: [0.0; N_SPECTRAL_SAMPLES],
            z: [0.0; N_SPECTRAL_SAMPLES],
            y_integral: 0.0,
        };
        for i in 0..N_SPECTRAL_SAMPLES {
            let lambda: Float = bin_wavelength(i);
            tables.x[i] = cie_x_fit(lambda);
            tables.y[i] = cie_y_fit(lambda);
            tables.z[i] = cie_z_fit(lambda);
            tables.y_integral += tables.y[i];
        }
        tables
    };
}

/// Center wavelength (nm) of bin `i`.
pub fn bin_wavelength(i: usize) -> Float {
    let delta: Float = (SAMPLED_LAMBDA_END - SAMPLED_LAMBDA_START) / N_SPECTRAL_SAMPLES as Float;
    SAMPLED_LAMBDA_START + (i as Float + 0.5) * delta
}

/// Bin index containing the wavelength `lambda` (nm), clamped to the
/// represented range.
pub fn wavelength_index(lambda: Float) -> usize {
    let delta: Float = (SAMPLED_LAMBDA_END - SAMPLED_LAMBDA_START) / N_SPECTRAL_SAMPLES as Float;
    let i: Float = ((lambda - SAMPLED_LAMBDA_START) / delta).floor();
    clamp_t(i, 0.0, (N_SPECTRAL_SAMPLES - 1) as Float) as usize
}

/// Average of a piecewise linear function (given by sorted samples)
/// over the range `[lambda_start, lambda_end]`.
pub fn average_spectrum_samples(
    lambda: &[Float],
    vals: &[Float],
    lambda_start: Float,
    lambda_end: Float,
) -> Float {
    let n: usize = lambda.len().min(vals.len());
    if n == 0 {
        return 0.0;
    }
    // handle cases with out-of-bounds range or single sample only
    if lambda_end <= lambda[0] {
        return vals[0];
    }
    if lambda_start >= lambda[n - 1] {
        return vals[n - 1];
    }
    if n == 1 {
        return vals[0];
    }
    let mut sum: Float = 0.0;
    // add contributions of constant segments before/after samples
    if lambda_start < lambda[0] {
        sum += vals[0] * (lambda[0] - lambda_start);
    }
    if lambda_end > lambda[n - 1] {
        sum += vals[n - 1] * (lambda_end - lambda[n - 1]);
    }
    // advance to first relevant wavelength segment
    let mut i: usize = 0;
    while i + 1 < n && lambda_start > lambda[i + 1] {
        i += 1;
    }
    let interp = |w: Float, i: usize| -> Float {
        lerp(
            (w - lambda[i]) / (lambda[i + 1] - lambda[i]),
            vals[i],
            vals[i + 1],
        )
    };
    while i + 1 < n && lambda_end >= lambda[i] {
        let seg_lambda_start: Float = lambda_start.max(lambda[i]);
        let seg_lambda_end: Float = lambda_end.min(lambda[i + 1]);
        if seg_lambda_end > seg_lambda_start {
            sum += 0.5
                * (interp(seg_lambda_start, i) + interp(seg_lambda_end, i))
                * (seg_lambda_end - seg_lambda_start);
        }
        i += 1;
    }
    sum / (lambda_end - lambda_start)
}

#[derive(Debug, Copy, Clone)]
pub struct SampledSpectrum {
    pub c: [Float; N_SPECTRAL_SAMPLES],
}

impl Default for SampledSpectrum {
    fn default() -> Self {
        SampledSpectrum::new(0.0 as Float)
    }
}

impl SampledSpectrum {
    pub fn new(v: Float) -> Self {
        SampledSpectrum {
            c: [v; N_SPECTRAL_SAMPLES],
        }
    }
    /// Resample wavelength/value pairs (in any order) into the bins.
    pub fn from_sampled(lambda: &[Float], values: &[Float]) -> SampledSpectrum {
        let mut pairs: Vec<(Float, Float)> = lambda
            .iter()
            .cloned()
            .zip(values.iter().cloned())
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let l: Vec<Float> = pairs.iter().map(|p| p.0).collect();
        let v: Vec<Float> = pairs.iter().map(|p| p.1).collect();
        let mut r: SampledSpectrum = SampledSpectrum::default();
        let delta: Float = (SAMPLED_LAMBDA_END - SAMPLED_LAMBDA_START) / N_SPECTRAL_SAMPLES as Float;
        for i in 0..N_SPECTRAL_SAMPLES {
            let lambda0: Float = SAMPLED_LAMBDA_START + i as Float * delta;
            let lambda1: Float = lambda0 + delta;
            r.c[i] = average_spectrum_samples(&l, &v, lambda0, lambda1);
        }
        r
    }
    /// Value stored for wavelength bin `i`.
    pub fn at_index(&self, i: usize) -> Float {
        self.c[i.min(N_SPECTRAL_SAMPLES - 1)]
    }
    pub fn to_xyz(&self, xyz: &mut [Float; 3]) {
        xyz[0] = 0.0;
        xyz[1] = 0.0;
        xyz[2] = 0.0;
        for i in 0..N_SPECTRAL_SAMPLES {
            xyz[0] += CIE.x[i] * self.c[i];
            xyz[1] += CIE.y[i] * self.c[i];
            xyz[2] += CIE.z[i] * self.c[i];
        }
        xyz[0] /= CIE.y_integral;
        xyz[1] /= CIE.y_integral;
        xyz[2] /= CIE.y_integral;
    }
    /// Luminance, a constant spectrum of one has luminance one.
    pub fn y(&self) -> Float {
        let mut yy: Float = 0.0;
        for i in 0..N_SPECTRAL_SAMPLES {
            yy += CIE.y[i] * self.c[i];
        }
        yy / CIE.y_integral
    }
    // from CoefficientSpectrum
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0 as Float)
    }
    pub fn exp(&self) -> SampledSpectrum {
        let mut ret: SampledSpectrum = SampledSpectrum::default();
        for i in 0..N_SPECTRAL_SAMPLES {
            ret.c[i] = self.c[i].exp();
        }
        ret
    }
    pub fn clamp(&self, low: Float, high: Float) -> SampledSpectrum {
        let mut ret: SampledSpectrum = SampledSpectrum::default();
        for i in 0..N_SPECTRAL_SAMPLES {
            ret.c[i] = clamp_t(self.c[i], low, high);
        }
        ret
    }
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }
}

impl PartialEq for SampledSpectrum {
    fn eq(&self, rhs: &SampledSpectrum) -> bool {
        self.c.iter().zip(rhs.c.iter()).all(|(a, b)| a == b)
    }
}

impl Add for SampledSpectrum {
    type Output = SampledSpectrum;
    fn add(self, rhs: SampledSpectrum) -> SampledSpectrum {
        let mut ret: SampledSpectrum = self;
        ret += rhs;
        ret
    }
}

impl AddAssign for SampledSpectrum {
    fn add_assign(&mut self, rhs: SampledSpectrum) {
        for i in 0..N_SPECTRAL_SAMPLES {
            self.c[i] += rhs.c[i];
        }
    }
}

impl Sub for SampledSpectrum {
    type Output = SampledSpectrum;
    fn sub(self, rhs: SampledSpectrum) -> SampledSpectrum {
        let mut ret: SampledSpectrum = self;
        for i in 0..N_SPECTRAL_SAMPLES {
            ret.c[i] -= rhs.c[i];
        }
        ret
    }
}

impl Mul for SampledSpectrum {
    type Output = SampledSpectrum;
    fn mul(self, rhs: SampledSpectrum) -> SampledSpectrum {
        let mut ret: SampledSpectrum = self;
        ret *= rhs;
        ret
    }
}

impl Mul<Float> for SampledSpectrum {
    type Output = SampledSpectrum;
    fn mul(self, rhs: Float) -> SampledSpectrum {
        let mut ret: SampledSpectrum = self;
        for v in ret.c.iter_mut() {
            *v *= rhs;
        }
        ret
    }
}

impl MulAssign for SampledSpectrum {
    fn mul_assign(&mut self, rhs: SampledSpectrum) {
        for i in 0..N_SPECTRAL_SAMPLES {
            self.c[i] *= rhs.c[i];
        }
    }
}

impl MulAssign<Float> for SampledSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        for v in self.c.iter_mut() {
            *v *= rhs;
        }
    }
}

impl Div for SampledSpectrum {
    type Output = SampledSpectrum;
    fn div(self, rhs: SampledSpectrum) -> SampledSpectrum {
        let mut ret: SampledSpectrum = self;
        for i in 0..N_SPECTRAL_SAMPLES {
            assert_ne!(rhs.c[i], 0.0 as Float);
            ret.c[i] /= rhs.c[i];
        }
        ret
    }
}

impl Div<Float> for SampledSpectrum {
    type Output = SampledSpectrum;
    fn div(self, rhs: Float) -> SampledSpectrum {
        assert_ne!(rhs, 0.0 as Float);
        let inv: Float = 1.0 as Float / rhs;
        self * inv
    }
}

impl Neg for SampledSpectrum {
    type Output = SampledSpectrum;
    fn neg(self) -> SampledSpectrum {
        self * -1.0 as Float
    }
}

impl Zero for SampledSpectrum {
    fn zero() -> SampledSpectrum {
        SampledSpectrum::new(0.0 as Float)
    }

    fn is_zero(&self) -> bool {
        self.is_black()
    }
}

impl Index<usize> for SampledSpectrum {
    type Output = Float;
    fn index(&self, index: usize) -> &Float {
        &self.c[index]
    }
}

impl IndexMut<usize> for SampledSpectrum {
    fn index_mut(&mut self, index: usize) -> &mut Float {
        &mut self.c[index]
    }
}

impl From<Float> for SampledSpectrum {
    fn from(f: Float) -> Self {
        SampledSpectrum::new(f)
    }
}

/// Calculate RGB coefficients from a XYZ representation.
pub fn xyz_to_rgb(xyz: &[Float; 3], rgb: &mut [Float; 3]) {
    rgb[0] = 3.240479 * xyz[0] - 1.537150 * xyz[1] - 0.498535 * xyz[2];
    rgb[1] = -0.969256 * xyz[0] + 1.875991 * xyz[1] + 0.041556 * xyz[2];
    rgb[2] = 0.055648 * xyz[0] - 0.204043 * xyz[1] + 1.057311 * xyz[2];
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn constant_spectrum_has_unit_luminance() {
        assert!((SampledSpectrum::new(1.0).y() - 1.0).abs() < 1e-4);
        assert!((SampledSpectrum::new(3.0).y() - 3.0).abs() < 1e-3);
        assert_eq!(SampledSpectrum::new(0.0).y(), 0.0);
    }

    #[test]
    fn sampled_pairs_fill_bins() {
        // unsorted on purpose
        let s = SampledSpectrum::from_sampled(&[700.0, 400.0], &[1.0, 1.0]);
        for i in 0..N_SPECTRAL_SAMPLES {
            assert!((s.at_index(i) - 1.0).abs() < 1e-5);
        }
        let ramp = SampledSpectrum::from_sampled(&[400.0, 700.0], &[0.0, 300.0]);
        // first bin covers 400..405 nm, its average is 2.5
        assert!((ramp.at_index(0) - 2.5).abs() < 1e-3);
        assert!(ramp.at_index(59) > ramp.at_index(30));
    }

    #[test]
    fn wavelength_indices() {
        assert_eq!(wavelength_index(400.0), 0);
        assert_eq!(wavelength_index(532.0), 26);
        assert_eq!(wavelength_index(900.0), N_SPECTRAL_SAMPLES - 1);
        assert_eq!(wavelength_index(350.0), 0);
        assert!((bin_wavelength(0) - 402.5).abs() < 1e-4);
    }

    #[test]
    fn exp_of_negative_depth() {
        let tau = SampledSpectrum::new(10.0);
        let tr = (-tau).exp();
        assert!((tr.at_index(7) - (-10.0 as Float).exp()).abs() < 1e-8);
        assert!(!tr.is_black());
        assert!(SampledSpectrum::zero().is_black());
    }
}
