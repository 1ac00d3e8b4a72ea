//! Scrambled low-discrepancy sequences. The single scattering
//! estimators draw one light selection value and one light sample per
//! ray-marching step from these, shuffled so neighbouring steps stay
//! decorrelated.

// others
use hexf::hexf32;
// fluo
use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::rng::FLOAT_ONE_MINUS_EPSILON;
use crate::core::sampling::shuffle;

// see montecarlo.h

/// Radical inverse in base 2 of `n`, XOR-scrambled.
pub fn van_der_corput(n: u32, scramble: u32) -> Float {
    let bits: u32 = n.reverse_bits() ^ scramble;
    (bits as Float * hexf32!("0x1.0p-32")).min(FLOAT_ONE_MINUS_EPSILON)
}

/// Second dimension of the (0,2)-sequence.
pub fn sobol2(n: u32, scramble: u32) -> Float {
    let mut n: u32 = n;
    let mut s: u32 = scramble;
    let mut v: u32 = 1_u32 << 31;
    while n != 0 {
        if n & 0x1 != 0 {
            s ^= v;
        }
        n >>= 1;
        v ^= v >> 1;
    }
    (s as Float * hexf32!("0x1.0p-32")).min(FLOAT_ONE_MINUS_EPSILON)
}

/// One point of the scrambled (0,2)-sequence.
pub fn sample02(n: u32, scramble: [u32; 2]) -> Point2f {
    Point2f {
        x: van_der_corput(n, scramble[0]),
        y: sobol2(n, scramble[1]),
    }
}

/// Fill `samples` with `n_pixel * n_samples` values, shuffled within
/// each group of `n_samples` and then group-wise.
pub fn ld_shuffle_scrambled_1d(n_samples: usize, n_pixel: usize, samples: &mut [Float], rng: &mut Rng) {
    let scramble: u32 = rng.uniform_uint32();
    let total: usize = n_samples * n_pixel;
    for (i, s) in samples.iter_mut().take(total).enumerate() {
        *s = van_der_corput(i as u32, scramble);
    }
    for i in 0..n_pixel {
        shuffle(&mut samples[i * n_samples..], n_samples, 1, rng);
    }
    shuffle(samples, n_pixel, n_samples, rng);
}

/// Two dimensional variant of **ld_shuffle_scrambled_1d()**.
pub fn ld_shuffle_scrambled_2d(n_samples: usize, n_pixel: usize, samples: &mut [Point2f], rng: &mut Rng) {
    let scramble: [u32; 2] = [rng.uniform_uint32(), rng.uniform_uint32()];
    let total: usize = n_samples * n_pixel;
    for (i, s) in samples.iter_mut().take(total).enumerate() {
        *s = sample02(i as u32, scramble);
    }
    for i in 0..n_pixel {
        shuffle(&mut samples[i * n_samples..], n_samples, 1, rng);
    }
    shuffle(samples, n_pixel, n_samples, rng);
}
