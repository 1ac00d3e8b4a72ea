//! A **Sample** holds the values for one camera ray. Integrators
//! register the 1D sample slots they need once (see
//! **VolumeIntegrator::request_samples()**) and read them back by
//! offset for every ray.

// others
use smallvec::SmallVec;
// fluo
use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::rng::Rng;

// see sampler.h

#[derive(Debug, Default, Clone)]
pub struct Sample {
    /// raster position of the camera ray
    pub image: Point2f,
    pub one_d: SmallVec<[SmallVec<[Float; 1]>; 4]>,
}

impl Sample {
    pub fn new() -> Self {
        Sample::default()
    }
    /// Register an array of `n` one dimensional values and return its
    /// offset.
    pub fn add_1d(&mut self, n: usize) -> usize {
        self.one_d.push(SmallVec::from_elem(0.0 as Float, n));
        self.one_d.len() - 1
    }
    /// First value of the slot registered at `offset`.
    pub fn get_1d(&self, offset: usize) -> Option<Float> {
        self.one_d.get(offset).and_then(|v| v.first().cloned())
    }
    /// Draw fresh values for a new camera ray, stratified over the
    /// entries of each slot.
    pub fn fill(&mut self, image: Point2f, rng: &mut Rng) {
        self.image = image;
        for slot in self.one_d.iter_mut() {
            let n: Float = slot.len() as Float;
            for (i, v) in slot.iter_mut().enumerate() {
                *v = ((i as Float + rng.uniform_float()) / n).min(crate::core::rng::FLOAT_ONE_MINUS_EPSILON);
            }
        }
    }
}
