//! Bundle up parameters and their values in a generic way.
//!
//! Every scene statement carries a **ParamSet**. Factories look up the
//! values they understand (with defaults); anything supplied but never
//! looked up is reported by **report_unused()**.

// std
use std::cell::Cell;
// others
use log::warn;
// fluo
use crate::core::geometry::{Normal3f, Point3f, Vector3f};
use crate::core::pbrt::{Float, Spectrum};
use crate::core::spectrum::SampledSpectrum;

// see paramset.h

#[derive(Debug, Clone)]
pub struct ParamSetItem<T> {
    pub name: String,
    pub values: Vec<T>,
    pub looked_up: Cell<bool>,
}

impl<T> ParamSetItem<T> {
    pub fn new(name: String, values: Vec<T>) -> Self {
        ParamSetItem {
            name,
            values,
            looked_up: Cell::new(false),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParamSet {
    pub bools: Vec<ParamSetItem<bool>>,
    pub ints: Vec<ParamSetItem<i32>>,
    pub floats: Vec<ParamSetItem<Float>>,
    pub point3fs: Vec<ParamSetItem<Point3f>>,
    pub vector3fs: Vec<ParamSetItem<Vector3f>>,
    pub normals: Vec<ParamSetItem<Normal3f>>,
    pub spectra: Vec<ParamSetItem<Spectrum>>,
    pub strings: Vec<ParamSetItem<String>>,
}

fn triples(values: &[Float]) -> Vec<[Float; 3]> {
    values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

impl ParamSet {
    pub fn add_floats(&mut self, name: &str, values: Vec<Float>) {
        self.floats.push(ParamSetItem::new(name.to_string(), values));
    }
    pub fn add_float(&mut self, name: &str, value: Float) {
        self.add_floats(name, vec![value]);
    }
    pub fn add_ints(&mut self, name: &str, values: Vec<i32>) {
        self.ints.push(ParamSetItem::new(name.to_string(), values));
    }
    pub fn add_int(&mut self, name: &str, value: i32) {
        self.add_ints(name, vec![value]);
    }
    pub fn add_bools(&mut self, name: &str, values: Vec<bool>) {
        self.bools.push(ParamSetItem::new(name.to_string(), values));
    }
    pub fn add_bool(&mut self, name: &str, value: bool) {
        self.add_bools(name, vec![value]);
    }
    pub fn add_strings(&mut self, name: &str, values: Vec<String>) {
        self.strings.push(ParamSetItem::new(name.to_string(), values));
    }
    pub fn add_string(&mut self, name: &str, value: &str) {
        self.add_strings(name, vec![value.to_string()]);
    }
    /// Coordinates come in triples, a trailing partial triple is dropped.
    pub fn add_point3fs(&mut self, name: &str, values: &[Float]) {
        let points: Vec<Point3f> = triples(values)
            .iter()
            .map(|c| Point3f::new(c[0], c[1], c[2]))
            .collect();
        self.point3fs.push(ParamSetItem::new(name.to_string(), points));
    }
    pub fn add_point3f(&mut self, name: &str, value: Point3f) {
        self.point3fs
            .push(ParamSetItem::new(name.to_string(), vec![value]));
    }
    pub fn add_vector3fs(&mut self, name: &str, values: &[Float]) {
        let vectors: Vec<Vector3f> = triples(values)
            .iter()
            .map(|c| Vector3f::new(c[0], c[1], c[2]))
            .collect();
        self.vector3fs
            .push(ParamSetItem::new(name.to_string(), vectors));
    }
    pub fn add_normal3fs(&mut self, name: &str, values: &[Float]) {
        let normals: Vec<Normal3f> = triples(values)
            .iter()
            .map(|c| Normal3f {
                x: c[0],
                y: c[1],
                z: c[2],
            })
            .collect();
        self.normals.push(ParamSetItem::new(name.to_string(), normals));
    }
    /// A single value is a constant spectrum, otherwise the values are
    /// (wavelength, value) pairs.
    pub fn add_spectrum(&mut self, name: &str, values: &[Float]) {
        let s: Spectrum = if values.len() == 1 {
            SampledSpectrum::new(values[0])
        } else {
            if values.len() % 2 != 0 {
                warn!(
                    "Discarding extra value for spectrum parameter {:?}, {} values given",
                    name,
                    values.len()
                );
            }
            let lambda: Vec<Float> = values.iter().step_by(2).cloned().collect();
            let v: Vec<Float> = values.iter().skip(1).step_by(2).cloned().collect();
            SampledSpectrum::from_sampled(&lambda[..v.len()], &v)
        };
        self.add_spectrum_value(name, s);
    }
    pub fn add_spectrum_value(&mut self, name: &str, value: Spectrum) {
        self.spectra
            .push(ParamSetItem::new(name.to_string(), vec![value]));
    }
    pub fn find_one_float(&self, name: &str, d: Float) -> Float {
        lookup_one(&self.floats, name, d)
    }
    pub fn find_one_int(&self, name: &str, d: i32) -> i32 {
        lookup_one(&self.ints, name, d)
    }
    pub fn find_one_bool(&self, name: &str, d: bool) -> bool {
        lookup_one(&self.bools, name, d)
    }
    pub fn find_one_point3f(&self, name: &str, d: Point3f) -> Point3f {
        lookup_one(&self.point3fs, name, d)
    }
    /// Spectra also accept a single float (constant spectrum).
    pub fn find_one_spectrum(&self, name: &str, d: Spectrum) -> Spectrum {
        if self.spectra.iter().any(|v| v.name == name) {
            return lookup_one(&self.spectra, name, d);
        }
        let f: Float = self.find_one_float(name, Float::NAN);
        if f.is_nan() {
            d
        } else {
            SampledSpectrum::new(f)
        }
    }
    pub fn find_one_string(&self, name: &str, d: &str) -> String {
        lookup_one(&self.strings, name, d.to_string())
    }
    pub fn find_float(&self, name: &str) -> Option<Vec<Float>> {
        lookup_all(&self.floats, name)
    }
    /// Names of parameters that were given but never looked up.
    pub fn unused(&self) -> Vec<String> {
        fn collect<T>(items: &[ParamSetItem<T>], out: &mut Vec<String>) {
            for item in items {
                if !item.looked_up.get() {
                    out.push(item.name.clone());
                }
            }
        }
        let mut names: Vec<String> = Vec::new();
        collect(&self.bools, &mut names);
        collect(&self.ints, &mut names);
        collect(&self.floats, &mut names);
        collect(&self.point3fs, &mut names);
        collect(&self.vector3fs, &mut names);
        collect(&self.normals, &mut names);
        collect(&self.spectra, &mut names);
        collect(&self.strings, &mut names);
        names
    }
    pub fn report_unused(&self, statement: &str) {
        for name in self.unused() {
            warn!("Parameter {:?} not used by {}", name, statement);
        }
    }
}

/// Replaces a macro on the C++ side.
pub fn lookup_one<T>(vec: &[ParamSetItem<T>], name: &str, d: T) -> T
where
    T: Clone,
{
    for v in vec {
        if v.name == name && v.values.len() == 1_usize {
            v.looked_up.set(true);
            return v.values[0].clone();
        }
    }
    d
}

fn lookup_all<T>(vec: &[ParamSetItem<T>], name: &str) -> Option<Vec<T>>
where
    T: Clone,
{
    for v in vec {
        if v.name == name {
            v.looked_up.set(true);
            return Some(v.values.clone());
        }
    }
    None
}
