//! Participating media. A **VolumeRegion** answers the questions every
//! volume integrator asks: where the region is, how much light it
//! absorbs, scatters and emits at a point, how the optical depth
//! accumulates along a ray, and how photons pick free-flight distances
//! and new directions inside it.
//!
//! - HomogeneousRegion (also used for the tissue layer)
//! - GridRegion
//!
//! Coefficients are zero outside the region's extent.

// others
use log::warn;
// fluo
use crate::core::geometry::{pnt3_distancef, Bounds3f, Point3f, Ray, Vector3f};
use crate::core::medium::{phase_hg, sample_hg, DistanceSample, PhotonRole};
use crate::core::pbrt::{Float, Spectrum};
use crate::core::spectrum::SampledSpectrum;
use crate::core::transform::Transform;
use crate::media::grid::GridRegion;
use crate::media::homogeneous::HomogeneousRegion;

// see volume.h

/// Optical coefficients seen by photons of one role.
#[derive(Debug, Copy, Clone)]
pub struct Coefficients {
    pub sigma_a: Spectrum,
    pub sigma_s: Spectrum,
    pub g: Float,
}

impl Coefficients {
    /// Negative coefficients are clamped to zero.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, g: Float) -> Self {
        if sigma_a.c.iter().chain(sigma_s.c.iter()).any(|v| *v < 0.0) {
            warn!("Negative absorption or scattering coefficient clamped to zero");
        }
        Coefficients {
            sigma_a: sigma_a.clamp(0.0, Float::INFINITY),
            sigma_s: sigma_s.clamp(0.0, Float::INFINITY),
            g,
        }
    }
    pub fn sigma_t(&self) -> Spectrum {
        self.sigma_a + self.sigma_s
    }
}

/// Excitation/emission profiles of a fluorescent region.
#[derive(Debug, Copy, Clone)]
pub struct Fluorescence {
    pub fex: Spectrum,
    pub fem: Spectrum,
    pub quantum_yield: Float,
    /// optically cleared, i.e. scattering can be ignored
    pub cleared: bool,
}

impl Default for Fluorescence {
    fn default() -> Self {
        Fluorescence {
            fex: SampledSpectrum::new(0.0),
            fem: SampledSpectrum::new(0.0),
            quantum_yield: 1.0,
            cleared: true,
        }
    }
}

/// Everything a region has besides its density field.
#[derive(Debug, Copy, Clone)]
pub struct RegionProperties {
    pub world_to_volume: Transform,
    pub volume_to_world: Transform,
    pub extent: Bounds3f,
    pub excitation: Coefficients,
    pub emission: Coefficients,
    pub le: Spectrum,
    pub fluorescence: Fluorescence,
}

impl RegionProperties {
    pub fn new(
        volume_to_world: &Transform,
        extent: Bounds3f,
        excitation: Coefficients,
        emission: Coefficients,
        le: Spectrum,
    ) -> Self {
        RegionProperties {
            world_to_volume: Transform::inverse(volume_to_world),
            volume_to_world: *volume_to_world,
            extent,
            excitation,
            emission,
            le,
            fluorescence: Fluorescence::default(),
        }
    }
    pub fn coefficients(&self, role: PhotonRole) -> &Coefficients {
        match role {
            PhotonRole::Excitation => &self.excitation,
            PhotonRole::Emission => &self.emission,
        }
    }
}

pub enum VolumeRegion {
    Homogeneous(HomogeneousRegion),
    Grid(GridRegion),
}

impl VolumeRegion {
    pub fn properties(&self) -> &RegionProperties {
        match self {
            VolumeRegion::Homogeneous(region) => &region.properties,
            VolumeRegion::Grid(region) => &region.properties,
        }
    }
    /// Density multiplier at a point in the region's local frame.
    fn local_density(&self, p_obj: &Point3f) -> Float {
        match self {
            VolumeRegion::Homogeneous(region) => region.density,
            VolumeRegion::Grid(region) => region.density(p_obj),
        }
    }
    /// Density at a world space point, zero outside the extent.
    pub fn density(&self, p: &Point3f) -> Float {
        let props: &RegionProperties = self.properties();
        let p_obj: Point3f = props.world_to_volume.transform_point(p);
        if !props.extent.inside(&p_obj) {
            return 0.0;
        }
        self.local_density(&p_obj)
    }
    /// Is the world space point inside the region's extent?
    pub fn inside(&self, p: &Point3f) -> bool {
        let props: &RegionProperties = self.properties();
        props
            .extent
            .inside(&props.world_to_volume.transform_point(p))
    }
    pub fn world_bound(&self) -> Bounds3f {
        let props: &RegionProperties = self.properties();
        props.volume_to_world.transform_bounds(&props.extent)
    }
    /// Parametric range `[t0, t1]` of the ray inside the extent.
    pub fn intersect_p(&self, ray: &Ray) -> Option<(Float, Float)> {
        let props: &RegionProperties = self.properties();
        let r: Ray = props.world_to_volume.transform_ray(ray);
        props.extent.intersect_b(&r)
    }
    pub fn sigma_a(&self, p: &Point3f, role: PhotonRole) -> Spectrum {
        self.properties().coefficients(role).sigma_a * self.density(p)
    }
    pub fn sigma_s(&self, p: &Point3f, role: PhotonRole) -> Spectrum {
        self.properties().coefficients(role).sigma_s * self.density(p)
    }
    pub fn sigma_t(&self, p: &Point3f, role: PhotonRole) -> Spectrum {
        self.properties().coefficients(role).sigma_t() * self.density(p)
    }
    pub fn lve(&self, p: &Point3f) -> Spectrum {
        self.properties().le * self.density(p)
    }
    pub fn g(&self, role: PhotonRole) -> Float {
        self.properties().coefficients(role).g
    }
    /// Phase function value, zero outside the extent.
    pub fn phase(&self, p: &Point3f, w: &Vector3f, wp: &Vector3f, role: PhotonRole) -> Float {
        if !self.inside(p) {
            return 0.0;
        }
        phase_hg(w, wp, self.g(role))
    }
    /// Fluorophore absorption at the excitation wavelengths.
    pub fn mu(&self, p: &Point3f) -> Spectrum {
        self.sigma_a(p, PhotonRole::Excitation)
    }
    pub fn fluorescence(&self) -> &Fluorescence {
        &self.properties().fluorescence
    }
    pub fn has_non_cleared_fluorescent_volumes(&self) -> bool {
        !self.fluorescence().cleared
    }
    /// Optical depth along the ray segment `[t_min, t_max]`. Homogeneous
    /// regions integrate analytically, grids march with `step` starting
    /// at `offset * step`.
    pub fn tau(&self, ray: &Ray, step: Float, offset: Float) -> Spectrum {
        match self {
            VolumeRegion::Homogeneous(region) => {
                if let Some((t0, t1)) = self.intersect_p(ray) {
                    let sigma_t: Spectrum = region.properties.excitation.sigma_t() * region.density;
                    sigma_t * pnt3_distancef(&ray.position(t0), &ray.position(t1))
                } else {
                    SampledSpectrum::new(0.0)
                }
            }
            VolumeRegion::Grid(_) => {
                let length: Float = ray.d.length();
                if length == 0.0 as Float || step <= 0.0 as Float {
                    return SampledSpectrum::new(0.0);
                }
                let rn: Ray = Ray::segment(
                    ray.o,
                    ray.d / length,
                    ray.t_min * length,
                    ray.t_max * length,
                    ray.time,
                    ray.depth,
                );
                let mut tau: Spectrum = SampledSpectrum::new(0.0);
                if let Some((t0, t1)) = self.intersect_p(&rn) {
                    let mut t: Float = t0 + offset * step;
                    while t < t1 {
                        tau += self.sigma_t(&rn.position(t), PhotonRole::Excitation);
                        t += step;
                    }
                }
                tau * step
            }
        }
    }
    /// Free-flight distance along `ray` for a photon of the given role.
    /// `None` if the medium does not attenuate at the ray origin.
    pub fn sample_distance(&self, ray: &Ray, u: Float, role: PhotonRole) -> Option<DistanceSample> {
        let sigma_t_origin: Float = self.sigma_t(&ray.o, role).y();
        if sigma_t_origin <= 0.0 as Float {
            return None;
        }
        let t: Float = -(1.0 as Float - u).ln() / sigma_t_origin;
        let t_dist: Float = ray.t_min + t;
        let p: Point3f = ray.position(t_dist);
        let sigma_t: Spectrum = self.sigma_t(&p, role);
        let pdf: Float = (sigma_t * (-sigma_t * t).exp()).y();
        Some(DistanceSample {
            t: t_dist,
            p,
            pdf,
            inside: self.inside(&p),
        })
    }
    /// New direction around `wi` drawn from the phase function, `None`
    /// outside the extent.
    pub fn sample_direction(
        &self,
        p: &Point3f,
        wi: &Vector3f,
        u1: Float,
        u2: Float,
        role: PhotonRole,
    ) -> Option<(Vector3f, Float)> {
        if !self.inside(p) {
            return None;
        }
        Some(sample_hg(wi, self.g(role), u1, u2))
    }
    /// Emitted photon density used by the backward estimator.
    pub fn photon_density(&self, p: &Point3f) -> Float {
        self.density(p)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::rng::Rng;

    fn slab(sigma_a: Float, sigma_s: Float) -> VolumeRegion {
        let c = Coefficients::new(
            SampledSpectrum::new(sigma_a),
            SampledSpectrum::new(sigma_s),
            0.0,
        );
        VolumeRegion::Homogeneous(HomogeneousRegion::new(
            RegionProperties::new(
                &Transform::default(),
                Bounds3f::new(Point3f::new(-5.0, -5.0, 0.0), Point3f::new(5.0, 5.0, 10.0)),
                c,
                c,
                SampledSpectrum::new(0.0),
            ),
            1.0,
        ))
    }

    #[test]
    fn coefficients_vanish_outside() {
        let vr = slab(0.1, 0.9);
        let inside = Point3f::new(0.0, 0.0, 5.0);
        let outside = Point3f::new(0.0, 0.0, 11.0);
        assert!((vr.sigma_t(&inside, PhotonRole::Excitation).y() - 1.0).abs() < 1e-4);
        assert!(vr.sigma_t(&outside, PhotonRole::Excitation).is_black());
        assert_eq!(vr.photon_density(&outside), 0.0);
        assert_eq!(
            vr.phase(&outside, &Vector3f::new(0.0, 0.0, 1.0), &Vector3f::new(0.0, 0.0, 1.0), PhotonRole::Excitation),
            0.0
        );
    }

    #[test]
    fn homogeneous_optical_depth() {
        let vr = slab(0.1, 0.9);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let tau = vr.tau(&ray, 1.0, 0.5);
        assert!((tau.at_index(0) - 10.0).abs() < 1e-3);
        // a segment spanning half of the slab
        let seg = Ray::segment(
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 5.0),
            0.0,
            1.0,
            0.0,
            0,
        );
        assert!((vr.tau(&seg, 1.0, 0.5).at_index(30) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn negative_coefficients_are_clamped() {
        let c = Coefficients::new(SampledSpectrum::new(-1.0), SampledSpectrum::new(0.5), 0.0);
        assert!(c.sigma_a.is_black());
        assert!(c.sigma_t().c.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn distance_sampling_follows_extinction() {
        let vr = slab(0.1, 0.9);
        let mut rng = Rng::new();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let n = 20_000;
        let mut mean: f64 = 0.0;
        for _ in 0..n {
            let ds = vr
                .sample_distance(&ray, rng.uniform_float(), PhotonRole::Excitation)
                .unwrap();
            assert_eq!(ds.inside, ds.t <= 10.0);
            mean += ds.t as f64;
        }
        // mean free path is 1 / sigma_t
        assert!((mean / n as f64 - 1.0).abs() < 0.05);
        let empty = slab(0.0, 0.0);
        assert!(empty.sample_distance(&ray, 0.5, PhotonRole::Excitation).is_none());
    }
}
