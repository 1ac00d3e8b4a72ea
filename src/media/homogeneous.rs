// fluo
use crate::core::geometry::{Bounds3f, Point3f};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::spectrum::SampledSpectrum;
use crate::core::transform::Transform;
use crate::core::volume::{Coefficients, RegionProperties};
use crate::media::fluorescence_from_params;

// see homogeneous.h

/// Constant coefficients scaled by a density multiplier inside an
/// axis-aligned box.
pub struct HomogeneousRegion {
    pub properties: RegionProperties,
    pub density: Float,
}

impl HomogeneousRegion {
    pub fn new(properties: RegionProperties, density: Float) -> Self {
        HomogeneousRegion {
            properties,
            density: density.max(0.0 as Float),
        }
    }
}

fn extent_from_params(params: &ParamSet) -> Bounds3f {
    let p0: Point3f = params.find_one_point3f("p0", Point3f::new(0.0, 0.0, 0.0));
    let p1: Point3f = params.find_one_point3f("p1", Point3f::new(1.0, 1.0, 1.0));
    Bounds3f::new(p0, p1)
}

pub fn create_homogeneous_region(volume_to_world: &Transform, params: &ParamSet) -> HomogeneousRegion {
    // initialize common volume region parameters
    let zero: Spectrum = SampledSpectrum::new(0.0);
    let sigma_a: Spectrum = params.find_one_spectrum("sigma_a", zero);
    let sigma_s: Spectrum = params.find_one_spectrum("sigma_s", zero);
    let g: Float = params.find_one_float("g", 0.0);
    let density: Float = params.find_one_float("density", 1.0);
    let le: Spectrum = params.find_one_spectrum("Le", zero);
    let coefficients: Coefficients = Coefficients::new(sigma_a, sigma_s, g);
    let mut properties: RegionProperties = RegionProperties::new(
        volume_to_world,
        extent_from_params(params),
        coefficients,
        coefficients,
        le,
    );
    properties.fluorescence = fluorescence_from_params(params);
    HomogeneousRegion::new(properties, density)
}

/// A tissue layer has its own coefficients and phase asymmetry for
/// excitation and emission photons.
pub fn create_tissue_layer(volume_to_world: &Transform, params: &ParamSet) -> HomogeneousRegion {
    let zero: Spectrum = SampledSpectrum::new(0.0);
    let excitation: Coefficients = Coefficients::new(
        params.find_one_spectrum("sigma_a_ex", zero),
        params.find_one_spectrum("sigma_s_ex", zero),
        params.find_one_float("g_ex", 0.0),
    );
    let emission: Coefficients = Coefficients::new(
        params.find_one_spectrum("sigma_a_em", zero),
        params.find_one_spectrum("sigma_s_em", zero),
        params.find_one_float("g_em", 0.0),
    );
    let density: Float = params.find_one_float("density", 1.0);
    let le: Spectrum = params.find_one_spectrum("Le", zero);
    let mut properties: RegionProperties = RegionProperties::new(
        volume_to_world,
        extent_from_params(params),
        excitation,
        emission,
        le,
    );
    properties.fluorescence = fluorescence_from_params(params);
    HomogeneousRegion::new(properties, density)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::medium::PhotonRole;
    use crate::core::volume::VolumeRegion;

    #[test]
    fn tissue_layer_keeps_roles_apart() {
        let mut ps = ParamSet::default();
        ps.add_float("sigma_a_ex", 0.2);
        ps.add_float("sigma_s_ex", 0.8);
        ps.add_float("sigma_a_em", 0.05);
        ps.add_float("sigma_s_em", 0.45);
        ps.add_float("g_ex", 0.9);
        ps.add_float("g_em", 0.7);
        ps.add_point3fs("p0", &[-1.0, -1.0, -1.0]);
        let vr = VolumeRegion::Homogeneous(create_tissue_layer(&Transform::default(), &ps));
        let p = Point3f::new(0.5, 0.5, 0.5);
        assert!((vr.sigma_t(&p, PhotonRole::Excitation).y() - 1.0).abs() < 1e-4);
        assert!((vr.sigma_t(&p, PhotonRole::Emission).y() - 0.5).abs() < 1e-4);
        assert_eq!(vr.g(PhotonRole::Emission), 0.7);
        assert!(vr.inside(&Point3f::new(-0.5, 0.0, 0.0)));
        assert!(ps.unused().is_empty());
    }

    #[test]
    fn density_scales_coefficients() {
        let mut ps = ParamSet::default();
        ps.add_float("sigma_s", 1.0);
        ps.add_float("density", 3.0);
        ps.add_float("g", 0.3);
        let vr = VolumeRegion::Homogeneous(create_homogeneous_region(
            &Transform::translate(&crate::core::geometry::Vector3f::new(10.0, 0.0, 0.0)),
            &ps,
        ));
        let p = Point3f::new(10.5, 0.5, 0.5);
        assert!((vr.sigma_s(&p, PhotonRole::Emission).y() - 3.0).abs() < 1e-3);
        assert_eq!(vr.photon_density(&p), 3.0);
        assert_eq!(vr.photon_density(&Point3f::new(0.5, 0.5, 0.5)), 0.0);
        assert_eq!(vr.world_bound().p_min, Point3f::new(10.0, 0.0, 0.0));
    }
}
