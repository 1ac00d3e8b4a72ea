// std
use std::fs;
use std::path::PathBuf;
// fluo
use rs_fluo::core::api::{parse_file, parse_string, pbrt_init, ApiState, RenderSetup};
use rs_fluo::core::error::FluoError;
use rs_fluo::core::geometry::{Point3f, Ray, Vector3f};
use rs_fluo::core::integrator::VolumeIntegrator;
use rs_fluo::core::pbrt::Float;
use rs_fluo::core::rng::Rng;

const TISSUE: &str = r#"
Volume "homogeneous" "spectrum sigma_a" 0.01 "spectrum sigma_s" 1 "float g" 0
    "point p0" [ -5 -5 -5 ] "point p1" [ 5 5 5 ]
"#;

fn mcfee_scene(number_photons: i32, with_volume: bool) -> String {
    format!(
        r#"
VolumeIntegrator "mcfee" "integer numberphotons" {} "integer seed" 3
WorldBegin
{}
LightSource "laser" "point from" [ 0 0 -4 ] "point to" [ 0 0 0 ] "float radius" 0.5
Shape "bead" "float radius" 1 "string name" "bead"
AttributeBegin
    Translate 0 0 4.5
    Sensor "disk" "float radius" 10 "string name" "top"
AttributeEnd
WorldEnd
"#,
        number_photons,
        if with_volume { TISSUE } else { "" }
    )
}

fn setup_from(text: &str) -> RenderSetup {
    let mut api_state: ApiState = pbrt_init(2);
    parse_string(text, &mut api_state).unwrap();
    assert_eq!(api_state.render_setups.len(), 1);
    api_state.render_setups.remove(0)
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rs_fluo_{}_{}", std::process::id(), name))
}

#[test]
fn mcfee_hits_grow_with_photon_count() {
    let mut hits: Vec<u64> = Vec::new();
    for n in [500, 4000].iter() {
        let mut setup = setup_from(&mcfee_scene(*n, true));
        let report = setup.run(2, &mut |_, _| {}).unwrap().unwrap();
        assert_eq!(report.number_photons, *n as u64);
        assert_eq!(report.sensors.len(), 1);
        assert!(report.to_string().contains("[top] was hit ["));
        hits.push(report.total_hits());
    }
    assert!(hits[0] > 0);
    assert!(hits[1] > hits[0]);
}

#[test]
fn zero_photons_zero_hits() {
    let mut setup = setup_from(&mcfee_scene(0, true));
    let report = setup.run(1, &mut |_, _| {}).unwrap().unwrap();
    assert_eq!(
        report.to_string(),
        "Number of photons used in the simulation [0]\n[top] was hit [0] times\n"
    );
}

#[test]
fn missing_volume_is_not_a_failure() {
    let mut setup = setup_from(&mcfee_scene(100, false));
    match setup.run(1, &mut |_, _| {}) {
        Err(e) => {
            assert!(matches!(e, FluoError::NoVolume));
            assert!(e.is_missing_requirement());
        }
        Ok(_) => panic!("a scene without volume can't be simulated"),
    }
}

#[test]
fn monte_carlo_fluorescence_through_interface() {
    let text = format!(
        r#"
VolumeIntegrator "montecarlofluorescence" "integer numberphotons" 2000 "integer seed" 5
    "point beadposition" [ 0 0 0 ]
WorldBegin
{}
AttributeBegin
    Translate 0 0 6
    Sensor "disk" "float radius" 10 "float eta" 1.33 "string name" "camera"
AttributeEnd
AttributeBegin
    Translate 0 0 4
    Sensor "disk" "float radius" 10 "float eta" 1.33 "string role" "interface"
        "string name" "surface"
AttributeEnd
WorldEnd
"#,
        TISSUE
    );
    let mut setup = setup_from(&text);
    let report = setup.run(4, &mut |_, _| {}).unwrap().unwrap();
    let detected: u64 = report.tally.hit_count(0);
    let crossed: u64 = report.tally.hit_count(1);
    assert!(crossed > 0);
    assert!(detected > 0 && detected <= crossed);
}

#[test]
fn homogeneous_slab_transmittance() {
    let text = r#"
VolumeIntegrator "single" "float stepsize" 0.1
WorldBegin
Volume "homogeneous" "spectrum sigma_a" 1 "spectrum sigma_s" 0
    "point p0" [ -5 -5 0 ] "point p1" [ 5 5 10 ]
WorldEnd
"#;
    let setup = setup_from(text);
    assert!(matches!(setup.integrator, VolumeIntegrator::Single(_)));
    let mut rng: Rng = Rng::new();
    let ray: Ray = Ray::new(Point3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 0.0, 1.0));
    let expected: Float = (-10.0 as Float).exp();
    for _ in 0..4 {
        let tr = setup.integrator.transmittance(&setup.scene, &ray, None, &mut rng);
        assert!((tr.y() - expected).abs() < 1e-2 * expected);
    }
}

#[test]
fn render_writes_image() {
    let image: PathBuf = temp_path("render.png");
    let text = format!(
        r#"
Film "image" "integer xresolution" 8 "integer yresolution" 8 "string filename" "{}"
LookAt 0 0 -20  0 0 0  0 1 0
Camera "orthographic" "float screenwindow" [ -6 6 -6 6 ]
VolumeIntegrator "single" "float stepsize" 0.5
WorldBegin
Volume "homogeneous" "spectrum sigma_a" 0.05 "spectrum sigma_s" 0.2
    "point p0" [ -5 -5 -5 ] "point p1" [ 5 5 5 ]
LightSource "point" "point from" [ 0 0 -8 ] "spectrum I" 50
WorldEnd
"#,
        image.display()
    );
    let mut setup = setup_from(&text);
    let mut calls: u64 = 0;
    let report = setup.run(2, &mut |_, _| calls += 1).unwrap();
    assert!(report.is_none());
    // one call per 16x16 tile
    assert_eq!(calls, 1);
    assert!(image.exists());
    let _ = fs::remove_file(&image);
}

#[test]
fn include_is_relative_to_scene_file() {
    let dir: PathBuf = temp_path("include");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("world.fluo"),
        format!("WorldBegin\n{}\nWorldEnd\n", TISSUE),
    )
    .unwrap();
    fs::write(
        dir.join("main.fluo"),
        "# main file\nVolumeIntegrator \"backward\" \"string mode\" \"single\"\nInclude \"world.fluo\"\n",
    )
    .unwrap();
    let mut api_state: ApiState = pbrt_init(1);
    parse_file(&dir.join("main.fluo"), &mut api_state).unwrap();
    assert_eq!(api_state.render_setups.len(), 1);
    assert!(matches!(
        api_state.render_setups[0].integrator,
        VolumeIntegrator::Backward(_)
    ));
    assert!(api_state.render_setups[0].scene.volume_region.is_some());
    // missing files are I/O errors
    let mut api_state: ApiState = pbrt_init(1);
    assert!(matches!(
        parse_file(&dir.join("missing.fluo"), &mut api_state),
        Err(FluoError::Io(_))
    ));
    let _ = fs::remove_dir_all(&dir);
}
