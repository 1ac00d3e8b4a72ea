//! Statements of the scene description are executed one after the
//! other against an **ApiState**. Transformation statements change
//! the current transform, object statements (`Volume`, `LightSource`,
//! `Shape`, `Sensor`) create objects with it, and `WorldEnd` turns
//! everything collected so far into a **RenderSetup**.

// std
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
// others
use log::{info, warn};
// fluo
use crate::core::camera::{create_orthographic_camera, OrthographicCamera};
use crate::core::error::{FluoError, Result};
use crate::core::film::{create_film, Film};
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::integrator::{Preprocessed, SimulationReport, VolumeIntegrator};
use crate::core::light::Light;
use crate::core::paramset::ParamSet;
use crate::core::parser::{parse_scene, Statement};
use crate::core::pbrt::Float;
use crate::core::scene::Scene;
use crate::core::sensor::{create_disk_sensor, Sensor};
use crate::core::transform::{Matrix4x4, Transform};
use crate::core::volume::VolumeRegion;
use crate::integrators::{make_integrator, render};
use crate::lights::make_light;
use crate::media::make_volume_region;
use crate::shapes::sphere::{create_bead, Bead};

// see api.cpp

/// Everything given before `WorldBegin` plus the objects of the world
/// block.
pub struct RenderOptions {
    pub camera_name: String,
    pub camera_params: ParamSet,
    pub camera_to_world: Transform,
    pub film_name: String,
    pub film_params: ParamSet,
    pub integrator_name: String,
    pub integrator_params: ParamSet,
    pub volume_region: Option<VolumeRegion>,
    pub lights: Vec<Light>,
    pub beads: Vec<Bead>,
    pub sensors: Vec<Sensor>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            camera_name: String::from("orthographic"),
            camera_params: ParamSet::default(),
            camera_to_world: Transform::default(),
            film_name: String::from("image"),
            film_params: ParamSet::default(),
            integrator_name: String::from("single"),
            integrator_params: ParamSet::default(),
            volume_region: None,
            lights: Vec::new(),
            beads: Vec::new(),
            sensors: Vec::new(),
        }
    }
}

/// A finished world block, ready to be simulated or rendered.
pub struct RenderSetup {
    pub scene: Scene,
    pub integrator: VolumeIntegrator,
    pub camera: OrthographicCamera,
}

impl RenderSetup {
    /// Preprocess the integrator and render if it didn't run a photon
    /// simulation instead. The simulation report is returned to the
    /// caller.
    pub fn run(
        &mut self,
        num_threads: u8,
        progress: &mut dyn FnMut(u64, u64),
    ) -> Result<Option<SimulationReport>> {
        match self.integrator.preprocess(&self.scene, num_threads, progress)? {
            Preprocessed::Simulated(report) => Ok(Some(report)),
            Preprocessed::Ready => {
                render(&self.scene, &self.camera, &mut self.integrator, num_threads, progress)?;
                Ok(None)
            }
        }
    }
}

pub struct ApiState {
    cur_transform: Transform,
    pushed_transforms: Vec<Transform>,
    named_coordinate_systems: HashMap<String, Transform>,
    in_world: bool,
    render_options: RenderOptions,
    /// directory of the top level scene file, `Include` is relative to it
    pub search_directory: Option<PathBuf>,
    pub number_of_threads: u8,
    pub render_setups: Vec<RenderSetup>,
}

pub fn pbrt_init(number_of_threads: u8) -> ApiState {
    ApiState {
        cur_transform: Transform::default(),
        pushed_transforms: Vec::new(),
        named_coordinate_systems: HashMap::new(),
        in_world: false,
        render_options: RenderOptions::default(),
        search_directory: None,
        number_of_threads,
        render_setups: Vec::new(),
    }
}

impl ApiState {
    pub fn current_transform(&self) -> &Transform {
        &self.cur_transform
    }
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }
    fn verify_options(&self, statement: &str) -> bool {
        if self.in_world {
            warn!(
                "Options cannot be set inside world block; {:?} not allowed. Ignoring.",
                statement
            );
            return false;
        }
        true
    }
    fn verify_world(&self, statement: &str) -> bool {
        if !self.in_world {
            warn!(
                "Scene description must be inside world block; {:?} not allowed. Ignoring.",
                statement
            );
            return false;
        }
        true
    }
}

pub fn pbrt_identity(api_state: &mut ApiState) {
    api_state.cur_transform = Transform::default();
}

pub fn pbrt_translate(api_state: &mut ApiState, dx: Float, dy: Float, dz: Float) {
    api_state.cur_transform =
        api_state.cur_transform * Transform::translate(&Vector3f::new(dx, dy, dz));
}

pub fn pbrt_scale(api_state: &mut ApiState, sx: Float, sy: Float, sz: Float) {
    api_state.cur_transform = api_state.cur_transform * Transform::scale(sx, sy, sz);
}

pub fn pbrt_rotate(api_state: &mut ApiState, angle: Float, dx: Float, dy: Float, dz: Float) {
    api_state.cur_transform =
        api_state.cur_transform * Transform::rotate(angle, &Vector3f::new(dx, dy, dz));
}

pub fn pbrt_look_at(api_state: &mut ApiState, eye: Point3f, look: Point3f, up: Vector3f) {
    api_state.cur_transform = api_state.cur_transform * Transform::look_at(&eye, &look, &up);
}

/// Scene files store matrices column by column.
fn matrix_from_columns(tr: &[Float; 16]) -> Result<Transform> {
    let m: Matrix4x4 = Matrix4x4::transpose(&Matrix4x4::from_row_major(tr));
    Transform::from_matrix(m)
        .ok_or_else(|| FluoError::InvalidParameter("singular transformation matrix".to_string()))
}

pub fn pbrt_transform(api_state: &mut ApiState, tr: &[Float; 16]) -> Result<()> {
    api_state.cur_transform = matrix_from_columns(tr)?;
    Ok(())
}

pub fn pbrt_concat_transform(api_state: &mut ApiState, tr: &[Float; 16]) -> Result<()> {
    api_state.cur_transform = api_state.cur_transform * matrix_from_columns(tr)?;
    Ok(())
}

pub fn pbrt_coordinate_system(api_state: &mut ApiState, name: &str) {
    api_state
        .named_coordinate_systems
        .insert(name.to_string(), api_state.cur_transform);
}

pub fn pbrt_coord_sys_transform(api_state: &mut ApiState, name: &str) {
    match api_state.named_coordinate_systems.get(name) {
        Some(t) => api_state.cur_transform = *t,
        None => warn!("Couldn't find named coordinate system {:?}", name),
    }
}

pub fn pbrt_camera(api_state: &mut ApiState, name: &str, params: ParamSet) {
    if !api_state.verify_options("Camera") {
        return;
    }
    if name != "orthographic" {
        warn!(
            "Camera {:?} not supported, using an orthographic projection",
            name
        );
    }
    let world_to_camera: Transform = api_state.cur_transform;
    api_state
        .named_coordinate_systems
        .insert(String::from("camera"), Transform::inverse(&world_to_camera));
    api_state.render_options.camera_name = name.to_string();
    api_state.render_options.camera_params = params;
    api_state.render_options.camera_to_world = Transform::inverse(&world_to_camera);
}

pub fn pbrt_film(api_state: &mut ApiState, name: &str, params: ParamSet) {
    if !api_state.verify_options("Film") {
        return;
    }
    api_state.render_options.film_name = name.to_string();
    api_state.render_options.film_params = params;
}

pub fn pbrt_integrator(api_state: &mut ApiState, name: &str, params: ParamSet) {
    if !api_state.verify_options("Integrator") {
        return;
    }
    api_state.render_options.integrator_name = name.to_string();
    api_state.render_options.integrator_params = params;
}

pub fn pbrt_world_begin(api_state: &mut ApiState) {
    if !api_state.verify_options("WorldBegin") {
        return;
    }
    api_state.in_world = true;
    api_state.cur_transform = Transform::default();
    api_state
        .named_coordinate_systems
        .insert(String::from("world"), api_state.cur_transform);
}

pub fn pbrt_attribute_begin(api_state: &mut ApiState) {
    if !api_state.verify_world("AttributeBegin") {
        return;
    }
    api_state.pushed_transforms.push(api_state.cur_transform);
}

pub fn pbrt_attribute_end(api_state: &mut ApiState) {
    if !api_state.verify_world("AttributeEnd") {
        return;
    }
    match api_state.pushed_transforms.pop() {
        Some(t) => api_state.cur_transform = t,
        None => warn!("Unmatched AttributeEnd encountered. Ignoring it."),
    }
}

pub fn pbrt_transform_begin(api_state: &mut ApiState) {
    api_state.pushed_transforms.push(api_state.cur_transform);
}

pub fn pbrt_transform_end(api_state: &mut ApiState) {
    match api_state.pushed_transforms.pop() {
        Some(t) => api_state.cur_transform = t,
        None => warn!("Unmatched TransformEnd encountered. Ignoring it."),
    }
}

pub fn pbrt_volume(api_state: &mut ApiState, name: &str, params: ParamSet) -> Result<()> {
    if !api_state.verify_world("Volume") {
        return Ok(());
    }
    let vr: VolumeRegion = make_volume_region(name, &api_state.cur_transform, &params)?;
    params.report_unused("Volume");
    if api_state.render_options.volume_region.is_some() {
        warn!("Only one volume region per scene, {:?} replaces the previous one", name);
    }
    api_state.render_options.volume_region = Some(vr);
    Ok(())
}

pub fn pbrt_light_source(api_state: &mut ApiState, name: &str, params: ParamSet) -> Result<()> {
    if !api_state.verify_world("LightSource") {
        return Ok(());
    }
    let light: Light = make_light(name, &api_state.cur_transform, &params)?;
    params.report_unused("LightSource");
    api_state.render_options.lights.push(light);
    Ok(())
}

pub fn pbrt_shape(api_state: &mut ApiState, name: &str, params: ParamSet) {
    if !api_state.verify_world("Shape") {
        return;
    }
    match name {
        "bead" | "sphere" => {
            let default_name: String = format!("bead{}", api_state.render_options.beads.len());
            let bead: Bead = create_bead(&api_state.cur_transform, &params, &default_name);
            params.report_unused("Shape");
            api_state.render_options.beads.push(bead);
        }
        _ => warn!("Shape {:?} ignored, only beads take part in the simulation", name),
    }
}

pub fn pbrt_sensor(api_state: &mut ApiState, name: &str, params: ParamSet) -> Result<()> {
    if !api_state.verify_world("Sensor") {
        return Ok(());
    }
    if name != "disk" {
        return Err(FluoError::UnknownName {
            kind: "Sensor".to_string(),
            name: name.to_string(),
        });
    }
    let index: usize = api_state.render_options.sensors.len();
    let sensor: Sensor = create_disk_sensor(&api_state.cur_transform, &params, index)?;
    params.report_unused("Sensor");
    api_state.render_options.sensors.push(sensor);
    Ok(())
}

/// Close the world block: create camera, film, integrator and scene.
pub fn pbrt_world_end(api_state: &mut ApiState) -> Result<()> {
    if !api_state.verify_world("WorldEnd") {
        return Ok(());
    }
    if !api_state.pushed_transforms.is_empty() {
        warn!(
            "Missing end to {} AttributeBegin/TransformBegin statement(s)",
            api_state.pushed_transforms.len()
        );
        api_state.pushed_transforms.clear();
    }
    let ro: RenderOptions = std::mem::take(&mut api_state.render_options);
    if ro.film_name != "image" {
        warn!("Film {:?} unknown, writing an image film", ro.film_name);
    }
    let film: Film = create_film(&ro.film_params);
    ro.film_params.report_unused("Film");
    let camera: OrthographicCamera = create_orthographic_camera(&ro.camera_to_world, &ro.camera_params, film);
    ro.camera_params.report_unused("Camera");
    let integrator: VolumeIntegrator = make_integrator(&ro.integrator_name, &ro.integrator_params)?;
    ro.integrator_params.report_unused("Integrator");
    info!(
        "Scene with {} light(s), {} bead(s), {} sensor(s), integrator {:?}",
        ro.lights.len(),
        ro.beads.len(),
        ro.sensors.len(),
        ro.integrator_name
    );
    let scene: Scene = Scene::new(ro.volume_region, ro.lights, ro.beads, ro.sensors);
    api_state.render_setups.push(RenderSetup {
        scene,
        integrator,
        camera,
    });
    api_state.in_world = false;
    api_state.cur_transform = Transform::default();
    Ok(())
}

fn numbers<'a>(statement: &'a Statement, n: usize) -> Result<&'a [Float]> {
    if statement.numbers.len() != n {
        return Err(FluoError::Parse(format!(
            "line {}: {} expects {} numbers, found {}",
            statement.line,
            statement.keyword,
            n,
            statement.numbers.len()
        )));
    }
    Ok(&statement.numbers)
}

fn matrix(statement: &Statement) -> Result<[Float; 16]> {
    let v: &[Float] = numbers(statement, 16)?;
    let mut tr: [Float; 16] = [0.0; 16];
    tr.copy_from_slice(v);
    Ok(tr)
}

fn type_name(statement: &Statement) -> Result<&str> {
    match statement.strings.first() {
        Some(name) => Ok(name.as_str()),
        None => Err(FluoError::Parse(format!(
            "line {}: {} needs a type name",
            statement.line, statement.keyword
        ))),
    }
}

/// Execute a single statement.
pub fn pbrt_statement(api_state: &mut ApiState, statement: &Statement) -> Result<()> {
    let params: ParamSet = statement.params.clone();
    match statement.keyword.as_str() {
        "Identity" => pbrt_identity(api_state),
        "Translate" => {
            let v = numbers(statement, 3)?;
            pbrt_translate(api_state, v[0], v[1], v[2]);
        }
        "Scale" => {
            let v = numbers(statement, 3)?;
            pbrt_scale(api_state, v[0], v[1], v[2]);
        }
        "Rotate" => {
            let v = numbers(statement, 4)?;
            pbrt_rotate(api_state, v[0], v[1], v[2], v[3]);
        }
        "LookAt" => {
            let v = numbers(statement, 9)?;
            pbrt_look_at(
                api_state,
                Point3f::new(v[0], v[1], v[2]),
                Point3f::new(v[3], v[4], v[5]),
                Vector3f::new(v[6], v[7], v[8]),
            );
        }
        "Transform" => pbrt_transform(api_state, &matrix(statement)?)?,
        "ConcatTransform" => pbrt_concat_transform(api_state, &matrix(statement)?)?,
        "CoordinateSystem" => pbrt_coordinate_system(api_state, type_name(statement)?),
        "CoordSysTransform" => pbrt_coord_sys_transform(api_state, type_name(statement)?),
        "WorldBegin" => pbrt_world_begin(api_state),
        "WorldEnd" => pbrt_world_end(api_state)?,
        "AttributeBegin" => pbrt_attribute_begin(api_state),
        "AttributeEnd" => pbrt_attribute_end(api_state),
        "TransformBegin" => pbrt_transform_begin(api_state),
        "TransformEnd" => pbrt_transform_end(api_state),
        "Camera" => pbrt_camera(api_state, type_name(statement)?, params),
        "Film" => pbrt_film(api_state, type_name(statement)?, params),
        "Integrator" | "VolumeIntegrator" => pbrt_integrator(api_state, type_name(statement)?, params),
        "Volume" => pbrt_volume(api_state, type_name(statement)?, params)?,
        "LightSource" => pbrt_light_source(api_state, type_name(statement)?, params)?,
        "Shape" => pbrt_shape(api_state, type_name(statement)?, params),
        "Sensor" => pbrt_sensor(api_state, type_name(statement)?, params)?,
        "Include" => {
            let filename: PathBuf = PathBuf::from(type_name(statement)?);
            parse_file(&filename, api_state)?;
        }
        "Sampler" | "SurfaceIntegrator" | "PixelFilter" | "Accelerator" | "Material" => {
            warn!("{} statement ignored (line {})", statement.keyword, statement.line);
        }
        keyword => {
            return Err(FluoError::Parse(format!(
                "line {}: unknown statement {:?}",
                statement.line, keyword
            )));
        }
    }
    Ok(())
}

/// Parse a scene file and execute its statements. Relative file
/// names are looked up in the directory of the first file read.
pub fn parse_file(filename: &Path, api_state: &mut ApiState) -> Result<()> {
    let path: PathBuf = match &api_state.search_directory {
        Some(dir) if filename.is_relative() => dir.join(filename),
        _ => filename.to_path_buf(),
    };
    if api_state.search_directory.is_none() {
        if let Some(dir) = path.parent() {
            api_state.search_directory = Some(dir.to_path_buf());
        }
    }
    info!("Reading {}", path.display());
    let input: String = fs::read_to_string(&path)?;
    let statements: Vec<Statement> = parse_scene(&input)
        .map_err(|e| FluoError::Parse(format!("{}: {}", path.display(), e)))?;
    for statement in &statements {
        pbrt_statement(api_state, statement)?;
    }
    Ok(())
}

/// Parse scene description text without a file, `Include` is looked
/// up relative to the current directory.
pub fn parse_string(input: &str, api_state: &mut ApiState) -> Result<()> {
    for statement in &parse_scene(input)? {
        pbrt_statement(api_state, statement)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::sensor::SensorRole;

    fn close(a: &Point3f, b: &Point3f) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4 && (a.z - b.z).abs() < 1e-4
    }

    #[test]
    fn attribute_blocks_restore_transform() {
        let mut api_state = pbrt_init(1);
        parse_string(
            "WorldBegin\nTranslate 1 0 0\nAttributeBegin\nTranslate 0 2 0\nScale 2 2 2\nAttributeEnd",
            &mut api_state,
        )
        .unwrap();
        let p = api_state.current_transform().transform_point(&Point3f::default());
        assert!(close(&p, &Point3f::new(1.0, 0.0, 0.0)));
        // unmatched AttributeEnd is ignored
        parse_string("AttributeEnd", &mut api_state).unwrap();
        let p = api_state.current_transform().transform_point(&Point3f::default());
        assert!(close(&p, &Point3f::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn transform_matrices_are_column_major() {
        let mut api_state = pbrt_init(1);
        parse_string(
            "Transform [ 1 0 0 0  0 1 0 0  0 0 1 0  3 4 5 1 ]",
            &mut api_state,
        )
        .unwrap();
        let p = api_state.current_transform().transform_point(&Point3f::default());
        assert!(close(&p, &Point3f::new(3.0, 4.0, 5.0)));
        assert!(parse_string("Transform [ 0 0 0 0  0 0 0 0  0 0 0 0  0 0 0 0 ]", &mut api_state).is_err());
        assert!(parse_string("Translate 1 2", &mut api_state).is_err());
    }

    #[test]
    fn named_coordinate_systems() {
        let mut api_state = pbrt_init(1);
        parse_string(
            "Translate 0 0 7\nCoordinateSystem \"lab\"\nIdentity\nCoordSysTransform \"lab\"",
            &mut api_state,
        )
        .unwrap();
        let p = api_state.current_transform().transform_point(&Point3f::default());
        assert!(close(&p, &Point3f::new(0.0, 0.0, 7.0)));
    }

    #[test]
    fn world_block_builds_scene() {
        let mut api_state = pbrt_init(2);
        parse_string(
            r#"
Film "image" "integer xresolution" 8 "integer yresolution" 8 "string filename" "unused.png"
VolumeIntegrator "mcfee" "integer numberphotons" 100 "float stepsize" 0.5
Sampler "random"
WorldBegin
Volume "homogeneous" "spectrum sigma_a" 0.01 "spectrum sigma_s" 1
    "point p0" [ -5 -5 -5 ] "point p1" [ 5 5 5 ]
LightSource "laser" "point from" [ 0 0 -4 ] "point to" [ 0 0 0 ] "float radius" 0.5
AttributeBegin
    Translate 0 0 1
    Shape "bead" "float radius" 0.5
AttributeEnd
Shape "trianglemesh"
Sensor "disk" "float radius" 10 "float height" 4.5 "string name" "top"
Sensor "disk" "string role" "interface"
WorldEnd
"#,
            &mut api_state,
        )
        .unwrap();
        assert_eq!(api_state.render_setups.len(), 1);
        let setup = &api_state.render_setups[0];
        assert!(matches!(setup.integrator, VolumeIntegrator::Mcfee(_)));
        assert!(setup.scene.volume_region.is_some());
        assert_eq!(setup.scene.lights.len(), 1);
        assert_eq!(setup.scene.beads.len(), 1);
        assert_eq!(setup.scene.beads[0].name, "bead0");
        assert_eq!(setup.scene.sensors.len(), 2);
        assert_eq!(setup.scene.sensors[0].name, "top");
        assert_eq!(setup.scene.sensors[1].name, "sensor1");
        assert_eq!(setup.scene.sensors[1].role, SensorRole::Interface);
        assert_eq!(setup.camera.film.x_resolution, 8);
        // the state is ready for the next world block
        assert!(api_state.render_options().lights.is_empty());
    }

    #[test]
    fn unknown_names_are_errors() {
        let mut api_state = pbrt_init(1);
        assert!(matches!(
            parse_string("WorldBegin\nSensor \"square\"", &mut api_state),
            Err(FluoError::UnknownName { .. })
        ));
        let mut api_state = pbrt_init(1);
        assert!(matches!(
            parse_string("Integrator \"path\"\nWorldBegin\nWorldEnd", &mut api_state),
            Err(FluoError::UnknownName { .. })
        ));
        let mut api_state = pbrt_init(1);
        assert!(matches!(
            parse_string("Frobnicate 1 2 3", &mut api_state),
            Err(FluoError::Parse(_))
        ));
    }

    #[test]
    fn objects_outside_world_are_ignored() {
        let mut api_state = pbrt_init(1);
        parse_string("LightSource \"point\"\nShape \"bead\"", &mut api_state).unwrap();
        assert!(api_state.render_options().lights.is_empty());
        assert!(api_state.render_options().beads.is_empty());
    }
}
