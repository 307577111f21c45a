#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod graph;
pub mod volumetric;

use std::f64::consts::PI;
use std::fmt;

use geom::{
    CurveError, ExportData, ExportError, FaceLayout, GeomMeshDiagnostics, Growth, GrowthError,
    GrowthOptions, GrowthStats, LoftError, LoftOptions, Point3, PolyMesh, SweepError, SweepMesh,
    SweepOptions, Vec2, loft_profiles, sweep_polyline,
};
use serde::Serialize;
use volumetric::{CellId, EDGE_TUBE_OPTIONS, EdgeMeshError, TopologyError, VolumetricMesh};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten die de engine-facade aan de aanroeper doorgeeft.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("er is geen polyline ingesteld")]
    NoPolyline,
    #[error("er zijn geen profielen ingesteld")]
    NoProfiles,
    #[error("er is geen groeisimulatie gestart")]
    NoGrowth,
    #[error("er is geen scène om te exporteren")]
    NoScene,
    #[error("ongeldige invoer: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error(transparent)]
    Loft(#[from] LoftError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    EdgeMesh(#[from] EdgeMeshError),
    #[error(transparent)]
    Growth(#[from] GrowthError),
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Het huidige resultaat: een samengevoegde mesh plus, voor buizen, de shader-attributen.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    name: String,
    mesh: ExportData,
    diagnostics: GeomMeshDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<SweepMesh>,
}

impl Scene {
    fn from_sweep(name: &str, sweep: SweepMesh, diagnostics: GeomMeshDiagnostics) -> Self {
        let mut mesh = ExportData::new();
        mesh.push_sweep(&sweep);
        Self {
            name: name.to_owned(),
            mesh,
            diagnostics,
            attributes: Some(sweep),
        }
    }

    fn from_poly(name: &str, poly: &PolyMesh, diagnostics: GeomMeshDiagnostics) -> Self {
        let mut mesh = ExportData::new();
        mesh.push_poly(poly);
        Self {
            name: name.to_owned(),
            mesh,
            diagnostics,
            attributes: None,
        }
    }

    fn from_tubes(name: &str, tubes: &[SweepMesh]) -> Self {
        let mut diagnostics = GeomMeshDiagnostics::new();
        for tube in tubes {
            diagnostics.merge(&tube.to_poly_mesh().diagnostics());
        }
        Self {
            name: name.to_owned(),
            mesh: ExportData::from_sweeps(tubes),
            diagnostics,
            attributes: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mesh(&self) -> &ExportData {
        &self.mesh
    }

    #[must_use]
    pub fn diagnostics(&self) -> &GeomMeshDiagnostics {
        &self.diagnostics
    }

    /// Frame-attributen van de buis, alleen bij een enkele sweep.
    #[must_use]
    pub fn attributes(&self) -> Option<&SweepMesh> {
        self.attributes.as_ref()
    }
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    polyline: Vec<Point3>,
    profiles: Vec<Vec<Point3>>,
    sweep_options: SweepOptions,
    growth: Option<Growth>,
    scene: Option<Scene>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            polyline: Vec::new(),
            profiles: Vec::new(),
            sweep_options: SweepOptions::default(),
            growth: None,
            scene: None,
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Stel de sweep-polyline in als platte `[x, y, z, ...]` lijst.
    #[wasm_bindgen]
    pub fn set_polyline(&mut self, coordinates: Vec<f64>) -> Result<(), JsValue> {
        let points = points_from_flat(&coordinates).map_err(to_js_error)?;
        self.set_polyline_points(points).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_sweep_options(
        &mut self,
        radius: f64,
        divisions: u32,
        uv_scale: f64,
        quads: bool,
        apply_width_scale: bool,
    ) {
        self.sweep_options = SweepOptions {
            radius,
            divisions: divisions as usize,
            uv_scale,
            layout: if quads { FaceLayout::Quads } else { FaceLayout::Triangles },
            apply_width_scale,
        };
    }

    /// Bouw een buis rond de ingestelde polyline.
    #[wasm_bindgen]
    pub fn build_sweep(&mut self) -> Result<JsValue, JsValue> {
        self.rebuild_sweep().map_err(to_js_error)?;
        self.scene_value()
    }

    /// Stel de loft-profielen in als `[[[x, y, z], ...], ...]`.
    #[wasm_bindgen]
    pub fn set_profiles(&mut self, profiles: JsValue) -> Result<(), JsValue> {
        let profiles: Vec<Vec<[f64; 3]>> =
            serde_wasm_bindgen::from_value(profiles).map_err(to_js_error)?;
        let profiles = profiles
            .into_iter()
            .map(|profile| profile.into_iter().map(Point3::from).collect())
            .collect();
        self.set_profile_polygons(profiles).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn build_loft(&mut self, close: bool) -> Result<JsValue, JsValue> {
        self.rebuild_loft(close).map_err(to_js_error)?;
        self.scene_value()
    }

    #[wasm_bindgen]
    pub fn build_voxel(&mut self, size: f64) -> Result<JsValue, JsValue> {
        self.rebuild_voxel(size).map_err(to_js_error)?;
        self.scene_value()
    }

    #[wasm_bindgen]
    pub fn build_box_model(&mut self, x: u32, y: u32, z: u32, side: f64) -> Result<JsValue, JsValue> {
        self.rebuild_box_model(x as usize, y as usize, z as usize, side)
            .map_err(to_js_error)?;
        self.scene_value()
    }

    /// Buizen langs de afgeronde zijvlakken van een voxel.
    #[wasm_bindgen]
    pub fn build_edge_tubes(&mut self, size: f64) -> Result<JsValue, JsValue> {
        self.rebuild_edge_tubes(size).map_err(to_js_error)?;
        self.scene_value()
    }

    /// Start een groeisimulatie vanaf een cirkel van `node_count` knopen.
    #[wasm_bindgen]
    pub fn start_growth(&mut self, node_count: u32, radius: f64, seed: Option<u32>) -> Result<(), JsValue> {
        self.begin_growth(node_count as usize, radius, seed.map(u64::from))
            .map_err(to_js_error)
    }

    /// Laat de groei `steps` keer lopen en geef de tellers terug.
    #[wasm_bindgen]
    pub fn advance_growth(&mut self, steps: u32) -> Result<JsValue, JsValue> {
        let stats = self.step_growth(steps as usize).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&stats).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn build_growth_pipe(&mut self, height: f64) -> Result<JsValue, JsValue> {
        self.rebuild_growth_pipe(height).map_err(to_js_error)?;
        self.scene_value()
    }

    #[wasm_bindgen]
    pub fn export_obj(&self) -> Result<String, JsValue> {
        self.obj_text().map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn export_stl(&self) -> Result<String, JsValue> {
        self.stl_text().map_err(to_js_error)
    }

    /// Verwijder alle invoer en de huidige scène.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.polyline.clear();
        self.profiles.clear();
        self.growth = None;
        self.scene = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native API
// ─────────────────────────────────────────────────────────────────────────────

impl Engine {
    /// Vervangt de polyline; minstens twee eindige punten.
    pub fn set_polyline_points(&mut self, points: Vec<Point3>) -> Result<(), EngineError> {
        if points.len() < 2 {
            return Err(EngineError::InvalidInput(format!(
                "polyline heeft minstens 2 punten nodig, kreeg {}",
                points.len()
            )));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(EngineError::InvalidInput(format!("punt {index} is niet eindig")));
        }
        self.polyline = points;
        Ok(())
    }

    pub fn set_profile_polygons(&mut self, profiles: Vec<Vec<Point3>>) -> Result<(), EngineError> {
        if profiles.is_empty() {
            return Err(EngineError::NoProfiles);
        }
        self.profiles = profiles;
        Ok(())
    }

    #[must_use]
    pub fn sweep_options(&self) -> SweepOptions {
        self.sweep_options
    }

    pub fn set_sweep_config(&mut self, options: SweepOptions) {
        self.sweep_options = options;
    }

    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    #[must_use]
    pub fn growth(&self) -> Option<&Growth> {
        self.growth.as_ref()
    }

    pub fn rebuild_sweep(&mut self) -> Result<&Scene, EngineError> {
        self.scene = None;
        if self.polyline.is_empty() {
            return Err(EngineError::NoPolyline);
        }
        let (sweep, diagnostics) = sweep_polyline(&self.polyline, self.sweep_options)?;
        Ok(self.store(Scene::from_sweep("sweep", sweep, diagnostics)))
    }

    pub fn rebuild_loft(&mut self, close: bool) -> Result<&Scene, EngineError> {
        self.scene = None;
        if self.profiles.is_empty() {
            return Err(EngineError::NoProfiles);
        }
        let options = LoftOptions {
            close,
            ..LoftOptions::default()
        };
        let (poly, diagnostics) = loft_profiles(&self.profiles, options)?;
        Ok(self.store(Scene::from_poly("loft", &poly, diagnostics)))
    }

    pub fn rebuild_voxel(&mut self, size: f64) -> Result<&Scene, EngineError> {
        self.scene = None;
        let voxel = VolumetricMesh::voxel(size)?;
        let solid = CellId::new(0);
        let poly = voxel.cell_to_poly_mesh(solid)?;
        let diagnostics = poly.diagnostics();
        Ok(self.store(Scene::from_poly("voxel", &poly, diagnostics)))
    }

    pub fn rebuild_box_model(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        side: f64,
    ) -> Result<&Scene, EngineError> {
        self.scene = None;
        let model = VolumetricMesh::box_model(x, y, z, side)?;
        let poly = model.to_poly_mesh();
        let diagnostics = poly.diagnostics();
        Ok(self.store(Scene::from_poly("box_model", &poly, diagnostics)))
    }

    pub fn rebuild_edge_tubes(&mut self, size: f64) -> Result<&Scene, EngineError> {
        self.scene = None;
        let voxel = VolumetricMesh::voxel(size)?;
        let tubes = voxel.edge_meshes(EDGE_TUBE_OPTIONS)?;
        Ok(self.store(Scene::from_tubes("edge_tubes", &tubes)))
    }

    /// Vervangt een lopende simulatie door een nieuwe cirkel in het XY-vlak.
    pub fn begin_growth(
        &mut self,
        node_count: usize,
        radius: f64,
        seed: Option<u64>,
    ) -> Result<(), EngineError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "groeistraal moet positief zijn, kreeg {radius}"
            )));
        }
        let nodes = (0..node_count)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / node_count as f64;
                Vec2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        let options = GrowthOptions {
            seed,
            ..GrowthOptions::default()
        };
        self.growth = Some(Growth::new(nodes, options)?);
        Ok(())
    }

    pub fn step_growth(&mut self, steps: usize) -> Result<GrowthStats, EngineError> {
        let growth = self.growth.as_mut().ok_or(EngineError::NoGrowth)?;
        growth.grow_n(steps);
        let stats = growth.stats();
        debug_log!("{stats}");
        Ok(stats)
    }

    pub fn rebuild_growth_pipe(&mut self, height: f64) -> Result<&Scene, EngineError> {
        self.scene = None;
        let growth = self.growth.as_ref().ok_or(EngineError::NoGrowth)?;
        let (sweep, diagnostics) = growth.to_sweep(height, self.sweep_options)?;
        Ok(self.store(Scene::from_sweep("growth_pipe", sweep, diagnostics)))
    }

    pub fn obj_text(&self) -> Result<String, EngineError> {
        let scene = self.scene.as_ref().ok_or(EngineError::NoScene)?;
        Ok(scene.mesh.write_obj(&scene.name)?)
    }

    pub fn stl_text(&self) -> Result<String, EngineError> {
        let scene = self.scene.as_ref().ok_or(EngineError::NoScene)?;
        Ok(scene.mesh.write_stl(&scene.name)?)
    }

    fn store(&mut self, scene: Scene) -> &Scene {
        debug_log!("scène {}: {}", scene.name, scene.diagnostics);
        log::debug!("scene {}: {}", scene.name, scene.diagnostics);
        self.scene.insert(scene)
    }

    fn scene_value(&self) -> Result<JsValue, JsValue> {
        let Some(scene) = self.scene.as_ref() else {
            return Err(js_error("er is geen scène gebouwd"));
        };
        serde_wasm_bindgen::to_value(scene).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

fn points_from_flat(coordinates: &[f64]) -> Result<Vec<Point3>, EngineError> {
    if coordinates.len() % 3 != 0 {
        return Err(EngineError::InvalidInput(format!(
            "coördinatenlijst moet een veelvoud van 3 lang zijn, kreeg {}",
            coordinates.len()
        )));
    }
    Ok(coordinates
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineError, points_from_flat};
    use crate::geom::Point3;

    #[test]
    fn flat_coordinates_become_points() {
        let points = points_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).expect("points");
        assert_eq!(points, vec![Point3::new(0.0, 1.0, 2.0), Point3::new(3.0, 4.0, 5.0)]);
    }

    #[test]
    fn ragged_coordinates_are_rejected() {
        assert!(matches!(
            points_from_flat(&[0.0, 1.0]),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
