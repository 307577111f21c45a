use babsrects_engine::geom::{
    ExportData, FaceLayout, Point3, SweepOptions, circle, helix, rrreefs_profile,
};
use babsrects_engine::graph::{UndirectedEdgeMap, is_single_chain};
use babsrects_engine::volumetric::VolumetricMesh;
use babsrects_engine::{Engine, EngineError};

fn face_lines(text: &str) -> usize {
    text.lines().filter(|l| l.starts_with("f ")).count()
}

#[test]
fn engine_initializes() {
    let engine = Engine::new();
    assert!(engine.is_initialized());
    assert!(engine.scene().is_none());
    assert!(engine.growth().is_none());
}

#[test]
fn sweep_requires_a_polyline() {
    let mut engine = Engine::new();
    assert!(matches!(engine.rebuild_sweep(), Err(EngineError::NoPolyline)));
    assert!(matches!(
        engine.set_polyline_points(vec![Point3::ORIGIN]),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(engine.obj_text(), Err(EngineError::NoScene)));
}

#[test]
fn helix_sweep_scene_carries_shader_attributes() {
    let mut engine = Engine::new();
    engine.set_sweep_config(SweepOptions {
        radius: 0.5,
        divisions: 8,
        ..SweepOptions::default()
    });
    engine
        .set_polyline_points(helix(Point3::ORIGIN, 3.0, 5.0, 0.1, 40))
        .expect("polyline");

    let scene = engine.rebuild_sweep().expect("sweep");
    assert_eq!(scene.name(), "sweep");
    assert_eq!(scene.mesh().vertex_count(), 40 * 8);
    let attributes = scene.attributes().expect("sweep attributes");
    assert_eq!(attributes.direction_a.len(), 40 * 8);
    assert_eq!(attributes.next_pattern_uv.len(), 40 * 8);
    assert_eq!(scene.diagnostics().triangle_count, 39 * 8 * 2);

    let obj = engine.obj_text().expect("obj");
    assert_eq!(face_lines(&obj), 39 * 8 * 2);
    assert!(obj.contains("\no sweep\n"));
}

#[test]
fn closed_circle_sweep_with_quads() {
    let mut engine = Engine::new();
    engine.set_sweep_config(SweepOptions {
        layout: FaceLayout::Quads,
        ..SweepOptions::default()
    });
    engine
        .set_polyline_points(circle(Point3::ORIGIN, 10.0, 32).expect("circle"))
        .expect("polyline");
    let scene = engine.rebuild_sweep().expect("sweep");
    assert!(scene.attributes().expect("attributes").closed);
    assert_eq!(scene.diagnostics().quad_count, 32 * 15);
}

#[test]
fn failed_rebuild_drops_the_previous_scene() {
    let mut engine = Engine::new();
    engine.rebuild_voxel(1.0).expect("voxel");
    assert!(engine.scene().is_some());

    assert!(engine.rebuild_box_model(0, 1, 1, 1.0).is_err());
    assert!(engine.scene().is_none());
}

#[test]
fn voxel_and_box_model_scenes_are_watertight() {
    let mut engine = Engine::new();
    let voxel = engine.rebuild_voxel(2.0).expect("voxel");
    assert!(voxel.diagnostics().is_watertight());
    assert_eq!(voxel.diagnostics().quad_count, 6);

    let model = engine.rebuild_box_model(2, 2, 2, 1.0).expect("box model");
    assert_eq!(model.name(), "box_model");
    assert_eq!(model.diagnostics().quad_count, 8 * 6);
    assert!(model.diagnostics().is_watertight());

    let stl = engine.stl_text().expect("stl");
    assert!(stl.starts_with("solid box_model\n"));
    assert_eq!(stl.matches("endfacet").count(), 8 * 6);
}

#[test]
fn loft_scene_from_stacked_profiles() {
    let mut engine = Engine::new();
    let profiles: Vec<_> = (0..5)
        .map(|layer| rrreefs_profile(30.0, 8.0, 2.0, f64::from(layer) * 3.0).expect("profile"))
        .collect();
    let m = profiles[0].len();
    engine.set_profile_polygons(profiles).expect("profiles");

    let scene = engine.rebuild_loft(false).expect("loft");
    assert_eq!(scene.diagnostics().quad_count, 4 * m);
    assert_eq!(scene.diagnostics().open_edge_count, 2 * m);

    let closed = engine.rebuild_loft(true).expect("closed loft");
    assert_eq!(closed.diagnostics().quad_count, 5 * m);
}

#[test]
fn seeded_growth_pipe_is_reproducible() {
    let build = || {
        let mut engine = Engine::new();
        engine.begin_growth(24, 120.0, Some(11)).expect("growth");
        let stats = engine.step_growth(8).expect("steps");
        assert_eq!(stats.iterations, 8);
        engine.rebuild_growth_pipe(1.0).expect("pipe");
        engine.obj_text().expect("obj")
    };
    let first = build();
    assert_eq!(first, build());
    assert!(first.contains("\no growth_pipe\n"));
}

#[test]
fn growth_steps_need_a_running_simulation() {
    let mut engine = Engine::new();
    assert!(matches!(engine.step_growth(1), Err(EngineError::NoGrowth)));
    assert!(matches!(engine.rebuild_growth_pipe(0.0), Err(EngineError::NoGrowth)));
    assert!(matches!(
        engine.begin_growth(2, 10.0, Some(1)),
        Err(EngineError::Growth(_))
    ));
}

#[test]
fn edge_tubes_merge_one_tube_per_face() {
    let mut engine = Engine::new();
    let scene = engine.rebuild_edge_tubes(1.0).expect("tubes");
    assert_eq!(scene.mesh().vertex_count(), 6 * 65 * 20);
    assert!(scene.attributes().is_none());
    assert!(scene.diagnostics().is_manifold());
}

#[test]
fn clear_resets_inputs_and_scene() {
    let mut engine = Engine::new();
    engine
        .set_polyline_points(vec![Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)])
        .expect("polyline");
    engine.rebuild_sweep().expect("sweep");
    engine.clear();
    assert!(engine.scene().is_none());
    assert!(matches!(engine.rebuild_sweep(), Err(EngineError::NoPolyline)));
}

#[test]
fn extruded_planar_grid_exports_through_the_public_api() {
    let (mut mesh, base) = VolumetricMesh::simple_planar_cell(3, 2, 1.0).expect("planar cell");
    let cells = mesh
        .extrude_upwards(base, &[], 2.0, true, false)
        .expect("expansion");
    assert_eq!(cells.len(), 1 + 3 * 2);

    let outline: Vec<Vec<_>> = mesh
        .cell(cells[1])
        .expect("cell")
        .faces()
        .iter()
        .take(1)
        .map(|&face| mesh.face_vertices(face))
        .collect();
    let ring = UndirectedEdgeMap::from_polygons(&outline, true);
    assert_eq!(is_single_chain(&ring), Ok(true));

    let mut data = ExportData::new();
    data.push_poly(&mesh.to_poly_mesh());
    let obj = data.write_obj("grid").expect("obj");
    assert_eq!(face_lines(&obj), mesh.to_poly_mesh().face_count());
}
