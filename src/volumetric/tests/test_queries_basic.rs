use std::collections::HashSet;

use crate::geom::PolyFace;
use crate::volumetric::{CellId, EDGE_TUBE_OPTIONS, TopologyError, VolumetricMesh};

#[test]
fn voxel_is_a_closed_six_sided_cell() {
    let voxel = VolumetricMesh::voxel(1.0).expect("voxel");
    assert_eq!(voxel.cell_count(), 1);
    let cell = CellId::new(0);
    assert_eq!(voxel.cell(cell).expect("cell").faces().len(), 6);
    assert_eq!(voxel.cell_vertices(cell).expect("cell").len(), 8);
    assert!(voxel.naked_edges().expect("edges").is_empty());
    assert_eq!(voxel.cell_covered_edges(cell).expect("cell").len(), 24);

    for &face in voxel.cell(cell).expect("cell").faces() {
        assert!(voxel.face_is_closed(face));
        assert_eq!(voxel.face_internal_neighbours(face).len(), 4);
        assert_eq!(voxel.face_triangles(face).len(), 2);
    }
}

#[test]
fn voxel_dual_graph_lists_each_adjacency_once() {
    let voxel = VolumetricMesh::voxel(2.0).expect("voxel");
    let cell = CellId::new(0);
    let pairs = voxel.cell_dual_graph(cell).expect("dual graph");
    assert_eq!(pairs.len(), 12);

    let unordered: HashSet<_> = pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
    assert_eq!(unordered.len(), pairs.len());

    let lines = voxel.dual_graph_as_lines().expect("lines");
    assert_eq!(lines.len(), 12);
    for [a, b] in lines {
        // adjacent face centres of a cube with edge 2
        assert!((a.distance_to(b) - 2.0_f64.sqrt()).abs() < 1e-9);
    }
}

#[test]
fn voxel_converts_to_watertight_quad_mesh() {
    let voxel = VolumetricMesh::voxel(1.0).expect("voxel");
    let poly = voxel.to_poly_mesh();
    assert_eq!(poly.vertex_count(), 8);
    assert_eq!(poly.face_count(), 6);
    let diagnostics = poly.diagnostics();
    assert!(diagnostics.is_watertight());
    assert!(diagnostics.is_manifold());

    let render = voxel.to_geom_mesh();
    assert_eq!(render.triangle_count(), 12);
    assert!(render.validate().is_ok());
}

#[test]
fn voxel_cell_converts_on_its_own() {
    let voxel = VolumetricMesh::voxel(1.0).expect("voxel");
    let cell = CellId::new(0);
    let poly = voxel.cell_to_poly_mesh(cell).expect("cell mesh");
    assert_eq!(poly.vertex_count(), 8);
    assert_eq!(poly.face_count(), 6);
    assert!(poly.faces.iter().all(|f| matches!(f, PolyFace::Quad(_))));
    assert!(poly.diagnostics().is_watertight());

    for &face in voxel.cell(cell).expect("cell").faces() {
        assert!(voxel.face(face).offspring().is_none());
    }
    assert_eq!(
        voxel.cell_to_poly_mesh(CellId::new(1)),
        Err(TopologyError::UnknownCell(CellId::new(1)))
    );
}

#[test]
fn face_polygons_are_corner_cut_outlines() {
    let voxel = VolumetricMesh::voxel(1.0).expect("voxel");
    let polygons = voxel.polygons().expect("polygons");
    assert_eq!(polygons.len(), 6);
    // 4 edges × 2 quarter points, doubled by each of three rounds
    assert!(polygons.iter().all(|p| p.len() == 64));
}

#[test]
fn planar_grid_edges_split_into_rim_and_interior() {
    let (mesh, cell) = VolumetricMesh::simple_planar_cell(2, 2, 1.0).expect("planar cell");
    assert_eq!(mesh.cell_naked_edges(cell).expect("cell").len(), 8);
    assert_eq!(mesh.cell_covered_edges(cell).expect("cell").len(), 8);
    assert_eq!(mesh.cell_dual_graph(cell).expect("dual graph").len(), 4);
    assert_eq!(mesh.cell_vertices(cell).expect("cell").len(), 9);
}

#[test]
fn box_model_links_stacked_voxels() {
    let model = VolumetricMesh::box_model(2, 1, 3, 1.0).expect("box model");
    assert_eq!(model.cell_count(), 6);
    assert_eq!(model.cell_adjacency().len(), 2 * 1 * (3 - 1));
    assert!(model.naked_edges().expect("edges").is_empty());

    let top = model
        .cell_ids()
        .flat_map(|c| model.cell_vertices(c).expect("cell"))
        .map(|v| model.position(v).z)
        .fold(f64::MIN, f64::max);
    assert!((top - 3.0).abs() < 1e-9);
}

#[test]
fn edge_meshes_sweep_every_face_outline() {
    let voxel = VolumetricMesh::voxel(1.0).expect("voxel");
    let tubes = voxel.edge_meshes(EDGE_TUBE_OPTIONS).expect("tubes");
    assert_eq!(tubes.len(), 6);
    for tube in &tubes {
        assert!(tube.closed);
        assert_eq!(tube.ring_count, 65);
        assert_eq!(tube.vertex_count(), 65 * 20);
    }
}

#[test]
fn retaining_unknown_cells_fails() {
    let mut voxel = VolumetricMesh::voxel(1.0).expect("voxel");
    let err = voxel.retain_cells(&[CellId::new(3)]).expect_err("unknown cell");
    assert_eq!(err, TopologyError::UnknownCell(CellId::new(3)));
    assert_eq!(voxel.cell_count(), 1);
}
