use crate::geom::{GeomMesh, PolyFace, PolyMesh};

#[test]
fn quads_split_into_two_triangles() {
    let quad = PolyFace::Quad([4, 5, 6, 7]);
    assert_eq!(quad.triangles(), vec![[4, 5, 6], [4, 6, 7]]);
    assert_eq!(quad.inverted(), PolyFace::Quad([7, 6, 5, 4]));

    let render = PolyMesh::example_quad().to_geom_mesh();
    assert_eq!(render.indices, vec![0, 1, 2, 0, 2, 3]);
    let normals = render.normals.expect("normals");
    assert!(normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
}

#[test]
fn example_cube_is_closed() {
    let cube = PolyMesh::example_cube();
    let diag = cube.diagnostics();
    assert_eq!(diag.quad_count, 6);
    assert!(diag.is_watertight());
    assert!(diag.is_manifold());
    assert_eq!(diag.degenerate_face_count, 0);
    assert!(cube.to_geom_mesh().validate().is_ok());
}

#[test]
fn append_offsets_the_second_mesh() {
    let mut mesh = PolyMesh::example_triangle();
    mesh.append(&PolyMesh::example_quad());
    assert_eq!(mesh.vertex_count(), 7);
    assert_eq!(mesh.faces[1], PolyFace::Quad([3, 4, 5, 6]));
    assert!(mesh.has_valid_indices());

    mesh.invert_faces();
    assert_eq!(mesh.faces[0], PolyFace::Triangle([2, 1, 0]));
}

#[test]
fn collapsed_and_broken_faces_are_reported() {
    let sliver = PolyMesh::new(
        vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![PolyFace::Triangle([0, 1, 1])],
    );
    assert_eq!(sliver.diagnostics().degenerate_face_count, 1);

    let broken = GeomMesh::new(vec![[0.0; 3]], vec![0, 0, 3]);
    assert!(broken.validate().is_err());
    let ragged = GeomMesh::new(vec![[0.0; 3]], vec![0, 0]);
    assert!(ragged.validate().is_err());
}
