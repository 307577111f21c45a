use crate::geom::{
    ExportData, ExportError, GeomMesh, Point3, PolyFace, PolyMesh, SweepOptions, sweep_polyline,
};

fn face_lines(obj: &str) -> Vec<&str> {
    obj.lines().filter(|l| l.starts_with("f ")).collect()
}

#[test]
fn obj_indices_are_one_based_and_offset_per_mesh() {
    let mut data = ExportData::new();
    data.push_poly(&PolyMesh::example_triangle());
    data.push_poly(&PolyMesh::example_quad());
    assert_eq!(data.vertex_count(), 7);
    assert_eq!(data.uvs.len(), 7);
    assert_eq!(data.normals.len(), 7);

    let obj = data.write_obj("pair").expect("obj");
    assert!(obj.starts_with("# babsrects export\no pair\n"));
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 7);
    assert_eq!(obj.lines().filter(|l| l.starts_with("vt ")).count(), 7);
    assert_eq!(obj.lines().filter(|l| l.starts_with("vn ")).count(), 7);
    assert_eq!(
        face_lines(&obj),
        vec!["f 1/1/1 2/2/2 3/3/3", "f 4/4/4 5/5/5 6/6/6 7/7/7"]
    );
}

#[test]
fn sweeps_keep_their_uvs_and_normals() {
    let path = [Point3::ORIGIN, Point3::new(0.0, 0.0, 4.0)];
    let options = SweepOptions {
        divisions: 6,
        ..SweepOptions::default()
    };
    let (a, _) = sweep_polyline(&path, options).expect("sweep");
    let (b, _) = sweep_polyline(&path, options).expect("sweep");

    let data = ExportData::from_sweeps(&[a.clone(), b]);
    assert_eq!(data.vertex_count(), 24);
    assert_eq!(data.uvs[13], a.uvs[1]);
    assert_eq!(data.normals[13], a.normals[1]);

    let second = data.faces[a.faces.len()];
    assert_eq!(second.indices()[0], a.faces[0].indices()[0] + 12);
}

#[test]
fn stl_lists_one_facet_per_face() {
    let mut data = ExportData::new();
    data.push_poly(&PolyMesh::example_cube());
    let stl = data.write_stl("cube").expect("stl");

    let lines: Vec<&str> = stl.lines().collect();
    assert_eq!(lines.first(), Some(&"solid cube"));
    assert_eq!(lines.last(), Some(&"endsolid cube"));
    assert_eq!(lines.iter().filter(|l| l.starts_with("facet normal")).count(), 6);
    assert_eq!(lines.iter().filter(|l| **l == "outer loop").count(), 6);
    assert_eq!(lines.iter().filter(|l| **l == "endloop").count(), 6);
    assert_eq!(lines.iter().filter(|l| **l == "endfacet").count(), 6);
    assert_eq!(lines.iter().filter(|l| l.starts_with("vertex")).count(), 24);
    // bottom quad [0, 3, 2, 1] faces down
    assert_eq!(lines[1], "facet normal 0 0 -1");
}

#[test]
fn render_meshes_export_as_triangles() {
    let mesh = GeomMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2],
    );
    let mut data = ExportData::new();
    data.push_geom(&mesh);
    assert_eq!(data.faces, vec![PolyFace::Triangle([0, 1, 2])]);
    assert_eq!(data.uvs, vec![[0.0, 0.0]; 3]);
}

#[test]
fn empty_or_broken_data_is_rejected() {
    assert_eq!(ExportData::new().write_obj("x").unwrap_err(), ExportError::Empty);

    let data = ExportData {
        positions: vec![[0.0; 3]; 2],
        uvs: vec![[0.0; 2]; 2],
        normals: vec![[0.0; 3]; 2],
        faces: vec![PolyFace::Triangle([0, 1, 5])],
    };
    assert_eq!(
        data.write_stl("x").unwrap_err(),
        ExportError::IndexOutOfRange { face: 0, index: 5, vertex_count: 2 }
    );
}
