//! Constructors for planar grids, single voxels and stacked voxel boxes.

use crate::geom::Point3;

use super::error::TopologyError;
use super::mesh::VolumetricMesh;
use super::{CellId, FaceId, HalfEdgeId};

fn check_grid(counts: &[(&str, usize)], side: f64) -> Result<(), TopologyError> {
    for &(name, count) in counts {
        if count == 0 {
            return Err(TopologyError::InvalidGrid(format!("{name} must be at least 1")));
        }
    }
    if !side.is_finite() || side <= 0.0 {
        return Err(TopologyError::InvalidGrid(format!(
            "side length must be finite and > 0, got {side}"
        )));
    }
    Ok(())
}

impl VolumetricMesh {
    /// Flat cell of `x_count × y_count` square faces in the XY plane, with the
    /// edges between neighbouring faces paired. Face normals point along +Z.
    ///
    /// Grid vertex `(i, j)` sits at `(i·side, j·side, 0)`; face `(i, j)` is
    /// stored at index `i·y_count + j` of the cell.
    pub fn simple_planar_cell(
        x_count: usize,
        y_count: usize,
        side: f64,
    ) -> Result<(Self, CellId), TopologyError> {
        check_grid(&[("x count", x_count), ("y count", y_count)], side)?;

        let mut mesh = Self::new();
        let mut grid = Vec::with_capacity(x_count + 1);
        for i in 0..=x_count {
            let column: Vec<_> = (0..=y_count)
                .map(|j| mesh.add_vertex(Point3::new(i as f64 * side, j as f64 * side, 0.0)))
                .collect();
            grid.push(column);
        }

        let mut rings: Vec<Vec<[HalfEdgeId; 4]>> = Vec::with_capacity(x_count);
        let mut faces: Vec<FaceId> = Vec::with_capacity(x_count * y_count);
        for i in 0..x_count {
            let mut row = Vec::with_capacity(y_count);
            for j in 0..y_count {
                let ring = [
                    mesh.add_half_edge(grid[i][j]),
                    mesh.add_half_edge(grid[i][j + 1]),
                    mesh.add_half_edge(grid[i + 1][j + 1]),
                    mesh.add_half_edge(grid[i + 1][j]),
                ];
                faces.push(mesh.add_face(ring.to_vec()));
                row.push(ring);
            }
            rings.push(row);
        }

        for i in 1..x_count {
            for j in 0..y_count {
                mesh.set_pair(rings[i - 1][j][3], rings[i][j][1])?;
            }
        }
        for i in 0..x_count {
            for j in 1..y_count {
                mesh.set_pair(rings[i][j - 1][2], rings[i][j][0])?;
            }
        }

        let cell = mesh.add_cell(faces);
        Ok((mesh, cell))
    }

    /// Closed cube of edge `size` standing on the XY plane at the origin. The
    /// mesh holds exactly one cell with six faces.
    pub fn voxel(size: f64) -> Result<Self, TopologyError> {
        let (mut mesh, base) = Self::simple_planar_cell(1, 1, size)?;
        let cells = mesh.extrude_upwards(base, &[], size, true, false)?;
        let solid = cells[1];

        mesh.clear_all_offspring();
        mesh.retain_cells(&[solid])?;
        Ok(mesh)
    }

    /// `x_count × y_count × z_count` voxels of edge `side`. Each layer above
    /// the first is extruded from the tops of the layer below and linked to
    /// it, so stacked voxels appear in [`cell_adjacency`](Self::cell_adjacency).
    pub fn box_model(
        x_count: usize,
        y_count: usize,
        z_count: usize,
        side: f64,
    ) -> Result<Self, TopologyError> {
        check_grid(&[("z count", z_count)], side)?;
        let (mut mesh, base) = Self::simple_planar_cell(x_count, y_count, side)?;
        let base_faces = mesh.cell_or_err(base)?.faces().to_vec();

        let first_layer = mesh.extrude_upwards(base, &[], side, true, false)?;
        let mut layer: Vec<CellId> = first_layer[1..].to_vec();
        // current top of every column, in base grid order
        let mut tops: Vec<FaceId> = base_faces
            .iter()
            .filter_map(|&f| mesh.face(f).offspring())
            .collect();
        let mut kept = layer.clone();

        for level in 1..z_count {
            let mut next_layer = Vec::with_capacity(layer.len());
            let mut next_tops = Vec::with_capacity(tops.len());
            for &top in &tops {
                let height = match mesh.face_normal(top)? {
                    Some(normal) if normal.z < 0.0 => -side,
                    Some(_) => side,
                    None => return Err(TopologyError::DegenerateFace { face: top }),
                };
                let extrusion = mesh.extrude_face(top, height, true, true)?;
                next_layer.extend(extrusion.cell);
                next_tops.push(extrusion.top);
            }
            log::debug!("box_model: layer {level} with {} cell(s)", next_layer.len());
            kept.extend(&next_layer);
            layer = next_layer;
            tops = next_tops;
        }

        mesh.clear_all_offspring();
        mesh.retain_cells(&kept)?;
        Ok(mesh)
    }
}
