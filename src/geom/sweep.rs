//! Tube meshes around polylines using parallel-transport (rotation-minimizing) frames.
//!
//! This module provides:
//! - `compute_frames`: per-sample position, tangent, normal, binormal, arc length and
//!   width scale
//! - `sweep_polyline`: a ring of `divisions` vertices per sample plus the
//!   neighbour-frame attribute buffers consumed by the deforming tube shader
//!
//! Frames are built in one forward pass and dropped once the buffers are written.

use std::f64::consts::PI;

use serde::Serialize;

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, PolyFace, PolyMesh, face_diagnostics};
use super::{Point3, Tolerance, Vec3};

/// Distance under which the first and last sample close the polyline.
const CLOSURE: Tolerance = Tolerance::new(1e-3);

/// Length of the averaged tangent under which two tangents count as reversed.
const REVERSAL: Tolerance = Tolerance::LOOSE;

/// `|tangent.y|` above which the tangent is treated as vertical when seeding.
const VERTICAL_SEED_LIMIT: f64 = 1.0 - 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceLayout {
    /// Two triangles per ring segment quad.
    #[default]
    Triangles,
    /// One quad per ring segment, corners in cyclic order.
    Quads,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    pub radius: f64,
    /// Vertices per ring.
    pub divisions: usize,
    /// Texture repeat length along and around the tube.
    pub uv_scale: f64,
    pub layout: FaceLayout,
    /// Widen each ring by its frame's width scale so corners keep their thickness.
    pub apply_width_scale: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            radius: 1.5,
            divisions: 15,
            uv_scale: 2.5,
            layout: FaceLayout::Triangles,
            apply_width_scale: false,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SweepError {
    #[error("sweep polyline requires at least 2 points")]
    PolylineTooShort,
    #[error("sweep polyline must have finite points")]
    NonFinitePolyline,
    #[error("radius must be finite and > 0")]
    InvalidRadius,
    #[error("sweep requires at least 3 divisions")]
    NotEnoughDivisions,
    #[error("uv scale must be finite")]
    InvalidUvScale,
    #[error("sweep polyline has no segment of non-zero length")]
    DegeneratePolyline,
}

/// Orthonormal frame at one polyline sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportFrame {
    pub position: Point3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
    /// Cumulative arc length up to this sample.
    pub length: f64,
    /// `1 / cos(θ/2)` for the angle θ between the adjacent segments.
    pub width: f64,
}

/// First and last point coincide (distance within 1e-3).
#[must_use]
pub fn is_closed_polyline(points: &[Point3]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 2 => {
            CLOSURE.approx_eq_point3(*first, *last)
        }
        _ => false,
    }
}

/// One unit tangent per sample: the direction of the segment leaving it, with
/// the last entry repeating the final segment (open) or the first (closed).
///
/// Zero-length segments borrow the nearest valid direction and add a warning.
pub fn segment_tangents(
    points: &[Point3],
    closed: bool,
) -> Result<(Vec<Vec3>, Vec<String>), SweepError> {
    if points.len() < 2 {
        return Err(SweepError::PolylineTooShort);
    }
    let mut warnings = Vec::new();
    let raw: Vec<Option<Vec3>> = points
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).normalized())
        .collect();

    let first_valid = raw
        .iter()
        .flatten()
        .next()
        .copied()
        .ok_or(SweepError::DegeneratePolyline)?;

    let mut tangents = Vec::with_capacity(points.len());
    let mut last_valid = first_valid;
    for (i, tangent) in raw.iter().enumerate() {
        match tangent {
            Some(t) => {
                last_valid = *t;
                tangents.push(*t);
            }
            None => {
                warnings.push(format!("segment {i} has zero length; reusing neighbouring tangent"));
                tangents.push(last_valid);
            }
        }
    }

    let tail = if closed { tangents[0] } else { last_valid };
    tangents.push(tail);
    Ok((tangents, warnings))
}

/// Averaged tangent at a joint and its width scale.
///
/// The average of two unit tangents `θ` apart has length `cos(θ/2)`, so the
/// width scale is its inverse. Reversed tangents fall back to `t1` with scale 1.
#[must_use]
pub fn local_tangent(t0: Vec3, t1: Vec3) -> (Vec3, f64) {
    let mid = (t0 + t1) * 0.5;
    if REVERSAL.is_zero_vec3(mid) {
        return (t1, 1.0);
    }
    let len = mid.length();
    (mid / len, 1.0 / len)
}

/// Horizontal normal perpendicular to `tangent`, or the X axis for a vertical tangent.
#[must_use]
pub fn seed_normal(tangent: Vec3) -> Vec3 {
    if tangent.y.abs() > VERTICAL_SEED_LIMIT {
        return Vec3::X;
    }
    Vec3::new(-tangent.z, 0.0, tangent.x)
        .normalized()
        .unwrap_or(Vec3::X)
}

/// Carries the previous normal onto `tangent`: `b = n_prev × t`, `n = t × b`.
fn transport(prev_normal: Vec3, prev_binormal: Vec3, tangent: Vec3) -> (Vec3, Vec3) {
    let binormal = prev_normal
        .cross(tangent)
        .normalized()
        .or_else(|| {
            // tangent turned onto the previous normal; keep the old binormal
            let n = tangent.cross(prev_binormal);
            n.cross(tangent).normalized()
        })
        .unwrap_or(prev_binormal);
    let normal = tangent.cross(binormal).normalized().unwrap_or(prev_normal);
    (normal, binormal)
}

/// Rotation-minimizing frames for every sample of `points`.
pub fn compute_frames(
    points: &[Point3],
) -> Result<(Vec<TransportFrame>, Vec<String>), SweepError> {
    if points.len() < 2 {
        return Err(SweepError::PolylineTooShort);
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(SweepError::NonFinitePolyline);
    }

    let closed = is_closed_polyline(points);
    let (raw, mut warnings) = segment_tangents(points, closed)?;
    let n = points.len();

    let mut joints = Vec::with_capacity(n);
    joints.push(if closed {
        local_tangent(raw[n - 2], raw[0])
    } else {
        (raw[0], 1.0)
    });
    for i in 1..n {
        joints.push(local_tangent(raw[i - 1], raw[i]));
    }
    for i in 1..n {
        if REVERSAL.is_zero_vec3((raw[i - 1] + raw[i]) * 0.5) {
            warnings.push(format!("tangent reversal at sample {i}; width scale capped at 1"));
        }
    }

    let mut frames: Vec<TransportFrame> = Vec::with_capacity(n);
    let mut length = 0.0;
    for (i, &(tangent, width)) in joints.iter().enumerate() {
        if i > 0 {
            length += points[i].distance_to(points[i - 1]);
        }
        let (normal, binormal) = match frames.last() {
            None => {
                let seed = seed_normal(tangent);
                let binormal = seed.cross(tangent).normalized().unwrap_or(Vec3::Z);
                let normal = tangent.cross(binormal).normalized().unwrap_or(seed);
                (normal, binormal)
            }
            Some(prev) => transport(prev.normal, prev.binormal, tangent),
        };
        frames.push(TransportFrame {
            position: points[i],
            tangent,
            normal,
            binormal,
            length,
            width,
        });
    }

    Ok((frames, warnings))
}

/// Tube mesh plus the per-vertex buffers of the deforming shader. Every buffer
/// is indexed like `positions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SweepMesh {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    /// Frame normal of the vertex's ring.
    pub direction_a: Vec<[f64; 3]>,
    /// Frame binormal of the vertex's ring.
    pub direction_b: Vec<[f64; 3]>,
    /// Arc-length U and height-based V of the ring centre.
    pub pattern_uv: Vec<[f64; 2]>,
    pub previous_position: Vec<[f64; 3]>,
    pub previous_direction: Vec<[f64; 3]>,
    pub previous_pattern_uv: Vec<[f64; 2]>,
    pub next_position: Vec<[f64; 3]>,
    pub next_direction: Vec<[f64; 3]>,
    pub next_pattern_uv: Vec<[f64; 2]>,
    pub faces: Vec<PolyFace>,
    pub divisions: usize,
    pub ring_count: usize,
    pub closed: bool,
}

impl SweepMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Index of vertex `division` on ring `ring`.
    #[must_use]
    pub fn ring_index(&self, ring: usize, division: usize) -> u32 {
        (ring * self.divisions + division % self.divisions) as u32
    }

    #[must_use]
    pub fn to_poly_mesh(&self) -> PolyMesh {
        PolyMesh::new(self.positions.clone(), self.faces.clone())
    }

    /// Triangulated render mesh carrying the tube normals and UVs.
    #[must_use]
    pub fn to_geom_mesh(&self) -> GeomMesh {
        let indices = self
            .faces
            .iter()
            .flat_map(PolyFace::triangles)
            .flatten()
            .collect();
        GeomMesh::with_attributes(
            self.positions.clone(),
            indices,
            Some(self.uvs.clone()),
            Some(self.normals.clone()),
        )
    }
}

/// Face list joining consecutive rings, each ring wrapping `j + 1 mod divisions`.
#[must_use]
pub fn sweep_faces(ring_count: usize, divisions: usize, layout: FaceLayout) -> Vec<PolyFace> {
    let mut faces = Vec::with_capacity(ring_count.saturating_sub(1) * divisions * 2);
    for i in 0..ring_count.saturating_sub(1) {
        let ring = i * divisions;
        let next_ring = (i + 1) * divisions;
        for j in 0..divisions {
            let j_next = (j + 1) % divisions;
            let a = (ring + j) as u32;
            let b = (ring + j_next) as u32;
            let c = (next_ring + j) as u32;
            let d = (next_ring + j_next) as u32;
            match layout {
                FaceLayout::Triangles => {
                    faces.push(PolyFace::Triangle([a, b, c]));
                    faces.push(PolyFace::Triangle([b, d, c]));
                }
                FaceLayout::Quads => faces.push(PolyFace::Quad([a, b, d, c])),
            }
        }
    }
    faces
}

/// Builds the tube around `points`.
pub fn sweep_polyline(
    points: &[Point3],
    options: SweepOptions,
) -> Result<(SweepMesh, GeomMeshDiagnostics), SweepError> {
    if !options.radius.is_finite() || options.radius <= 0.0 {
        return Err(SweepError::InvalidRadius);
    }
    if options.divisions < 3 {
        return Err(SweepError::NotEnoughDivisions);
    }
    if !options.uv_scale.is_finite() {
        return Err(SweepError::InvalidUvScale);
    }

    let (frames, warnings) = compute_frames(points)?;
    let divisions = options.divisions;
    let ring_count = frames.len();
    let vertex_count = ring_count * divisions;

    let u_delta = options.uv_scale / (2.0 * PI * options.radius);
    let v_delta = options.uv_scale / divisions as f64;
    let angle_step = 2.0 * PI / divisions as f64;
    let pattern = |frame: &TransportFrame| [frame.length * u_delta, frame.position.y * u_delta];

    let first = frames[0];
    let last = frames[ring_count - 1];
    let start_tangent = (frames[1].position - first.position)
        .normalized()
        .unwrap_or(first.tangent);
    let end_tangent = (last.position - frames[ring_count - 2].position)
        .normalized()
        .unwrap_or(last.tangent);
    let before_start = (
        (first.position - start_tangent).to_array(),
        first.normal.to_array(),
        [-u_delta, first.position.y * u_delta],
    );
    let after_end = (
        (last.position + end_tangent).to_array(),
        last.normal.to_array(),
        [(last.length + 1.0) * u_delta, last.position.y * u_delta],
    );

    let mut mesh = SweepMesh {
        divisions,
        ring_count,
        closed: is_closed_polyline(points),
        ..SweepMesh::default()
    };
    let buffers3 = [
        &mut mesh.positions,
        &mut mesh.normals,
        &mut mesh.direction_a,
        &mut mesh.direction_b,
        &mut mesh.previous_position,
        &mut mesh.previous_direction,
        &mut mesh.next_position,
        &mut mesh.next_direction,
    ];
    for buffer in buffers3 {
        buffer.reserve(vertex_count);
    }

    for (i, frame) in frames.iter().enumerate() {
        let previous = match i.checked_sub(1).map(|p| &frames[p]) {
            Some(prev) => (prev.position.to_array(), prev.normal.to_array(), pattern(prev)),
            None => before_start,
        };
        let next = match frames.get(i + 1) {
            Some(next) => (next.position.to_array(), next.normal.to_array(), pattern(next)),
            None => after_end,
        };
        let radius = if options.apply_width_scale {
            options.radius * frame.width
        } else {
            options.radius
        };
        let u = frame.length * u_delta;

        for j in 0..divisions {
            let angle = j as f64 * angle_step;
            let direction = frame.normal * angle.cos() + frame.binormal * angle.sin();

            mesh.positions.push((frame.position + direction * radius).to_array());
            mesh.normals.push(direction.to_array());
            mesh.uvs.push([u, j as f64 * v_delta]);
            mesh.direction_a.push(frame.normal.to_array());
            mesh.direction_b.push(frame.binormal.to_array());
            mesh.pattern_uv.push(pattern(frame));
            mesh.previous_position.push(previous.0);
            mesh.previous_direction.push(previous.1);
            mesh.previous_pattern_uv.push(previous.2);
            mesh.next_position.push(next.0);
            mesh.next_direction.push(next.1);
            mesh.next_pattern_uv.push(next.2);
        }
    }

    mesh.faces = sweep_faces(ring_count, divisions, options.layout);

    let mut diagnostics = face_diagnostics(
        mesh.positions.len(),
        mesh.faces.iter().map(PolyFace::indices),
    );
    diagnostics.warnings.extend(warnings);
    for warning in &diagnostics.warnings {
        log::warn!("sweep: {warning}");
    }
    log::debug!("sweep: {diagnostics}");

    Ok((mesh, diagnostics))
}
