mod core;
mod curves;
mod diagnostics;
mod export;
mod growth;
mod loft;
mod mesh;
mod sweep;

pub use core::{Point3, Tolerance, Vec2, Vec3};
pub use curves::{
    CurveError, DEFAULT_Z_DOMAIN, DirectionAngles, MAX_CATMULL_ITERATIONS, catmull_polygon,
    catmull_polygon_n, catmull_polyline, catmull_polyline_n, circle, directed_curve,
    gyroid_offset, helix, line_set, offset_polyline, position_scaling, rrreefs_profile,
    scale_function, sd_gyroid, sinusoid, tweening_z,
};
pub use diagnostics::GeomMeshDiagnostics;
pub use export::{ExportData, ExportError};
pub use growth::{Growth, GrowthError, GrowthOptions, GrowthStats, SpatialHash};
pub use loft::{LoftError, LoftOptions, loft_profiles};
pub use mesh::{GeomMesh, PolyFace, PolyMesh};
pub use sweep::{
    FaceLayout, SweepError, SweepMesh, SweepOptions, TransportFrame, compute_frames,
    is_closed_polyline, local_tangent, seed_normal, segment_tangents, sweep_faces,
    sweep_polyline,
};

#[cfg(test)]
mod tests;
