//! Quad-strip lofting through same-length profile polygons.
//!
//! Point `j` of profile `i` becomes vertex `i·m + j`; consecutive profiles are
//! stitched with quads `[a, b, d, c]` where `a, b` lie on profile `i` and
//! `c, d` on profile `i + 1`. No frames are computed: profiles must already be
//! consistently oriented.

use super::Point3;
use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{PolyFace, PolyMesh, face_diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoftOptions {
    /// Stitch the last profile back to the first.
    pub close: bool,
    /// Treat every profile as a closed polygon and stitch its last point to its first.
    pub closed_profiles: bool,
}

impl Default for LoftOptions {
    fn default() -> Self {
        Self {
            close: true,
            closed_profiles: true,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoftError {
    #[error("loft requires at least 2 profiles, got {count}")]
    NotEnoughProfiles { count: usize },
    #[error("closed loft requires at least 3 profiles, got {count}")]
    ClosedLoftTooFewProfiles { count: usize },
    #[error("profile {index} has too few points (has {point_count}, needs {required})")]
    ProfileTooShort {
        index: usize,
        point_count: usize,
        required: usize,
    },
    #[error("profile {index} has {actual} points, expected {expected}")]
    ProfileLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("profile {index} contains non-finite coordinates at point {point_index}")]
    NonFinitePoint { index: usize, point_index: usize },
}

fn validate(profiles: &[Vec<Point3>], options: LoftOptions) -> Result<usize, LoftError> {
    let count = profiles.len();
    if count < 2 {
        return Err(LoftError::NotEnoughProfiles { count });
    }
    if options.close && count < 3 {
        return Err(LoftError::ClosedLoftTooFewProfiles { count });
    }

    let required = if options.closed_profiles { 3 } else { 2 };
    let expected = profiles[0].len();
    for (index, profile) in profiles.iter().enumerate() {
        if profile.len() < required {
            return Err(LoftError::ProfileTooShort {
                index,
                point_count: profile.len(),
                required,
            });
        }
        if profile.len() != expected {
            return Err(LoftError::ProfileLengthMismatch {
                index,
                expected,
                actual: profile.len(),
            });
        }
        if let Some(point_index) = profile.iter().position(|p| !p.is_finite()) {
            return Err(LoftError::NonFinitePoint { index, point_index });
        }
    }
    Ok(expected)
}

/// Stitches `profiles` into a quad mesh.
pub fn loft_profiles(
    profiles: &[Vec<Point3>],
    options: LoftOptions,
) -> Result<(PolyMesh, GeomMeshDiagnostics), LoftError> {
    let m = validate(profiles, options)?;
    let n = profiles.len();

    let positions: Vec<[f64; 3]> = profiles.iter().flatten().map(|p| p.to_array()).collect();

    let strips = if options.close { n } else { n - 1 };
    let columns = if options.closed_profiles { m } else { m - 1 };
    let mut faces = Vec::with_capacity(strips * columns);
    for i in 0..strips {
        let row = i * m;
        let next_row = ((i + 1) % n) * m;
        for j in 0..columns {
            let j_next = (j + 1) % m;
            let a = (row + j) as u32;
            let b = (row + j_next) as u32;
            let c = (next_row + j) as u32;
            let d = (next_row + j_next) as u32;
            faces.push(PolyFace::Quad([a, b, d, c]));
        }
    }

    let diagnostics = face_diagnostics(positions.len(), faces.iter().map(PolyFace::indices));
    log::debug!("loft: {n} profile(s) of {m} point(s), {diagnostics}");
    Ok((PolyMesh::new(positions, faces), diagnostics))
}
