//! Polyline generators and polygon post-processing feeding the sweep mesher and the loft builder.
//!
//! Every generator returns plain point lists; closed curves repeat their first
//! point at the end unless documented otherwise.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::Rng;

use super::{Point3, Vec2, Vec3};

/// Subdivision rounds accepted by [`catmull_polygon_n`].
pub const MAX_CATMULL_ITERATIONS: usize = 10;

/// Smallest `cos(θ/2)` used when scaling an offset direction at a corner.
const MIN_CORNER_COSINE: f64 = 1e-3;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CurveError {
    #[error("curve requires at least {required} points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },
    #[error("{name} must be finite and > 0")]
    InvalidParameter { name: &'static str },
}

fn require_positive(name: &'static str, value: f64) -> Result<(), CurveError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CurveError::InvalidParameter { name })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generators
// ─────────────────────────────────────────────────────────────────────────────

/// Circle in the XZ plane through `divisions + 1` points; the last repeats the first.
pub fn circle(center: Point3, radius: f64, divisions: usize) -> Result<Vec<Point3>, CurveError> {
    require_positive("radius", radius)?;
    if divisions < 3 {
        return Err(CurveError::TooFewPoints {
            required: 3,
            actual: divisions,
        });
    }
    let step = 2.0 * PI / divisions as f64;
    Ok((0..=divisions)
        .map(|i| {
            let angle = if i == divisions { 0.0 } else { step * i as f64 };
            center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        })
        .collect())
}

/// Helix around the Y axis through `start`. `resolution` is the fraction of a
/// half turn per sample; one half turn rises `period_length`.
#[must_use]
pub fn helix(
    start: Point3,
    amplitude: f64,
    period_length: f64,
    resolution: f64,
    count: usize,
) -> Vec<Point3> {
    let angle_step = PI * resolution;
    let rise = period_length / PI * angle_step;
    (0..count)
        .map(|i| {
            let alpha = angle_step * i as f64;
            start + Vec3::new(amplitude * alpha.sin(), rise * i as f64, amplitude * alpha.cos())
        })
        .collect()
}

/// Planar sine wave advancing along Z, oscillating along X.
#[must_use]
pub fn sinusoid(
    start: Point3,
    amplitude: f64,
    period_length: f64,
    resolution: f64,
    count: usize,
) -> Vec<Point3> {
    let angle_step = PI * resolution;
    let advance = period_length / PI * angle_step;
    (0..count)
        .map(|i| {
            let alpha = angle_step * i as f64;
            start + Vec3::new(amplitude * alpha.sin(), 0.0, advance * i as f64)
        })
        .collect()
}

/// `count` evenly spaced points from `start` along `direction`.
#[must_use]
pub fn line_set(start: Point3, direction: Vec3, step: f64, count: usize) -> Vec<Point3> {
    (0..count)
        .map(|i| start + direction * (step * i as f64))
        .collect()
}

/// Euler angles of the initial heading of a [`directed_curve`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionAngles {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl DirectionAngles {
    fn heading(self) -> Vec3 {
        let (sa, ca) = self.alpha.sin_cos();
        let (sb, cb) = self.beta.sin_cos();
        let (sg, cg) = self.gamma.sin_cos();
        Vec3::new(-ca * sb * sg - sa * cg, -sa * sb * sg + ca * cg, cb * sg)
    }
}

/// Random walk whose heading angles drift by up to `angle_delta` per step and
/// whose segment lengths vary by up to `±length_delta / 2`.
pub fn directed_curve(
    rng: &mut impl Rng,
    start: Point3,
    mut angles: DirectionAngles,
    segment_length: f64,
    angle_delta: f64,
    length_delta: f64,
    count: usize,
) -> Vec<Point3> {
    let mut points = Vec::with_capacity(count);
    let mut current = start;
    for _ in 0..count {
        let heading = angles.heading();
        angles.alpha += rng.random::<f64>() * angle_delta;
        angles.beta += rng.random::<f64>() * angle_delta;
        angles.gamma += rng.random::<f64>() * angle_delta;

        let length = segment_length + (rng.random::<f64>() - 0.5) * length_delta;
        current = current + heading * length;
        points.push(current);
    }
    points
}

fn rotate_about_z(v: Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Stadium outline at `height`: two straights of `length` joined by half
/// circles of `radius`, sampled about every `spacing`. The ring is closed and
/// its first point is not repeated.
pub fn rrreefs_profile(
    length: f64,
    radius: f64,
    spacing: f64,
    height: f64,
) -> Result<Vec<Point3>, CurveError> {
    require_positive("length", length)?;
    require_positive("radius", radius)?;
    require_positive("spacing", spacing)?;

    let straight_divisions = ((length / spacing).round() as usize).max(1);
    let arc_divisions = ((radius * FRAC_PI_2 / spacing).round() as usize).max(1);
    let straight_step = Vec3::new(length / straight_divisions as f64, 0.0, 0.0);
    let arc_step = FRAC_PI_2 / arc_divisions as f64;

    let center_a = Point3::new(-length * 0.5, 0.0, height);
    let center_b = Point3::new(length * 0.5, 0.0, height);

    let mut points = Vec::with_capacity(4 * arc_divisions + 2 * straight_divisions);
    let mut current = center_b + Vec3::new(radius, 0.0, 0.0);
    points.push(current);

    let arc = |points: &mut Vec<Point3>, current: &mut Point3, center: Point3, steps: usize| {
        for _ in 0..steps {
            *current = center + rotate_about_z(*current - center, arc_step);
            points.push(*current);
        }
    };

    arc(&mut points, &mut current, center_b, arc_divisions);
    for _ in 0..straight_divisions {
        current = current - straight_step;
        points.push(current);
    }
    arc(&mut points, &mut current, center_a, 2 * arc_divisions);
    for _ in 0..straight_divisions {
        current = current + straight_step;
        points.push(current);
    }
    // the last quarter arc ends on the first point
    arc(&mut points, &mut current, center_b, arc_divisions - 1);

    Ok(points)
}

// ─────────────────────────────────────────────────────────────────────────────
// Post-processing
// ─────────────────────────────────────────────────────────────────────────────

/// One round of corner-cutting on a closed polygon: each vertex is replaced by
/// the average of itself and its neighbouring edge midpoints, followed by the
/// midpoint of its outgoing edge.
#[must_use]
pub fn catmull_polygon(points: &[Point3]) -> Vec<Point3> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let midpoints: Vec<Point3> = (0..n)
        .map(|i| points[i].lerp(points[(i + 1) % n], 0.5))
        .collect();

    let mut result = Vec::with_capacity(n * 2);
    for i in 0..n {
        let before = midpoints[(i + n - 1) % n];
        let smoothed = before.lerp(midpoints[i], 0.5).lerp(points[i], 0.5);
        result.push(smoothed);
        result.push(midpoints[i]);
    }
    result
}

/// `iterations` rounds of [`catmull_polygon`], capped at [`MAX_CATMULL_ITERATIONS`].
#[must_use]
pub fn catmull_polygon_n(points: &[Point3], iterations: usize) -> Vec<Point3> {
    let mut current = points.to_vec();
    for _ in 0..iterations.min(MAX_CATMULL_ITERATIONS) {
        current = catmull_polygon(&current);
    }
    current
}

/// One round of corner-cutting on an open polyline. Interior vertices are
/// smoothed like [`catmull_polygon`] and every segment gains its midpoint;
/// both endpoints stay where they are, so `n` points become `2n - 1`.
#[must_use]
pub fn catmull_polyline(points: &[Point3]) -> Vec<Point3> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let midpoints: Vec<Point3> = points.windows(2).map(|w| w[0].lerp(w[1], 0.5)).collect();

    let mut result = Vec::with_capacity(n * 2 - 1);
    result.push(points[0]);
    result.push(midpoints[0]);
    for i in 1..n - 1 {
        let smoothed = midpoints[i - 1].lerp(midpoints[i], 0.5).lerp(points[i], 0.5);
        result.push(smoothed);
        result.push(midpoints[i]);
    }
    result.push(points[n - 1]);
    result
}

/// `iterations` rounds of [`catmull_polyline`], capped at [`MAX_CATMULL_ITERATIONS`].
#[must_use]
pub fn catmull_polyline_n(points: &[Point3], iterations: usize) -> Vec<Point3> {
    let mut current = points.to_vec();
    for _ in 0..iterations.min(MAX_CATMULL_ITERATIONS) {
        current = catmull_polyline(&current);
    }
    current
}

/// Height range over which [`scale_function`] falls from 1 to 0.
pub const DEFAULT_Z_DOMAIN: (f64, f64) = (0.0, 500.0);

/// Linear taper: 1 at `domain.0`, 0 at `domain.1`. An empty domain does not scale.
#[must_use]
pub fn scale_function(z: f64, domain: (f64, f64)) -> f64 {
    let span = domain.1 - domain.0;
    if span.abs() < f64::EPSILON {
        return 1.0;
    }
    1.0 - (z - domain.0) / span
}

/// Scales the y coordinate of `p` by `scale(p.z)`.
#[must_use]
pub fn position_scaling(p: Point3, scale: impl Fn(f64) -> f64) -> Point3 {
    Point3::new(p.x, p.y * scale(p.z), p.z)
}

/// Joins stacked layers into one rising polyline: layer `k` climbs from
/// `k · layer_height` in equal steps per point, so consecutive layers meet
/// without a vertical jump.
#[must_use]
pub fn tweening_z(layers: &[Vec<Point3>], layer_height: f64) -> Vec<Point3> {
    let mut tweened = Vec::with_capacity(layers.iter().map(Vec::len).sum());
    for (k, layer) in layers.iter().enumerate() {
        if layer.is_empty() {
            continue;
        }
        let base = k as f64 * layer_height;
        let step = layer_height / layer.len() as f64;
        tweened.extend(
            layer
                .iter()
                .enumerate()
                .map(|(i, p)| Point3::new(p.x, p.y, base + step * i as f64)),
        );
    }
    tweened
}

/// Counter-clockwise angle in `[0, 2π)` from `from` to `to`.
fn positive_angle(from: Vec2, to: Vec2) -> f64 {
    let angle = to.y.atan2(to.x) - from.y.atan2(from.x);
    if angle < 0.0 { angle + 2.0 * PI } else { angle }
}

fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Offsets every vertex of the closed polygon `points` along its corner
/// bisector by `distance(point, index)`. The bisector is scaled by
/// `1 / cos(θ/2)` so both adjacent edges move by the same distance.
pub fn offset_polyline(
    points: &[Vec2],
    distance: impl Fn(Vec2, usize) -> f64,
) -> Result<Vec<Vec2>, CurveError> {
    let n = points.len();
    if n < 3 {
        return Err(CurveError::TooFewPoints {
            required: 3,
            actual: n,
        });
    }
    let directions: Vec<Vec2> = (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).normalized().unwrap_or(Vec2::ZERO))
        .collect();

    Ok((0..n)
        .map(|i| {
            let incoming = directions[(i + n - 1) % n];
            let outgoing = directions[i];
            let angle = positive_angle(outgoing, incoming);
            let scale = 1.0 / (angle * 0.5).cos().abs().max(MIN_CORNER_COSINE);
            let offset = rotate(outgoing, FRAC_PI_2 + angle * 0.5) * scale;
            points[i] + offset * distance(points[i], i)
        })
        .collect())
}

/// Gyroid field value `(Σ sin) · (Σ cos)` of the scaled coordinates.
#[must_use]
pub fn sd_gyroid(p: Point3, scale: f64) -> f64 {
    let (x, y, z) = (p.x * scale, p.y * scale, p.z * scale);
    (x.sin() + y.sin() + z.sin()) * (x.cos() + y.cos() + z.cos())
}

/// Offset distance for layer `height` that follows the gyroid field.
#[must_use]
pub fn gyroid_offset(p: Vec2, height: f64) -> f64 {
    sd_gyroid(p.to_point3(height), 0.1) * 5.0 + 5.0
}
