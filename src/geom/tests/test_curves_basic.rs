use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::geom::{
    CurveError, DEFAULT_Z_DOMAIN, DirectionAngles, MAX_CATMULL_ITERATIONS, Point3, Vec2, Vec3,
    catmull_polygon, catmull_polygon_n, catmull_polyline, catmull_polyline_n, circle,
    directed_curve, gyroid_offset, helix, line_set, offset_polyline, position_scaling,
    rrreefs_profile, scale_function, sd_gyroid, sinusoid, tweening_z,
};

fn square() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]
}

#[test]
fn circle_repeats_its_first_point() {
    let points = circle(Point3::new(1.0, 2.0, 3.0), 2.0, 12).expect("circle");
    assert_eq!(points.len(), 13);
    assert_eq!(points.first(), points.last());
    for p in &points {
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!((p.distance_to(Point3::new(1.0, 2.0, 3.0)) - 2.0).abs() < 1e-12);
    }
    assert!(matches!(
        circle(Point3::ORIGIN, -1.0, 12),
        Err(CurveError::InvalidParameter { name: "radius" })
    ));
}

#[test]
fn helix_rises_one_period_per_half_turn() {
    let points = helix(Point3::ORIGIN, 1.0, 4.0, 0.25, 9);
    assert_eq!(points.len(), 9);
    // eight quarter-of-a-half-turn steps make two half turns
    assert!((points[8].y - 8.0).abs() < 1e-9);
    assert!((points[4].x.hypot(points[4].z) - 1.0).abs() < 1e-12);
}

#[test]
fn sinusoid_and_line_set_advance_evenly() {
    let wave = sinusoid(Point3::ORIGIN, 2.0, 3.0, 0.5, 5);
    assert!((wave[2].z - 3.0).abs() < 1e-9);
    assert!(wave[2].x.abs() < 1e-9);
    assert!((wave[1].x - 2.0).abs() < 1e-9);

    let line = line_set(Point3::ORIGIN, Vec3::Y, 0.5, 4);
    assert_eq!(line[3], Point3::new(0.0, 1.5, 0.0));
}

#[test]
fn directed_curve_is_reproducible_for_a_seed() {
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        directed_curve(&mut rng, Point3::ORIGIN, DirectionAngles::default(), 1.0, 0.1, 0.2, 20)
    };
    let a = run(7);
    assert_eq!(a.len(), 20);
    assert_eq!(a, run(7));
    assert_ne!(a[0], Point3::ORIGIN);

    let mut previous = Point3::ORIGIN;
    for p in a {
        let step = p.distance_to(previous);
        assert!((0.9 - 1e-9..=1.1 + 1e-9).contains(&step));
        previous = p;
    }
}

#[test]
fn rrreefs_profile_is_a_closed_stadium() {
    let points = rrreefs_profile(10.0, 2.0, 1.0, 5.0).expect("profile");
    // arcs of round(π) = 3 steps per quarter, straights of 10 steps
    assert_eq!(points.len(), 4 * 3 + 2 * 10);
    assert!(points.iter().all(|p| (p.z - 5.0).abs() < 1e-12));
    assert!(points[0].distance_to(*points.last().expect("points")) > 1e-6);
    assert!((points[0].x - 7.0).abs() < 1e-12);
    assert!(points.iter().all(|p| p.y.abs() <= 2.0 + 1e-9));
}

#[test]
fn catmull_doubles_points_per_round() {
    let once = catmull_polygon(&square());
    assert_eq!(once.len(), 8);
    assert_eq!(once[1], Point3::new(0.5, 0.0, 0.0));
    assert_eq!(once[0], Point3::new(0.125, 0.125, 0.0));

    assert_eq!(catmull_polygon_n(&square(), 3).len(), 32);
    assert_eq!(
        catmull_polygon_n(&square(), 50).len(),
        4 << MAX_CATMULL_ITERATIONS
    );
}

#[test]
fn open_catmull_keeps_its_endpoints() {
    let path = square();
    let once = catmull_polyline(&path);
    assert_eq!(once.len(), 2 * path.len() - 1);
    assert_eq!(once.first(), path.first());
    assert_eq!(once.last(), path.last());
    assert_eq!(once[1], Point3::new(0.5, 0.0, 0.0));
    assert!(once[2].distance_to(Point3::new(0.875, 0.125, 0.0)) < 1e-12);

    let thrice = catmull_polyline_n(&path, 3);
    assert_eq!(thrice.len(), (path.len() - 1) * 8 + 1);
    assert_eq!(thrice.first(), path.first());
    assert_eq!(thrice.last(), path.last());

    let short = [Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)];
    assert_eq!(catmull_polyline_n(&short, 4), short.to_vec());
}

#[test]
fn tweening_spreads_layers_into_one_rising_path() {
    let path = tweening_z(&[square(), Vec::new(), square()], 2.0);
    assert_eq!(path.len(), 8);
    let heights: Vec<f64> = path.iter().map(|p| p.z).collect();
    assert_eq!(heights, vec![0.0, 0.5, 1.0, 1.5, 4.0, 4.5, 5.0, 5.5]);
    assert_eq!((path[6].x, path[6].y), (1.0, 1.0));
}

#[test]
fn position_scaling_tapers_y_with_height() {
    assert_eq!(scale_function(0.0, DEFAULT_Z_DOMAIN), 1.0);
    assert_eq!(scale_function(250.0, DEFAULT_Z_DOMAIN), 0.5);
    assert_eq!(scale_function(500.0, DEFAULT_Z_DOMAIN), 0.0);
    assert_eq!(scale_function(3.0, (2.0, 2.0)), 1.0);

    let scaled = position_scaling(Point3::new(2.0, 4.0, 250.0), |z| {
        scale_function(z, DEFAULT_Z_DOMAIN)
    });
    assert_eq!(scaled, Point3::new(2.0, 2.0, 250.0));
}

#[test]
fn offset_polyline_moves_square_edges_uniformly() {
    // clockwise square, so a positive offset grows it
    let square = [
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
    ];
    let grown = offset_polyline(&square, |_, _| 0.5).expect("offset");
    let expected = [
        Vec2::new(-0.5, -0.5),
        Vec2::new(-0.5, 1.5),
        Vec2::new(1.5, 1.5),
        Vec2::new(1.5, -0.5),
    ];
    for (g, e) in grown.iter().zip(expected) {
        assert!(g.distance_to(e) < 1e-9, "{g:?} != {e:?}");
    }

    assert_eq!(
        offset_polyline(&square[..2], |_, _| 1.0).unwrap_err(),
        CurveError::TooFewPoints { required: 3, actual: 2 }
    );
}

#[test]
fn gyroid_offset_stays_in_band() {
    assert_eq!(sd_gyroid(Point3::ORIGIN, 1.0), 0.0);
    for i in 0..20 {
        let p = Vec2::new(f64::from(i) * 3.7, f64::from(i) * -1.3);
        let d = gyroid_offset(p, 2.0);
        // |Σsin · Σcos| ≤ 4.5
        assert!((5.0 - 22.5..=5.0 + 22.5).contains(&d));
    }
}
