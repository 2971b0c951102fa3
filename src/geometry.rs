// src/geometry.rs
//
// Planar joint geometry on normalized image coordinates.

/// Vectors shorter than this have no usable direction.
const MIN_VECTOR_LENGTH: f64 = 1e-9;

/// Angle at vertex `b` between rays b→a and b→c, in degrees within [0, 180].
///
/// Returns 0.0 when either ray has (near-)zero length or the inputs are
/// not finite.
pub fn angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);

    let mag_ba = ba.0.hypot(ba.1);
    let mag_bc = bc.0.hypot(bc.1);

    if !(mag_ba >= MIN_VECTOR_LENGTH && mag_bc >= MIN_VECTOR_LENGTH) {
        return 0.0;
    }

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let cos_angle = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    if cos_angle.is_nan() {
        return 0.0;
    }

    cos_angle.acos().to_degrees()
}

/// Euclidean distance between two points.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-3;

    #[test]
    fn test_colinear_is_straight() {
        let angle = angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0));
        assert!((angle - 180.0).abs() < TOLERANCE, "got {angle}");

        let diagonal = super::angle((0.1, 0.1), (0.4, 0.4), (0.9, 0.9));
        assert!((diagonal - 180.0).abs() < TOLERANCE, "got {diagonal}");
    }

    #[test]
    fn test_right_angle() {
        let angle = angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5));
        assert!((angle - 90.0).abs() < TOLERANCE, "got {angle}");
    }

    #[test]
    fn test_folded_back_is_zero() {
        let angle = angle((1.0, 0.0), (0.0, 0.0), (2.0, 0.0));
        assert!(angle.abs() < TOLERANCE, "got {angle}");
    }

    #[test]
    fn test_degenerate_vertex_returns_zero() {
        assert_eq!(angle((0.3, 0.3), (0.3, 0.3), (0.9, 0.1)), 0.0);
        assert_eq!(angle((0.2, 0.8), (0.5, 0.5), (0.5, 0.5)), 0.0);
        assert_eq!(angle((f64::NAN, 0.0), (0.5, 0.5), (0.1, 0.1)), 0.0);
    }

    #[test]
    fn test_angle_stays_in_range() {
        let points = [
            (0.0, 0.0),
            (1.0, 0.0),
            (0.3, 0.7),
            (-0.4, 0.2),
            (0.9, -0.9),
            (1e-4, 2e-4),
        ];
        for a in points {
            for b in points {
                for c in points {
                    let v = angle(a, b, c);
                    assert!((0.0..=180.0).contains(&v), "{a:?} {b:?} {c:?} -> {v}");
                }
            }
        }
    }

    #[test]
    fn test_distance() {
        assert!((distance((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert_eq!(distance((0.2, 0.2), (0.2, 0.2)), 0.0);
    }
}
