use serde::Serialize;

use crate::landmarks::{Point, SideLandmarks};

/// Joint angles extracted from one body side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JointAngles {
    pub elbow: i32,
    pub shoulder: i32,
    pub hip: i32,
    pub knee: i32,
    /// Ear-elbow-hip, vertex at the elbow. Drives phase classification.
    pub ear_elbow_hip: i32,
}

impl JointAngles {
    pub fn from_side(side: &SideLandmarks) -> Self {
        JointAngles {
            elbow: joint_angle(side.shoulder, side.elbow, side.wrist),
            shoulder: joint_angle(side.ear, side.shoulder, side.hip),
            hip: joint_angle(side.shoulder, side.hip, side.knee),
            knee: joint_angle(side.hip, side.knee, side.ankle),
            ear_elbow_hip: joint_angle(side.ear, side.elbow, side.hip),
        }
    }
}

/// Angle at `vertex` between the rays to `a` and `c`, in whole degrees.
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2|), clamped to [-1, 1] and truncated.
/// A zero-length ray gives a non-finite cosine, which truncates to 0.
pub fn joint_angle(a: Point, vertex: Point, c: Point) -> i32 {
    let v1 = (a.x - vertex.x, a.y - vertex.y);
    let v2 = (c.x - vertex.x, c.y - vertex.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    // `as` saturates and maps NaN to 0
    (cos_angle.acos() as f64).to_degrees() as i32
}

/// Angle at the nose between both shoulders. Large values mean the subject
/// is not square to the camera.
pub fn offset_angle(left_shoulder: Point, nose: Point, right_shoulder: Point) -> i32 {
    joint_angle(left_shoulder, nose, right_shoulder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_joint() {
        let angle = joint_angle(Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(1.0, 0.0));
        assert_eq!(angle, 180);
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(0.5, 0.5));
        assert_eq!(angle, 90);
    }

    #[test]
    fn test_angle_is_truncated() {
        // 2 * atan(1 / 2) = 53.13°
        let angle = joint_angle(Point::new(-1.0, 2.0), Point::new(0.0, 0.0), Point::new(1.0, 2.0));
        assert_eq!(angle, 53);
    }

    #[test]
    fn test_degenerate_ray_is_zero() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(joint_angle(p, p, Point::new(10.0, 0.0)), 0);
        assert_eq!(joint_angle(Point::ORIGIN, Point::ORIGIN, Point::ORIGIN), 0);
    }

    #[test]
    fn test_angles_stay_in_range() {
        let coords = [-300.0f32, -7.5, 0.0, 0.25, 12.0, 640.0];
        for &ax in &coords {
            for &cy in &coords {
                let a = Point::new(ax, 1.0);
                let b = Point::new(2.0, -3.0);
                let c = Point::new(-5.0, cy);
                let angle = joint_angle(a, b, c);
                assert!((0..=180).contains(&angle), "angle {} out of range", angle);
            }
        }
    }

    #[test]
    fn test_from_side_vertical_body() {
        let side = SideLandmarks {
            ear: Point::new(0.0, 0.0),
            shoulder: Point::new(0.0, 10.0),
            elbow: Point::new(20.0, 25.0),
            wrist: Point::new(40.0, 40.0),
            hip: Point::new(0.0, 50.0),
            knee: Point::new(0.0, 80.0),
            ankle: Point::new(0.0, 110.0),
            foot: Point::new(0.0, 120.0),
        };
        let angles = JointAngles::from_side(&side);
        assert_eq!(angles.shoulder, 180);
        assert_eq!(angles.hip, 180);
        assert_eq!(angles.knee, 180);
        assert!(angles.elbow >= 179);
        // 2 * atan(25 / 20) = 102.68°
        assert_eq!(angles.ear_elbow_hip, 102);
    }
}
