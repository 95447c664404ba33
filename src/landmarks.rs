// src/landmarks.rs
use serde::{Deserialize, Serialize};

/// A 2D landmark coordinate (normalized or pixel space).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point { x, y }
    }
}

// MediaPipe Pose indices (33 landmarks)
pub const NOSE: usize = 0;
pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_FOOT: usize = 31;
pub const RIGHT_FOOT: usize = 32;

/// Anatomical roles of the reduced 8-point side subset, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Ear,
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
    Foot,
}

impl BodyPart {
    pub const ALL: [BodyPart; 8] = [
        BodyPart::Ear,
        BodyPart::Shoulder,
        BodyPart::Elbow,
        BodyPart::Wrist,
        BodyPart::Hip,
        BodyPart::Knee,
        BodyPart::Ankle,
        BodyPart::Foot,
    ];

    /// Slot of this role inside a reduced 8-point list.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Maps a full-pose index onto a reduced-list slot.
    ///
    /// Both body sides share a slot. The nose and any index outside the
    /// table fall back to slot 0.
    pub fn slot_for_pose_index(index: usize) -> usize {
        match index {
            LEFT_EAR | RIGHT_EAR => 0,
            LEFT_SHOULDER | RIGHT_SHOULDER => 1,
            LEFT_ELBOW | RIGHT_ELBOW => 2,
            LEFT_WRIST | RIGHT_WRIST => 3,
            LEFT_HIP | RIGHT_HIP => 4,
            LEFT_KNEE | RIGHT_KNEE => 5,
            LEFT_ANKLE | RIGHT_ANKLE => 6,
            LEFT_FOOT | RIGHT_FOOT => 7,
            _ => 0,
        }
    }

    /// Full-pose index of this role on the given side.
    pub fn pose_index(self, side: Side) -> usize {
        let (left, right) = match self {
            BodyPart::Ear => (LEFT_EAR, RIGHT_EAR),
            BodyPart::Shoulder => (LEFT_SHOULDER, RIGHT_SHOULDER),
            BodyPart::Elbow => (LEFT_ELBOW, RIGHT_ELBOW),
            BodyPart::Wrist => (LEFT_WRIST, RIGHT_WRIST),
            BodyPart::Hip => (LEFT_HIP, RIGHT_HIP),
            BodyPart::Knee => (LEFT_KNEE, RIGHT_KNEE),
            BodyPart::Ankle => (LEFT_ANKLE, RIGHT_ANKLE),
            BodyPart::Foot => (LEFT_FOOT, RIGHT_FOOT),
        };
        match side {
            Side::Left => left,
            Side::Right => right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Pixel geometry of the frame a normalized detection was made on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl FrameGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        FrameGeometry { width, height, scale: 1.0 }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    fn to_pixels(&self, p: Point) -> Point {
        Point::new(p.x * self.width * self.scale, p.y * self.height * self.scale)
    }
}

/// The eight landmarks of one body side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideLandmarks {
    pub ear: Point,
    pub shoulder: Point,
    pub elbow: Point,
    pub wrist: Point,
    pub hip: Point,
    pub knee: Point,
    pub ankle: Point,
    pub foot: Point,
}

impl SideLandmarks {
    /// Reads a reduced 8-point list; absent slots become the origin.
    pub fn from_slice(points: &[Point]) -> Self {
        let at = |part: BodyPart| points.get(part.slot()).copied().unwrap_or(Point::ORIGIN);
        SideLandmarks {
            ear: at(BodyPart::Ear),
            shoulder: at(BodyPart::Shoulder),
            elbow: at(BodyPart::Elbow),
            wrist: at(BodyPart::Wrist),
            hip: at(BodyPart::Hip),
            knee: at(BodyPart::Knee),
            ankle: at(BodyPart::Ankle),
            foot: at(BodyPart::Foot),
        }
    }

    /// Extracts one side of a full normalized 33-point detection, in pixels.
    pub fn from_pose(pose: &[Point], side: Side, frame: FrameGeometry) -> Self {
        let points: Vec<Point> = BodyPart::ALL
            .iter()
            .map(|part| pose_point(pose, part.pose_index(side), frame))
            .collect();
        Self::from_slice(&points)
    }

    /// Reduced-list form, in slot order.
    pub fn to_vec(&self) -> Vec<Point> {
        vec![
            self.ear,
            self.shoulder,
            self.elbow,
            self.wrist,
            self.hip,
            self.knee,
            self.ankle,
            self.foot,
        ]
    }

    /// Vertical shoulder-to-foot extent; the larger side faces the camera.
    pub fn vertical_extent(&self) -> f32 {
        (self.foot.y - self.shoulder.y).abs()
    }
}

/// Nose of a full normalized detection, in pixels.
pub fn nose_from_pose(pose: &[Point], frame: FrameGeometry) -> Point {
    pose_point(pose, NOSE, frame)
}

fn pose_point(pose: &[Point], index: usize, frame: FrameGeometry) -> Point {
    pose.get(index)
        .map(|p| frame.to_pixels(*p))
        .unwrap_or(Point::ORIGIN)
}
