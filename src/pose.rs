// src/pose.rs
use std::time::Instant;

use serde::Serialize;

use crate::features::{self, JointAngles};
use crate::landmarks::{self, FrameGeometry, Point, Side, SideLandmarks};
use crate::phase::{self, Phase, PhaseSequence};
use crate::thresholds::Thresholds;

pub const MSG_CORRECT: &str = "CORRECT";
pub const MSG_INCORRECT: &str = "INCORRECT";
pub const MSG_CAMERA_NOT_ALIGNED: &str = "CAMERA NOT ALIGNED PROPERLY!!!";
pub const MSG_CONTINUE_LOWERING: &str = "Continue lowering";

/// Minimum-angle violations checked outside the rest phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureFault {
    BentNeck,
    BentHip,
    BentKnee,
}

impl PostureFault {
    pub const ALL: [PostureFault; 3] = [PostureFault::BentNeck, PostureFault::BentHip, PostureFault::BentKnee];

    pub fn message(self) -> &'static str {
        match self {
            PostureFault::BentNeck => "BENT NECK",
            PostureFault::BentHip => "BENT HIP",
            PostureFault::BentKnee => "BENT KNEE",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-frame result handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub correct_count: u32,
    pub incorrect_count: u32,
    /// `CORRECT` / `INCORRECT` on the frame a repetition is judged, else empty.
    pub message: String,
    pub phase: Phase,
    pub elbow_angle: i32,
    pub shldr_angle: i32,
    pub hip_angle: i32,
    pub knee_angle: i32,
    pub ear_elbow_hip_angle: i32,
    pub camera_warning: bool,
    pub offset_angle: i32,
    pub lower_hips: bool,
    /// Faults still inside their display window.
    pub displayed_faults: Vec<PostureFault>,
    pub feedback_list: Vec<String>,
}

/// Debounced on-screen flag for one posture fault.
#[derive(Debug, Clone, Copy, Default)]
struct FaultDisplay {
    shown: bool,
    frames: u32,
}

/// Elapsed-time accumulator measured between successive frames.
#[derive(Debug, Clone, Copy)]
struct InactivityTimer {
    elapsed_secs: f64,
    since: Instant,
}

impl InactivityTimer {
    fn new(now: Instant) -> Self {
        InactivityTimer { elapsed_secs: 0.0, since: now }
    }

    fn accumulate(&mut self, now: Instant) -> f64 {
        self.elapsed_secs += now.saturating_duration_since(self.since).as_secs_f64();
        self.since = now;
        self.elapsed_secs
    }

    fn restart(&mut self, now: Instant) {
        self.elapsed_secs = 0.0;
        self.since = now;
    }
}

/// Rule-based repetition counter.
///
/// Feed one frame of landmarks per call; each call returns a self-contained
/// [`Feedback`]. Not meant for concurrent use: callers serialize frames.
#[derive(Debug, Clone)]
pub struct RepetitionAnalyzer {
    thresholds: Thresholds,
    state_seq: PhaseSequence,
    correct_count: u32,
    incorrect_count: u32,
    incorrect_posture: bool,
    prev_state: Phase,
    curr_state: Phase,
    display: [FaultDisplay; 3],
    lower_hips: bool,
    inactive: InactivityTimer,
    inactive_front: InactivityTimer,
    camera_warning: bool,
    offset_angle: i32,
}

impl RepetitionAnalyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self::new_at(thresholds, Instant::now())
    }

    /// Like [`RepetitionAnalyzer::new`] with an explicit timer origin.
    pub fn new_at(thresholds: Thresholds, start: Instant) -> Self {
        RepetitionAnalyzer {
            thresholds,
            state_seq: PhaseSequence::new(),
            correct_count: 0,
            incorrect_count: 0,
            incorrect_posture: false,
            prev_state: Phase::None,
            curr_state: Phase::None,
            display: [FaultDisplay::default(); 3],
            lower_hips: false,
            inactive: InactivityTimer::new(start),
            inactive_front: InactivityTimer::new(start),
            camera_warning: false,
            offset_angle: 0,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    pub fn phase(&self) -> Phase {
        self.curr_state
    }

    /// Drop all counters and cycle state; keeps the thresholds.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Like [`RepetitionAnalyzer::reset`] with an explicit timer origin.
    pub fn reset_at(&mut self, now: Instant) {
        *self = Self::new_at(self.thresholds.clone(), now);
        tracing::info!("Analyzer reset");
    }

    pub fn analyze(&mut self, primary: &[Point], secondary: Option<&[Point]>, nose: Option<Point>) -> Feedback {
        self.analyze_at(primary, secondary, nose, Instant::now())
    }

    /// Analyze a full 33-point normalized detection.
    pub fn analyze_pose(&mut self, pose: &[Point], frame: FrameGeometry) -> Feedback {
        let left = SideLandmarks::from_pose(pose, Side::Left, frame).to_vec();
        let right = SideLandmarks::from_pose(pose, Side::Right, frame).to_vec();
        let nose = landmarks::nose_from_pose(pose, frame);
        self.analyze(&left, Some(&right), Some(nose))
    }

    /// One frame, timed at `now`.
    ///
    /// `primary` and `secondary` are reduced 8-point lists for the left and
    /// right side. A missing side, landmark or nose reads as the origin.
    pub fn analyze_at(
        &mut self,
        primary: &[Point],
        secondary: Option<&[Point]>,
        nose: Option<Point>,
        now: Instant,
    ) -> Feedback {
        let left = SideLandmarks::from_slice(primary);
        let right = secondary.map(SideLandmarks::from_slice).unwrap_or_default();
        let nose = nose.unwrap_or(Point::ORIGIN);

        self.offset_angle = features::offset_angle(left.shoulder, nose, right.shoulder);
        self.camera_warning = self.offset_angle > self.thresholds.offset_thresh;

        if self.camera_warning {
            return self.misaligned_frame(now);
        }

        self.inactive_front.restart(now);

        let side = if left.vertical_extent() > right.vertical_extent() { left } else { right };
        let angles = JointAngles::from_side(&side);

        self.curr_state = phase::classify(angles.elbow, angles.ear_elbow_hip, &self.thresholds);
        self.state_seq.record(self.curr_state);
        if self.curr_state != self.prev_state {
            tracing::debug!(from = %self.prev_state, to = %self.curr_state, "Phase changed");
        }

        let mut feedback_list = Vec::new();
        let message = if self.curr_state == Phase::S1 {
            self.judge_repetition()
        } else {
            self.check_posture(&angles, &mut feedback_list);
            ""
        };

        self.track_inactivity(now);

        if self.state_seq.contains(Phase::S3) || self.curr_state == Phase::S1 {
            self.lower_hips = false;
        }
        self.prev_state = self.curr_state;
        self.decay_display();

        Feedback {
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            message: message.to_string(),
            phase: self.curr_state,
            elbow_angle: angles.elbow,
            shldr_angle: angles.shoulder,
            hip_angle: angles.hip,
            knee_angle: angles.knee,
            ear_elbow_hip_angle: angles.ear_elbow_hip,
            camera_warning: self.camera_warning,
            offset_angle: self.offset_angle,
            lower_hips: self.lower_hips,
            displayed_faults: self.displayed_faults(),
            feedback_list,
        }
    }

    fn misaligned_frame(&mut self, now: Instant) -> Feedback {
        let elapsed = self.inactive_front.accumulate(now);
        if elapsed >= self.thresholds.inactive_thresh_secs {
            tracing::warn!(
                offset_angle = self.offset_angle,
                elapsed_secs = elapsed,
                "Camera misaligned too long, resetting counters"
            );
            self.correct_count = 0;
            self.incorrect_count = 0;
            self.inactive_front.elapsed_secs = 0.0;
        }

        self.prev_state = Phase::None;
        self.curr_state = Phase::None;
        self.inactive.restart(now);

        Feedback {
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            message: String::new(),
            phase: Phase::None,
            elbow_angle: 0,
            shldr_angle: 0,
            hip_angle: 0,
            knee_angle: 0,
            ear_elbow_hip_angle: 0,
            camera_warning: true,
            offset_angle: self.offset_angle,
            lower_hips: false,
            displayed_faults: self.displayed_faults(),
            feedback_list: vec![
                MSG_CAMERA_NOT_ALIGNED.to_string(),
                format!("OFFSET ANGLE: {}", self.offset_angle),
            ],
        }
    }

    /// Back at rest: score the finished cycle and start a new one.
    fn judge_repetition(&mut self) -> &'static str {
        let seq = &self.state_seq;
        let message = if seq.len() == 3 && !self.incorrect_posture {
            self.correct_count += 1;
            MSG_CORRECT
        } else if seq.contains(Phase::S2) && seq.len() == 1 {
            self.incorrect_count += 1;
            MSG_INCORRECT
        } else if self.incorrect_posture {
            self.incorrect_count += 1;
            MSG_INCORRECT
        } else {
            ""
        };

        if !message.is_empty() {
            tracing::info!(
                result = message,
                correct = self.correct_count,
                incorrect = self.incorrect_count,
                "Repetition counted"
            );
        }

        self.state_seq.clear();
        self.incorrect_posture = false;
        message
    }

    fn check_posture(&mut self, angles: &JointAngles, feedback_list: &mut Vec<String>) {
        let checks = [
            (PostureFault::BentNeck, angles.shoulder < self.thresholds.shldr_min),
            (PostureFault::BentHip, angles.hip < self.thresholds.hip_min),
            (PostureFault::BentKnee, angles.knee < self.thresholds.knee_min),
        ];
        for (fault, violated) in checks {
            if violated {
                self.display[fault.index()].shown = true;
                self.incorrect_posture = true;
                feedback_list.push(fault.message().to_string());
            }
        }

        if self.thresholds.ear_elbow_hip_trans.contains(&angles.ear_elbow_hip)
            && self.state_seq.count(Phase::S2) == 1
        {
            self.lower_hips = true;
            feedback_list.push(MSG_CONTINUE_LOWERING.to_string());
        }
    }

    // The accumulator is deliberately left running after it zeroes the
    // counters; only a phase change restarts it.
    fn track_inactivity(&mut self, now: Instant) {
        if self.curr_state == self.prev_state {
            let elapsed = self.inactive.accumulate(now);
            if elapsed >= self.thresholds.inactive_thresh_secs {
                if self.correct_count > 0 || self.incorrect_count > 0 {
                    tracing::info!(phase = %self.curr_state, elapsed_secs = elapsed, "Inactive, resetting counters");
                }
                self.correct_count = 0;
                self.incorrect_count = 0;
            }
        } else {
            self.inactive.restart(now);
        }
    }

    fn decay_display(&mut self) {
        let limit = self.thresholds.cnt_frame_thresh;
        for display in self.display.iter_mut() {
            if display.frames > limit {
                display.shown = false;
                display.frames = 0;
            }
            if display.shown {
                display.frames += 1;
            }
        }
    }

    fn displayed_faults(&self) -> Vec<PostureFault> {
        PostureFault::ALL
            .into_iter()
            .filter(|fault| self.display[fault.index()].shown)
            .collect()
    }
}

impl Default for RepetitionAnalyzer {
    fn default() -> Self {
        Self::new(Thresholds::beginner())
    }
}
