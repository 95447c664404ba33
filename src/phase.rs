use std::fmt;

use serde::{Serialize, Serializer};

use crate::thresholds::Thresholds;

/// Stage of a repetition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No threshold matched this frame.
    #[default]
    None,
    /// Top / rest: arm extended, body upright relative to the elbow.
    S1,
    /// Transition, passed on both the way down and the way up.
    S2,
    /// Bottom / pass.
    S3,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::None => "none",
            Phase::S1 => "s1",
            Phase::S2 => "s2",
            Phase::S3 => "s3",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Classify one frame. First match wins: S1, then S2, then S3.
pub fn classify(elbow: i32, ear_elbow_hip: i32, thresholds: &Thresholds) -> Phase {
    if elbow > thresholds.elbow_normal && ear_elbow_hip < thresholds.ear_elbow_hip_normal {
        Phase::S1
    } else if thresholds.ear_elbow_hip_trans.contains(&ear_elbow_hip) {
        Phase::S2
    } else if thresholds.ear_elbow_hip_pass.contains(&ear_elbow_hip) {
        Phase::S3
    } else {
        Phase::None
    }
}

/// Phases accepted during the current descent-ascent cycle.
///
/// A complete cycle reads `[S2, S3, S2]`; out-of-order or repeated entries
/// are dropped by [`PhaseSequence::record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSequence {
    phases: Vec<Phase>,
}

impl PhaseSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `phase` if the cycle shape allows it. Returns whether it was kept.
    pub fn record(&mut self, phase: Phase) -> bool {
        let accepted = match phase {
            Phase::S2 => {
                let s2 = self.count(Phase::S2);
                let descending = !self.contains(Phase::S3) && s2 == 0;
                let ascending = self.contains(Phase::S3) && s2 == 1;
                descending || ascending
            }
            Phase::S3 => self.contains(Phase::S2) && !self.contains(Phase::S3),
            Phase::S1 | Phase::None => false,
        };
        if accepted {
            self.phases.push(phase);
        }
        accepted
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.phases.iter().filter(|p| **p == phase).count()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn as_slice(&self) -> &[Phase] {
        &self.phases
    }

    pub fn clear(&mut self) {
        self.phases.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fed(phases: &[Phase]) -> PhaseSequence {
        let mut seq = PhaseSequence::new();
        for phase in phases {
            seq.record(*phase);
        }
        seq
    }

    #[test]
    fn test_classify_beginner_example() {
        let t = Thresholds::beginner();
        assert_eq!(classify(160, 100, &t), Phase::S1);
        assert_eq!(classify(160, 140, &t), Phase::S2);
        assert_eq!(classify(160, 170, &t), Phase::S3);
        assert_eq!(classify(90, 100, &t), Phase::None);
        assert_eq!(classify(160, 122, &t), Phase::None);
        assert_eq!(classify(160, 152, &t), Phase::None);
    }

    #[test]
    fn test_classify_bounds() {
        let t = Thresholds::beginner();
        // elbow must be strictly above, ear-elbow-hip strictly below
        assert_eq!(classify(150, 100, &t), Phase::None);
        assert_eq!(classify(151, 120, &t), Phase::None);
        // ranges are inclusive
        assert_eq!(classify(0, 125, &t), Phase::S2);
        assert_eq!(classify(0, 150, &t), Phase::S2);
        assert_eq!(classify(0, 155, &t), Phase::S3);
        assert_eq!(classify(0, 180, &t), Phase::S3);
    }

    #[test]
    fn test_full_cycle_shape() {
        let seq = fed(&[Phase::S2, Phase::S2, Phase::S3, Phase::S3, Phase::S2, Phase::S2]);
        assert_eq!(seq.as_slice(), &[Phase::S2, Phase::S3, Phase::S2]);
    }

    #[test]
    fn test_s3_requires_s2() {
        let mut seq = PhaseSequence::new();
        assert!(!seq.record(Phase::S3));
        assert!(seq.is_empty());
        assert!(seq.record(Phase::S2));
        assert!(seq.record(Phase::S3));
        assert!(!seq.record(Phase::S3));
    }

    #[test]
    fn test_rest_and_none_never_recorded() {
        let seq = fed(&[Phase::S1, Phase::None, Phase::S2, Phase::None, Phase::S1]);
        assert_eq!(seq.as_slice(), &[Phase::S2]);
        assert_eq!(seq.count(Phase::S2), 1);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::S1.to_string(), "s1");
        assert_eq!(Phase::None.label(), "none");
    }
}
