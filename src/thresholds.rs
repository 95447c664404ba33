//! Angle thresholds and the named presets.

use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Angle cutoffs (degrees) and timing limits for one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Elbow angle above which the arm counts as extended.
    pub elbow_normal: i32,
    /// Ear-elbow-hip angle below which the body is at rest.
    pub ear_elbow_hip_normal: i32,
    pub ear_elbow_hip_trans: RangeInclusive<i32>,
    pub ear_elbow_hip_pass: RangeInclusive<i32>,
    pub shldr_min: i32,
    pub hip_min: i32,
    pub knee_min: i32,
    /// Nose offset angle above which the camera is misaligned.
    #[serde(default = "default_offset_thresh")]
    pub offset_thresh: i32,
    #[serde(default = "default_inactive_thresh_secs")]
    pub inactive_thresh_secs: f64,
    /// Frames a posture fault stays displayed.
    #[serde(default = "default_cnt_frame_thresh")]
    pub cnt_frame_thresh: u32,
}

fn default_offset_thresh() -> i32 {
    40
}

fn default_inactive_thresh_secs() -> f64 {
    15.0
}

fn default_cnt_frame_thresh() -> u32 {
    50
}

impl Thresholds {
    pub fn beginner() -> Self {
        Thresholds {
            elbow_normal: 150,
            ear_elbow_hip_normal: 120,
            ear_elbow_hip_trans: 125..=150,
            ear_elbow_hip_pass: 155..=180,
            shldr_min: 135,
            hip_min: 160,
            knee_min: 150,
            offset_thresh: 35,
            inactive_thresh_secs: 15.0,
            cnt_frame_thresh: 50,
        }
    }

    /// Same ranges as [`Thresholds::beginner`], stricter neck and knee minimums.
    pub fn pro() -> Self {
        Thresholds {
            shldr_min: 150,
            knee_min: 160,
            ..Self::beginner()
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => Self::beginner(),
            Preset::Pro => Self::pro(),
        }
    }

    /// Check values are usable. Returns the first offending field.
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("elbow_normal", self.elbow_normal),
            ("ear_elbow_hip_normal", self.ear_elbow_hip_normal),
            ("shldr_min", self.shldr_min),
            ("hip_min", self.hip_min),
            ("knee_min", self.knee_min),
            ("offset_thresh", self.offset_thresh),
        ];
        for (name, value) in angles {
            if !(0..=180).contains(&value) {
                return Err(Error::Config(format!("{} must be in [0, 180], got {}", name, value)));
            }
        }

        for (name, range) in [
            ("ear_elbow_hip_trans", &self.ear_elbow_hip_trans),
            ("ear_elbow_hip_pass", &self.ear_elbow_hip_pass),
        ] {
            if range.is_empty() {
                return Err(Error::Config(format!(
                    "{} is empty ({}..={})",
                    name,
                    range.start(),
                    range.end()
                )));
            }
        }

        let trans = &self.ear_elbow_hip_trans;
        let pass = &self.ear_elbow_hip_pass;
        if trans.start() <= pass.end() && pass.start() <= trans.end() {
            return Err(Error::Config(format!(
                "ear_elbow_hip_trans {}..={} overlaps ear_elbow_hip_pass {}..={}",
                trans.start(),
                trans.end(),
                pass.start(),
                pass.end()
            )));
        }

        if !self.inactive_thresh_secs.is_finite() || self.inactive_thresh_secs < 0.0 {
            return Err(Error::Config(format!(
                "inactive_thresh_secs must be a non-negative number, got {}",
                self.inactive_thresh_secs
            )));
        }

        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let thresholds: Thresholds = toml::from_str(content)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let thresholds = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded thresholds");
        Ok(thresholds)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::beginner()
    }
}

/// Named threshold presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Beginner,
    Pro,
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Preset::Beginner),
            "pro" => Ok(Preset::Pro),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Beginner => write!(f, "beginner"),
            Preset::Pro => write!(f, "pro"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_only_in_minimums() {
        let beginner = Thresholds::beginner();
        let pro = Thresholds::pro();
        assert_eq!(pro.shldr_min, 150);
        assert_eq!(pro.knee_min, 160);
        assert_eq!(
            Thresholds { shldr_min: beginner.shldr_min, knee_min: beginner.knee_min, ..pro },
            beginner
        );
    }

    #[test]
    fn test_presets_validate() {
        assert!(Thresholds::beginner().validate().is_ok());
        assert!(Thresholds::pro().validate().is_ok());
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let thresholds = Thresholds { ear_elbow_hip_pass: 150..=180, ..Thresholds::beginner() };
        let err = thresholds.validate().unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_bad_values_rejected() {
        let negative = Thresholds { inactive_thresh_secs: -1.0, ..Thresholds::beginner() };
        assert!(matches!(negative.validate(), Err(Error::Config(_))));

        let nan = Thresholds { inactive_thresh_secs: f64::NAN, ..Thresholds::beginner() };
        assert!(nan.validate().is_err());

        let wide = Thresholds { hip_min: 200, ..Thresholds::beginner() };
        assert!(wide.validate().unwrap_err().to_string().contains("hip_min"));

        #[allow(clippy::reversed_empty_ranges)]
        let empty = Thresholds { ear_elbow_hip_trans: 150..=125, ..Thresholds::beginner() };
        assert!(empty.validate().unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!("beginner".parse::<Preset>().unwrap(), Preset::Beginner);
        assert_eq!(" PRO ".parse::<Preset>().unwrap(), Preset::Pro);
        assert!(matches!("expert".parse::<Preset>(), Err(Error::UnknownPreset(name)) if name == "expert"));
    }

    #[test]
    fn test_toml_defaults_for_timing_fields() {
        let content = r#"
            elbow_normal = 150
            ear_elbow_hip_normal = 120
            ear_elbow_hip_trans = { start = 125, end = 150 }
            ear_elbow_hip_pass = { start = 155, end = 180 }
            shldr_min = 140
            hip_min = 160
            knee_min = 150
        "#;
        let thresholds = Thresholds::from_toml_str(content).unwrap();
        assert_eq!(thresholds.shldr_min, 140);
        assert_eq!(thresholds.offset_thresh, 40);
        assert_eq!(thresholds.inactive_thresh_secs, 15.0);
        assert_eq!(thresholds.cnt_frame_thresh, 50);
    }

    #[test]
    fn test_toml_invalid_values_rejected() {
        let content = r#"
            elbow_normal = 150
            ear_elbow_hip_normal = 120
            ear_elbow_hip_trans = { start = 125, end = 160 }
            ear_elbow_hip_pass = { start = 155, end = 180 }
            shldr_min = 135
            hip_min = 160
            knee_min = 150
        "#;
        assert!(matches!(Thresholds::from_toml_str(content), Err(Error::Config(_))));
        assert!(matches!(Thresholds::from_toml_str("elbow_normal = "), Err(Error::TomlDe(_))));
    }
}
