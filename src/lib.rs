//! Push-up repetition counter driven by 2D body landmarks.
//!
//! Each frame the caller hands over the landmarks of both body sides plus
//! the nose; [`RepetitionAnalyzer`] classifies the frame into a phase,
//! tracks the descent-ascent cycle, counts correct and incorrect
//! repetitions and reports posture faults as a [`Feedback`] snapshot.
//!
//! Build with the `python` feature to get the `rep_engine` Python module.

pub mod features;
pub mod landmarks;
pub mod phase;
pub mod pose;
pub mod thresholds;

pub use features::{joint_angle, JointAngles};
pub use landmarks::{BodyPart, FrameGeometry, Point, Side, SideLandmarks};
pub use phase::{Phase, PhaseSequence};
pub use pose::{Feedback, PostureFault, RepetitionAnalyzer};
pub use thresholds::{Preset, Thresholds};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown threshold preset: {0:?} (expected \"beginner\" or \"pro\")")]
    UnknownPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse thresholds: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to write thresholds: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
fn to_points(raw: Vec<(f32, f32)>) -> Vec<Point> {
    raw.into_iter().map(Point::from).collect()
}

#[cfg(feature = "python")]
#[pyclass]
pub struct RepEngine {
    analyzer: RepetitionAnalyzer,
}

#[cfg(feature = "python")]
#[pymethods]
impl RepEngine {
    #[new]
    #[pyo3(signature = (preset = "beginner"))]
    pub fn new(preset: &str) -> PyResult<Self> {
        let preset: Preset = preset
            .parse()
            .map_err(|e: Error| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

        Ok(RepEngine {
            analyzer: RepetitionAnalyzer::new(Thresholds::from_preset(preset)),
        })
    }

    #[staticmethod]
    pub fn from_config(path: &str) -> PyResult<Self> {
        let thresholds = Thresholds::load(path)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("Failed to load thresholds: {}", e)))?;

        Ok(RepEngine {
            analyzer: RepetitionAnalyzer::new(thresholds),
        })
    }

    /// Reduced 8-point lists per side; returns the feedback as a dict.
    #[pyo3(signature = (landmarks, right_landmarks = None, nose = None))]
    pub fn process_frame(
        &mut self,
        py: Python<'_>,
        landmarks: Vec<(f32, f32)>,
        right_landmarks: Option<Vec<(f32, f32)>>,
        nose: Option<(f32, f32)>,
    ) -> PyResult<PyObject> {
        let primary = to_points(landmarks);
        let secondary = right_landmarks.map(to_points);
        let feedback = self.analyzer.analyze(&primary, secondary.as_deref(), nose.map(Point::from));

        pythonize::pythonize(py, &feedback)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    /// Full 33-point normalized detection, scaled to the frame in pixels.
    #[pyo3(signature = (landmarks, width, height, scale = 1.0))]
    pub fn process_pose(
        &mut self,
        py: Python<'_>,
        landmarks: Vec<(f32, f32)>,
        width: f32,
        height: f32,
        scale: f32,
    ) -> PyResult<PyObject> {
        let pose = to_points(landmarks);
        let frame = FrameGeometry::new(width, height).with_scale(scale);
        let feedback = self.analyzer.analyze_pose(&pose, frame);

        pythonize::pythonize(py, &feedback)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    /// `(correct, incorrect)`
    pub fn counts(&self) -> (u32, u32) {
        (self.analyzer.correct_count(), self.analyzer.incorrect_count())
    }

    pub fn reset(&mut self) {
        self.analyzer.reset();
    }
}

#[cfg(feature = "python")]
#[pymodule]
#[allow(non_local_definitions)]
fn rep_engine(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<RepEngine>()?;
    Ok(())
}
