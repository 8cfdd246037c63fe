mod dataset;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::dataset::{
    DatasetError, DatasetWriter, MOTION_DATASET_FILENAME, STATIC_DATASET_FILENAME,
};

pub const MAX_CAPTURE_LABEL: u8 = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Normal,
    StaticCapture,
    MotionCapture,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::StaticCapture => "recording key points",
            Mode::MotionCapture => "recording point history",
        }
    }

    pub fn is_capture(&self) -> bool {
        !matches!(self, Mode::Normal)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordingSession {
    pub mode: Mode,
    pub label_index: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Recorded { label: u8 },
    /// Capture mode without a usable label, or a motion window that isn't full yet.
    Skipped,
}

/// Owns the recording session and the two sample datasets.
pub struct RecordingController {
    session: RecordingSession,
    static_samples: DatasetWriter,
    motion_samples: DatasetWriter,
}

impl RecordingController {
    pub fn new(static_samples: DatasetWriter, motion_samples: DatasetWriter) -> Self {
        Self {
            session: RecordingSession::default(),
            static_samples,
            motion_samples,
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            DatasetWriter::new(dir.join(STATIC_DATASET_FILENAME)),
            DatasetWriter::new(dir.join(MOTION_DATASET_FILENAME)),
        )
    }

    pub fn session(&self) -> RecordingSession {
        self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.session.mode != mode {
            log::info!("mode changed to {}", mode.label());
        }
        self.session.mode = mode;
    }

    /// Selects the label future samples are tagged with. Anything outside
    /// `0..=9` clears the selection, which pauses capture.
    pub fn set_label_index(&mut self, index: Option<i64>) -> Option<u8> {
        let label = index
            .and_then(|i| u8::try_from(i).ok())
            .filter(|i| *i <= MAX_CAPTURE_LABEL);
        if label.is_none() && index.is_some() {
            log::warn!("capture label {index:?} out of range 0..={MAX_CAPTURE_LABEL}; selection cleared");
        } else {
            log::info!("capture label set to {label:?}");
        }
        self.session.label_index = label;
        label
    }

    /// Records the static sample if the session asks for it.
    pub fn capture_static(&self, features: &[f32]) -> Result<CaptureOutcome, DatasetError> {
        self.capture(Mode::StaticCapture, &self.static_samples, features)
    }

    /// Records the motion sample if the session asks for it. `ready` tells
    /// whether the history window is full.
    pub fn capture_motion(
        &self,
        features: &[f32],
        ready: bool,
    ) -> Result<CaptureOutcome, DatasetError> {
        if !ready {
            return Ok(CaptureOutcome::Skipped);
        }
        self.capture(Mode::MotionCapture, &self.motion_samples, features)
    }

    fn capture(
        &self,
        mode: Mode,
        writer: &DatasetWriter,
        features: &[f32],
    ) -> Result<CaptureOutcome, DatasetError> {
        if self.session.mode != mode {
            return Ok(CaptureOutcome::Skipped);
        }
        let Some(label) = self.session.label_index else {
            return Ok(CaptureOutcome::Skipped);
        };

        writer.append(label, features)?;
        Ok(CaptureOutcome::Recorded { label })
    }
}
