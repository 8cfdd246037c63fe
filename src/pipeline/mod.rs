mod command;
mod worker;

use std::time::Instant;

use thiserror::Error;

use crate::{
    actions::{CooldownDispatcher, DispatchOutcome, StoreError},
    classifier::Classifier,
    gesture::{
        DEFAULT_HISTORY_LEN, GestureSmoother, LabelError, LabelSet, PointHistory, UNKNOWN_GESTURE,
        labels::DEFAULT_MOTION_LABELS, normalize_landmarks,
    },
    recording::{CaptureOutcome, DatasetError, Mode, RecordingController},
    types::{GestureReading, HandObservation, Handedness, Point},
};

pub use self::command::{Command, LabelKind};
pub use self::worker::{PipelineInput, run_worker_loop, start_worker};

/// Index finger tip in the 21-point hand model.
pub const INDEX_FINGER_TIP: usize = 8;
pub const DEFAULT_POINTER_LABEL: &str = "Pointer";

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub history_len: usize,
    /// Static gesture whose fingertip feeds the motion history.
    pub pointer_label: String,
    pub fingertip_index: usize,
    /// Also dispatch non-zero smoothed motion gestures.
    pub dispatch_motion: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_len: DEFAULT_HISTORY_LEN,
            pointer_label: DEFAULT_POINTER_LABEL.to_string(),
            fingertip_index: INDEX_FINGER_TIP,
            dispatch_motion: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("static classifier failed: {0:#}")]
    StaticClassifier(anyhow::Error),
    #[error("motion classifier failed: {0:#}")]
    MotionClassifier(anyhow::Error),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Label(#[from] LabelError),
}

#[derive(Debug)]
pub struct Dispatch {
    pub label: String,
    pub outcome: DispatchOutcome,
}

/// What happened to one frame. Failures are collected, never raised.
#[derive(Debug)]
pub struct FrameReport {
    pub timestamp: Instant,
    pub mode: Mode,
    pub handedness: Option<Handedness>,
    pub static_gesture: Option<GestureReading>,
    pub motion_gesture: GestureReading,
    /// Fingertip position relative to the frame size.
    pub pointer: Option<(f32, f32)>,
    pub capture: Option<CaptureOutcome>,
    pub dispatches: Vec<Dispatch>,
    pub errors: Vec<FrameError>,
}

impl FrameReport {
    pub fn summary(&self) -> String {
        let hand = match (&self.handedness, &self.static_gesture) {
            (Some(h), Some(g)) => format!("{}: {}", h.label(), g.display_text()),
            (Some(h), None) => format!("{}: ?", h.label()),
            _ => "no hand".to_string(),
        };
        let mut text = format!(
            "[{}] {hand}, motion {}",
            self.mode.label(),
            self.motion_gesture.display_text()
        );
        for dispatch in &self.dispatches {
            text.push_str(&format!(", {} -> {:?}", dispatch.label, dispatch.outcome));
        }
        if let Some(CaptureOutcome::Recorded { label }) = self.capture {
            text.push_str(&format!(", recorded #{label}"));
        }
        for err in &self.errors {
            text.push_str(&format!(", error: {err}"));
        }
        text
    }
}

/// One frame at a time: normalize, classify, smooth, then either record a
/// training sample or dispatch the mapped action.
pub struct GesturePipeline {
    config: PipelineConfig,
    static_classifier: Box<dyn Classifier>,
    static_labels: LabelSet,
    motion_classifier: Option<Box<dyn Classifier>>,
    motion_labels: LabelSet,
    history: PointHistory,
    smoother: GestureSmoother,
    recorder: RecordingController,
    dispatcher: CooldownDispatcher,
}

impl GesturePipeline {
    pub fn new(
        config: PipelineConfig,
        static_classifier: Box<dyn Classifier>,
        static_labels: LabelSet,
        recorder: RecordingController,
        dispatcher: CooldownDispatcher,
    ) -> Self {
        Self {
            history: PointHistory::new(config.history_len),
            smoother: GestureSmoother::new(config.history_len),
            config,
            static_classifier,
            static_labels,
            motion_classifier: None,
            motion_labels: LabelSet::new(DEFAULT_MOTION_LABELS.iter().copied()),
            recorder,
            dispatcher,
        }
    }

    pub fn with_motion_classifier(mut self, classifier: Box<dyn Classifier>, labels: LabelSet) -> Self {
        self.motion_classifier = Some(classifier);
        self.motion_labels = labels;
        self
    }

    pub fn recorder(&self) -> &RecordingController {
        &self.recorder
    }

    pub fn dispatcher(&self) -> &CooldownDispatcher {
        &self.dispatcher
    }

    pub fn history(&self) -> &PointHistory {
        &self.history
    }

    pub fn static_labels(&self) -> &LabelSet {
        &self.static_labels
    }

    pub fn motion_labels(&self) -> &LabelSet {
        &self.motion_labels
    }

    pub fn process_frame(&mut self, frame: &HandObservation) -> FrameReport {
        let mut report = FrameReport {
            timestamp: frame.timestamp,
            mode: self.recorder.mode(),
            handedness: None,
            static_gesture: None,
            motion_gesture: GestureReading {
                id: 0,
                label: self.motion_labels.name_or_unknown(0).to_string(),
            },
            pointer: None,
            capture: None,
            dispatches: Vec::new(),
            errors: Vec::new(),
        };

        let mut tracked: Option<Point> = None;
        if let Some(hand) = &frame.hand {
            report.handedness = Some(hand.handedness);
            let fingertip = hand.point(self.config.fingertip_index);
            report.pointer = fingertip.map(|p| relative(p, frame.width, frame.height));

            let features = normalize_landmarks(&hand.landmarks);
            self.record(&mut report, |recorder| recorder.capture_static(&features));

            match self.static_classifier.classify(&features) {
                Ok(id) => {
                    let label = self.static_labels.name_or_unknown(id).to_string();
                    if label == self.config.pointer_label {
                        tracked = fingertip;
                    }
                    report.static_gesture = Some(GestureReading { id, label });
                }
                Err(err) => {
                    log::warn!("static gesture classification failed: {err:#}");
                    report.errors.push(FrameError::StaticClassifier(err));
                }
            }
        }

        self.history.observe(tracked, frame.width, frame.height);
        let motion_features = self.history.export_features();
        let ready = self.history.is_ready();
        if frame.hand.is_some() {
            self.record(&mut report, |recorder| {
                recorder.capture_motion(&motion_features, ready)
            });
        }

        let mut motion_id = 0;
        // An under-filled window means "no gesture"; the classifier is not consulted.
        if ready {
            if let Some(classifier) = self.motion_classifier.as_mut() {
                match classifier.classify(&motion_features) {
                    Ok(id) => motion_id = id,
                    Err(err) => {
                        log::warn!("motion gesture classification failed: {err:#}");
                        report.errors.push(FrameError::MotionClassifier(err));
                    }
                }
            }
        }
        self.smoother.push(motion_id);
        let smoothed = self.smoother.resolve();
        report.motion_gesture = GestureReading {
            id: smoothed,
            label: self.motion_labels.name_or_unknown(smoothed).to_string(),
        };

        if self.recorder.mode() == Mode::Normal {
            self.route(&mut report, frame.timestamp);
        }

        report
    }

    fn record<F>(&self, report: &mut FrameReport, capture: F)
    where
        F: FnOnce(&RecordingController) -> Result<CaptureOutcome, DatasetError>,
    {
        match capture(&self.recorder) {
            Ok(CaptureOutcome::Skipped) => {}
            Ok(outcome) => report.capture = Some(outcome),
            Err(err) => {
                log::error!("{err}");
                report.errors.push(err.into());
            }
        }
    }

    fn route(&mut self, report: &mut FrameReport, now: Instant) {
        let mut labels = Vec::new();
        if let Some(gesture) = &report.static_gesture {
            labels.push(gesture.label.clone());
        }
        if self.config.dispatch_motion && report.motion_gesture.id != 0 {
            labels.push(report.motion_gesture.label.clone());
        }

        for label in labels {
            if label == UNKNOWN_GESTURE {
                continue;
            }
            let outcome = self.dispatcher.dispatch_detailed(&label, report.pointer, now);
            if outcome != DispatchOutcome::Unmapped {
                report.dispatches.push(Dispatch { label, outcome });
            }
        }
    }

    /// Applies an operator command. Every command takes effect in memory
    /// even when persisting it fails; the failure is returned.
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::SetMode(mode) => self.recorder.set_mode(mode),
            Command::SetCaptureLabel(index) => {
                self.recorder.set_label_index(index);
            }
            Command::SetCooldown(seconds) => {
                self.dispatcher.set_cooldown_secs(seconds);
            }
            Command::UpsertAction {
                label,
                action,
                params,
            } => self
                .dispatcher
                .store_mut()
                .upsert(&label, action, params)?,
            Command::AppendLabel { kind, name } => {
                let labels = match kind {
                    LabelKind::Static => &mut self.static_labels,
                    LabelKind::Motion => &mut self.motion_labels,
                };
                let id = labels.append(&name)?;
                log::info!("added {kind:?} label {name:?} as #{id}; retrain the classifier to use it");
            }
        }
        Ok(())
    }
}

fn relative(point: Point, width: u32, height: u32) -> (f32, f32) {
    (
        point.0 as f32 / width.max(1) as f32,
        point.1 as f32 / height.max(1) as f32,
    )
}
