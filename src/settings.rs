use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::{
    actions::DEFAULT_ACTIONS_FILENAME,
    gesture::DEFAULT_HISTORY_LEN,
    pipeline::{DEFAULT_POINTER_LABEL, INDEX_FINGER_TIP, PipelineConfig},
    recording::{MOTION_DATASET_FILENAME, STATIC_DATASET_FILENAME},
};

const STATIC_MODEL_DIR: &str = "model/keypoint_classifier";
const MOTION_MODEL_DIR: &str = "model/point_history_classifier";

const COOLDOWN_SECS: f64 = 1.0;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON-lines hand observations and operator commands; "-" reads stdin
    #[arg(default_value_t = String::from("-"))]
    pub input: String,

    /// Pace frames by their timestamps instead of processing as fast as possible
    #[arg(long = "realtime")]
    pub realtime: bool,

    #[arg(long = "model.static", default_value_t = format!("{STATIC_MODEL_DIR}/keypoint_classifier.onnx"))]
    pub static_model: String,

    /// Motion gestures are disabled (always "no gesture") without a model
    #[arg(long = "model.motion")]
    pub motion_model: Option<String>,

    /// Report the fallback class when the top score is below this
    #[arg(long = "model.minScore")]
    pub min_score: Option<f32>,

    #[arg(long = "labels.static", default_value_t = format!("{STATIC_MODEL_DIR}/keypoint_classifier_label.csv"))]
    pub static_labels: String,

    #[arg(long = "labels.motion", default_value_t = format!("{MOTION_MODEL_DIR}/point_history_classifier_label.csv"))]
    pub motion_labels: String,

    #[arg(long = "dataset.static", default_value_t = format!("{STATIC_MODEL_DIR}/{STATIC_DATASET_FILENAME}"))]
    pub static_dataset: String,

    #[arg(long = "dataset.motion", default_value_t = format!("{MOTION_MODEL_DIR}/{MOTION_DATASET_FILENAME}"))]
    pub motion_dataset: String,

    /// Gesture to action mapping, created with defaults if missing
    #[arg(long = "actionsPath", default_value_t = String::from(DEFAULT_ACTIONS_FILENAME))]
    pub actions_path: String,

    /// Minimum seconds between two dispatched actions (at least 0.1)
    #[arg(long = "cooldown", default_value_t = COOLDOWN_SECS)]
    pub cooldown: f64,

    /// Whether an action that failed to execute still starts the cooldown
    #[arg(long = "failedActionsConsumeCooldown", action = ArgAction::Set, default_value_t = true)]
    pub failed_actions_consume_cooldown: bool,

    /// Fingertip positions (and smoothed motion ids) kept per window
    #[arg(long = "history.length", default_value_t = DEFAULT_HISTORY_LEN)]
    pub history_len: usize,

    /// Static gesture that turns on fingertip tracking
    #[arg(long = "pointer.label", default_value_t = String::from(DEFAULT_POINTER_LABEL))]
    pub pointer_label: String,

    #[arg(long = "pointer.landmark", default_value_t = INDEX_FINGER_TIP)]
    pub pointer_landmark: usize,

    /// Also dispatch actions for recognized motion gestures
    #[arg(long = "dispatchMotion")]
    pub dispatch_motion: bool,

    /// Log actions instead of sending input to the OS
    #[arg(long = "dryRun")]
    pub dry_run: bool,

    #[arg(long = "screenshotDir", default_value_t = String::from("."))]
    pub screenshot_dir: String,

    #[arg(long = "loglevel", default_value_t = String::from("info"))]
    pub log_level: String,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            history_len: self.history_len.max(1),
            pointer_label: self.pointer_label.clone(),
            fingertip_index: self.pointer_landmark,
            dispatch_motion: self.dispatch_motion,
        }
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        PathBuf::from(&self.screenshot_dir)
    }
}
