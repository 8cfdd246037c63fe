use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use env_logger::Env;

use gesture_hotkeys::{
    actions::{ActionStore, CooldownDispatcher, InputBackend, LoggingBackend},
    classifier::{OrtClassifier, OrtClassifierConfig},
    gesture::{
        LabelSet, STATIC_FEATURE_LEN,
        labels::{DEFAULT_MOTION_LABELS, DEFAULT_STATIC_LABELS},
    },
    pipeline::{GesturePipeline, start_worker},
    recording::{DatasetWriter, RecordingController},
    replay::start_replay,
    settings::Cli,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("ort", log::LevelFilter::Warn)
        .init();

    log::debug!("started with settings: {cli:?}");

    let (input_tx, input_rx) = bounded(64);
    let (report_tx, report_rx) = bounded(64);

    let realtime = cli.realtime;
    let replay = if cli.input == "-" {
        start_replay(BufReader::new(io::stdin()), realtime, input_tx)
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("failed to open input {}", cli.input))?;
        start_replay(BufReader::new(file), realtime, input_tx)
    };

    let worker = start_worker(move || build_pipeline(&cli), input_rx, report_tx);

    for report in report_rx.iter() {
        if !report.dispatches.is_empty() || report.capture.is_some() {
            log::info!("{}", report.summary());
        } else {
            log::debug!("{}", report.summary());
        }
    }

    if worker.join().is_err() {
        log::error!("gesture pipeline thread panicked");
    }
    if replay.join().is_err() {
        log::error!("input thread panicked");
    }
    Ok(())
}

fn build_pipeline(cli: &Cli) -> Result<GesturePipeline> {
    let config = cli.pipeline_config();

    let mut static_config = OrtClassifierConfig::new(&cli.static_model, STATIC_FEATURE_LEN);
    static_config.min_score = cli.min_score;
    let static_classifier = OrtClassifier::new(static_config)
        .context("failed to load the static gesture model")?;
    let static_labels = LabelSet::load_or_default(Path::new(&cli.static_labels), DEFAULT_STATIC_LABELS);

    let recorder = RecordingController::new(
        DatasetWriter::new(&cli.static_dataset),
        DatasetWriter::new(&cli.motion_dataset),
    );

    let store = ActionStore::load(&cli.actions_path);
    let mut dispatcher = CooldownDispatcher::new(store, input_backend(cli));
    dispatcher.set_cooldown_secs(cli.cooldown);
    dispatcher.set_consume_on_failure(cli.failed_actions_consume_cooldown);

    let history_len = config.history_len;
    let mut pipeline = GesturePipeline::new(
        config,
        Box::new(static_classifier),
        static_labels,
        recorder,
        dispatcher,
    );

    match &cli.motion_model {
        Some(path) => {
            let mut motion_config = OrtClassifierConfig::new(path, history_len * 2);
            motion_config.min_score = cli.min_score;
            let motion_classifier = OrtClassifier::new(motion_config)
                .context("failed to load the motion gesture model")?;
            let motion_labels =
                LabelSet::load_or_default(Path::new(&cli.motion_labels), DEFAULT_MOTION_LABELS);
            pipeline = pipeline.with_motion_classifier(Box::new(motion_classifier), motion_labels);
        }
        None => log::info!("no motion model configured; motion gestures disabled"),
    }

    Ok(pipeline)
}

#[cfg(feature = "input-enigo")]
fn input_backend(cli: &Cli) -> Box<dyn InputBackend> {
    use gesture_hotkeys::actions::{EnigoBackend, ScreenshotCommand};

    if cli.dry_run {
        return Box::new(LoggingBackend);
    }
    match EnigoBackend::new(ScreenshotCommand::platform_default(cli.screenshot_dir())) {
        Ok(backend) => Box::new(backend),
        Err(err) => {
            log::warn!("OS input unavailable ({err}); actions will only be logged");
            Box::new(LoggingBackend)
        }
    }
}

#[cfg(not(feature = "input-enigo"))]
fn input_backend(cli: &Cli) -> Box<dyn InputBackend> {
    if !cli.dry_run {
        log::warn!("built without OS input support; actions will only be logged");
    }
    Box::new(LoggingBackend)
}
