use std::thread;

use crossbeam_channel::{Receiver, Sender};

use super::{Command, FrameReport, GesturePipeline};
use crate::types::HandObservation;

/// Frames and operator commands share one queue so their order is kept.
#[derive(Debug)]
pub enum PipelineInput {
    Frame(HandObservation),
    Command(Command),
}

/// Builds the pipeline on a dedicated thread and feeds it until `input_rx`
/// disconnects.
///
/// The pipeline never leaves the worker thread, so its input backend need
/// not be `Send`. Reports are dropped when the consumer is busy.
pub fn start_worker<F>(
    build: F,
    input_rx: Receiver<PipelineInput>,
    report_tx: Sender<FrameReport>,
) -> thread::JoinHandle<()>
where
    F: FnOnce() -> anyhow::Result<GesturePipeline> + Send + 'static,
{
    thread::spawn(move || {
        let mut pipeline = match build() {
            Ok(pipeline) => {
                log::info!("gesture pipeline ready");
                pipeline
            }
            Err(err) => {
                log::error!("failed to build gesture pipeline: {err:?}");
                return;
            }
        };

        run_worker_loop(&mut pipeline, &input_rx, &report_tx);
    })
}

pub fn run_worker_loop(
    pipeline: &mut GesturePipeline,
    input_rx: &Receiver<PipelineInput>,
    report_tx: &Sender<FrameReport>,
) {
    while let Ok(input) = input_rx.recv() {
        match input {
            PipelineInput::Frame(frame) => {
                let report = pipeline.process_frame(&frame);
                let _ = report_tx.try_send(report);
            }
            PipelineInput::Command(command) => {
                log::debug!("operator command: {command:?}");
                if let Err(err) = pipeline.apply(command) {
                    log::warn!("operator command failed: {err}");
                }
            }
        }
    }
    log::info!("input closed, gesture pipeline stopped");
}
