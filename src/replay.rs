//! JSON-lines input: recorded detector output interleaved with operator commands.
//!
//! ```text
//! {"type": "frame", "t": 0.033, "width": 640, "height": 480, "hand": {"handedness": "R", "landmarks": [[320, 400], ...]}}
//! {"type": "command", "command": {"set_mode": "static_capture"}}
//! {"type": "key", "key": "7"}
//! ```
//!
//! `t` is the capture time in seconds from the start of the stream. Blank
//! lines and lines starting with `#` are ignored.

use std::{
    io::BufRead,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::Sender;
use serde::Deserialize;

use crate::{
    pipeline::{Command, PipelineInput},
    types::{HandObservation, LandmarkSet},
};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplayLine {
    Frame {
        t: f64,
        width: u32,
        height: u32,
        #[serde(default)]
        hand: Option<LandmarkSet>,
    },
    Command {
        command: Command,
    },
    Key {
        key: char,
    },
}

pub fn parse_line(line: &str, base: Instant) -> Result<Option<PipelineInput>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let input = match serde_json::from_str::<ReplayLine>(line)? {
        ReplayLine::Frame {
            t,
            width,
            height,
            hand,
        } => {
            let timestamp = Duration::try_from_secs_f64(t)
                .ok()
                .and_then(|offset| base.checked_add(offset))
                .ok_or_else(|| anyhow!("invalid frame time {t}"))?;
            PipelineInput::Frame(HandObservation {
                width,
                height,
                timestamp,
                hand,
            })
        }
        ReplayLine::Command { command } => PipelineInput::Command(command),
        ReplayLine::Key { key } => match Command::from_key(key) {
            Some(command) => PipelineInput::Command(command),
            None => {
                log::debug!("ignoring unbound key {key:?}");
                return Ok(None);
            }
        },
    };
    Ok(Some(input))
}

/// Reads `reader` on its own thread and forwards every parsed line.
///
/// With `realtime`, frames are held back until their `t` has elapsed.
/// Malformed lines are logged and skipped. The thread ends at end of input
/// or when the pipeline hangs up.
pub fn start_replay<R>(reader: R, realtime: bool, input_tx: Sender<PipelineInput>) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        let base = Instant::now();
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let parsed = line
                .context("failed to read input")
                .and_then(|line| parse_line(&line, base));
            let input = match parsed {
                Ok(Some(input)) => input,
                Ok(None) => continue,
                Err(err) => {
                    log::warn!("skipping input line {line_no}: {err:#}");
                    continue;
                }
            };

            if realtime {
                if let PipelineInput::Frame(frame) = &input {
                    let now = Instant::now();
                    if frame.timestamp > now {
                        thread::sleep(frame.timestamp - now);
                    }
                }
            }

            if input_tx.send(input).is_err() {
                log::debug!("pipeline gone, stopping replay");
                return;
            }
        }
        log::info!("end of input");
    })
}
