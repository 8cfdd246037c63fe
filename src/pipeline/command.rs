use serde::Deserialize;

use crate::{
    actions::{ActionParams, ActionType},
    recording::Mode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Static,
    Motion,
}

/// Operator input that changes how frames are handled.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    SetMode(Mode),
    /// `None` or anything outside `0..=9` clears the capture label.
    SetCaptureLabel(Option<i64>),
    SetCooldown(f64),
    UpsertAction {
        label: String,
        action: ActionType,
        #[serde(default)]
        params: ActionParams,
    },
    AppendLabel {
        kind: LabelKind,
        name: String,
    },
}

impl Command {
    /// Keyboard shortcuts: digits pick the capture label, `n` / `k` / `h`
    /// switch to normal, key point capture and point history capture.
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            '0'..='9' => key.to_digit(10).map(|d| Command::SetCaptureLabel(Some(d as i64))),
            'n' => Some(Command::SetMode(Mode::Normal)),
            'k' => Some(Command::SetMode(Mode::StaticCapture)),
            'h' => Some(Command::SetMode(Mode::MotionCapture)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(Command::from_key('7'), Some(Command::SetCaptureLabel(Some(7))));
        assert_eq!(Command::from_key('k'), Some(Command::SetMode(Mode::StaticCapture)));
        assert_eq!(Command::from_key('h'), Some(Command::SetMode(Mode::MotionCapture)));
        assert_eq!(Command::from_key('n'), Some(Command::SetMode(Mode::Normal)));
        assert_eq!(Command::from_key('x'), None);
    }

    #[test]
    fn commands_from_json() {
        let command: Command = serde_json::from_str(
            r#"{"upsert_action": {"label": "Close", "action": "custom_hotkey", "params": {"hotkey": ["ctrl", "w"]}}}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::UpsertAction {
                label: "Close".into(),
                action: ActionType::CustomHotkey,
                params: ActionParams::hotkey(["ctrl", "w"]),
            }
        );

        let command: Command = serde_json::from_str(r#"{"set_mode": "motion_capture"}"#).unwrap();
        assert_eq!(command, Command::SetMode(Mode::MotionCapture));

        let command: Command = serde_json::from_str(r#"{"set_capture_label": null}"#).unwrap();
        assert_eq!(command, Command::SetCaptureLabel(None));
    }
}
