use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a gesture triggers. Unrecognized names are kept verbatim so a newer
/// mapping file survives a load/save round trip; they never execute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    None,
    Click,
    RightClick,
    DoubleClick,
    ScrollUp,
    ScrollDown,
    Save,
    Copy,
    Paste,
    Cut,
    SelectAll,
    RunCode,
    CloseWindow,
    Screenshot,
    CustomHotkey,
    Unknown(String),
}

impl ActionType {
    pub const KNOWN: [ActionType; 15] = [
        ActionType::None,
        ActionType::Click,
        ActionType::RightClick,
        ActionType::DoubleClick,
        ActionType::ScrollUp,
        ActionType::ScrollDown,
        ActionType::Save,
        ActionType::Copy,
        ActionType::Paste,
        ActionType::Cut,
        ActionType::SelectAll,
        ActionType::RunCode,
        ActionType::CloseWindow,
        ActionType::Screenshot,
        ActionType::CustomHotkey,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ActionType::None => "none",
            ActionType::Click => "click",
            ActionType::RightClick => "right_click",
            ActionType::DoubleClick => "double_click",
            ActionType::ScrollUp => "scroll_up",
            ActionType::ScrollDown => "scroll_down",
            ActionType::Save => "save",
            ActionType::Copy => "copy",
            ActionType::Paste => "paste",
            ActionType::Cut => "cut",
            ActionType::SelectAll => "select_all",
            ActionType::RunCode => "run_code",
            ActionType::CloseWindow => "close_window",
            ActionType::Screenshot => "screenshot",
            ActionType::CustomHotkey => "custom_hotkey",
            ActionType::Unknown(name) => name,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionType::None => "No action",
            ActionType::Click => "Mouse click",
            ActionType::RightClick => "Right click",
            ActionType::DoubleClick => "Double click",
            ActionType::ScrollUp => "Scroll up",
            ActionType::ScrollDown => "Scroll down",
            ActionType::Save => "Save (Ctrl+S)",
            ActionType::Copy => "Copy (Ctrl+C)",
            ActionType::Paste => "Paste (Ctrl+V)",
            ActionType::Cut => "Cut (Ctrl+X)",
            ActionType::SelectAll => "Select all (Ctrl+A)",
            ActionType::RunCode => "Run code (F5)",
            ActionType::CloseWindow => "Close window (Alt+F4)",
            ActionType::Screenshot => "Take a screenshot",
            ActionType::CustomHotkey => "Custom key combination",
            ActionType::Unknown(_) => "Unknown action",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ActionType::Unknown(_))
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        ActionType::KNOWN
            .into_iter()
            .find(|known| known.as_str() == name)
            .unwrap_or(ActionType::Unknown(name))
    }
}

impl From<&str> for ActionType {
    fn from(name: &str) -> Self {
        ActionType::from(name.to_string())
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    /// Key names pressed together, e.g. `["ctrl", "shift", "p"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ActionParams {
    pub fn hotkey<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hotkey: Some(keys.into_iter().map(Into::into).collect()),
            extra: IndexMap::new(),
        }
    }

    pub fn hotkey_text(&self) -> Option<String> {
        self.hotkey.as_ref().map(|keys| keys.join("+"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(rename = "action")]
    pub action_type: ActionType,
    #[serde(default)]
    pub params: ActionParams,
}

impl ActionDescriptor {
    pub fn new(action_type: ActionType, params: ActionParams) -> Self {
        Self {
            action_type,
            params,
        }
    }

    pub fn hotkey<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ActionType::CustomHotkey, ActionParams::hotkey(keys))
    }

    /// Short text for a status line.
    pub fn display_name(&self) -> String {
        match (&self.action_type, self.params.hotkey_text()) {
            (ActionType::CustomHotkey, Some(keys)) => format!("Key combination: {keys}"),
            (ActionType::CustomHotkey, None) => "Key combination".to_string(),
            (ActionType::Unknown(name), _) => name.clone(),
            (action, _) => action.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_including_unknown() {
        for known in ActionType::KNOWN {
            assert_eq!(ActionType::from(known.as_str()), known);
        }
        let future = ActionType::from("app_execute");
        assert_eq!(future, ActionType::Unknown("app_execute".into()));
        assert!(!future.is_known());
        assert_eq!(String::from(future), "app_execute");
    }

    #[test]
    fn descriptor_json_shape() {
        let descriptor = ActionDescriptor::hotkey(["ctrl", "w"]);
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "custom_hotkey", "params": {"hotkey": ["ctrl", "w"]}})
        );
    }

    #[test]
    fn extra_params_are_preserved() {
        let json = serde_json::json!({"action": "app_execute", "params": {"path": "/usr/bin/code"}});
        let descriptor: ActionDescriptor = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(descriptor.params.hotkey, None);
        assert_eq!(serde_json::to_value(&descriptor).unwrap(), json);
    }

    #[test]
    fn display_names() {
        assert_eq!(
            ActionDescriptor::hotkey(["ctrl", "shift", "p"]).display_name(),
            "Key combination: ctrl+shift+p"
        );
        assert_eq!(
            ActionDescriptor::new(ActionType::ScrollUp, ActionParams::default()).display_name(),
            "Scroll up"
        );
    }
}
