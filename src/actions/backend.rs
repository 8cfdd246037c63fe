use std::{
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("custom hotkey has no keys")]
    MissingHotkey,
    #[error("action {0:?} is not supported")]
    Unsupported(String),
    #[error("input injection failed: {0}")]
    Input(String),
    #[error("screenshot failed: {0}")]
    Screenshot(String),
}

/// A key as named in mapping files (`"ctrl"`, `"shift"`, `"f5"`, `"w"`...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyName {
    Control,
    Shift,
    Alt,
    Meta,
    Return,
    Tab,
    Escape,
    Space,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    Char(char),
}

impl FromStr for KeyName {
    type Err = ActionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lower = name.trim().to_lowercase();
        let key = match lower.as_str() {
            "ctrl" | "control" | "ctrlleft" | "ctrlright" => KeyName::Control,
            "shift" | "shiftleft" | "shiftright" => KeyName::Shift,
            "alt" | "altleft" | "altright" | "option" => KeyName::Alt,
            "cmd" | "command" | "win" | "winleft" | "super" | "meta" => KeyName::Meta,
            "enter" | "return" => KeyName::Return,
            "tab" => KeyName::Tab,
            "esc" | "escape" => KeyName::Escape,
            "space" => KeyName::Space,
            "backspace" => KeyName::Backspace,
            "delete" | "del" => KeyName::Delete,
            "home" => KeyName::Home,
            "end" => KeyName::End,
            "pageup" | "pgup" => KeyName::PageUp,
            "pagedown" | "pgdn" => KeyName::PageDown,
            "up" => KeyName::Up,
            "down" => KeyName::Down,
            "left" => KeyName::Left,
            "right" => KeyName::Right,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyName::Char(c),
                    (Some('f'), Some(_)) => other[1..]
                        .parse::<u8>()
                        .ok()
                        .filter(|n| (1..=12).contains(n))
                        .map(KeyName::F)
                        .ok_or_else(|| ActionError::UnknownKey(name.to_string()))?,
                    _ => return Err(ActionError::UnknownKey(name.to_string())),
                }
            }
        };
        Ok(key)
    }
}

pub fn parse_keys(names: &[String]) -> Result<Vec<KeyName>, ActionError> {
    if names.is_empty() {
        return Err(ActionError::MissingHotkey);
    }
    names.iter().map(|name| name.parse()).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickKind {
    Left,
    Right,
    Double,
}

/// OS-level input injection used by the dispatcher.
///
/// `pointer` positions are relative to the frame, in `[0, 1]` on both axes.
/// Calls block until the OS accepted the input.
pub trait InputBackend {
    /// Presses every key in order, then releases them in reverse.
    fn press_keys(&mut self, keys: &[KeyName]) -> Result<(), ActionError>;

    fn click(&mut self, kind: ClickKind, pointer: Option<(f32, f32)>) -> Result<(), ActionError>;

    /// Positive scrolls up, negative scrolls down, in wheel notches.
    fn scroll(&mut self, notches: i32) -> Result<(), ActionError>;

    fn screenshot(&mut self) -> Result<PathBuf, ActionError>;
}

/// Performs nothing and logs what would have happened.
#[derive(Debug, Default)]
pub struct LoggingBackend;

impl InputBackend for LoggingBackend {
    fn press_keys(&mut self, keys: &[KeyName]) -> Result<(), ActionError> {
        log::info!("dry run: press {keys:?}");
        Ok(())
    }

    fn click(&mut self, kind: ClickKind, pointer: Option<(f32, f32)>) -> Result<(), ActionError> {
        log::info!("dry run: {kind:?} click at {pointer:?}");
        Ok(())
    }

    fn scroll(&mut self, notches: i32) -> Result<(), ActionError> {
        log::info!("dry run: scroll {notches}");
        Ok(())
    }

    fn screenshot(&mut self) -> Result<PathBuf, ActionError> {
        log::info!("dry run: screenshot");
        Ok(PathBuf::new())
    }
}

/// Captures the screen with the platform's command line tool.
#[derive(Clone, Debug)]
pub struct ScreenshotCommand {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl ScreenshotCommand {
    pub fn platform_default(dir: impl Into<PathBuf>) -> Self {
        let (program, flag) = if cfg!(target_os = "macos") {
            ("screencapture", "-x")
        } else {
            ("gnome-screenshot", "-f")
        };
        Self {
            program: program.to_string(),
            args: vec![flag.to_string()],
            dir: dir.into(),
        }
    }

    pub fn capture(&self) -> Result<PathBuf, ActionError> {
        let name = format!(
            "screenshot_{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.dir.join(name);
        run_capture(&self.program, &self.args, &path)?;
        log::info!("screenshot saved to {}", path.display());
        Ok(path)
    }
}

fn run_capture(program: &str, args: &[String], path: &Path) -> Result<(), ActionError> {
    std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))
        .map_err(|err| ActionError::Screenshot(err.to_string()))?;

    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|err| ActionError::Screenshot(format!("failed to run {program}: {err}")))?;
    if !status.success() {
        return Err(ActionError::Screenshot(format!("{program} exited with {status}")));
    }
    Ok(())
}

#[cfg(feature = "input-enigo")]
pub use self::enigo_backend::EnigoBackend;

#[cfg(feature = "input-enigo")]
mod enigo_backend {
    use std::path::PathBuf;

    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

    use super::{ActionError, ClickKind, InputBackend, KeyName, ScreenshotCommand};

    pub struct EnigoBackend {
        enigo: Enigo,
        screenshot: ScreenshotCommand,
    }

    impl EnigoBackend {
        pub fn new(screenshot: ScreenshotCommand) -> Result<Self, ActionError> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| ActionError::Input(format!("failed to connect: {e:?}")))?;
            Ok(Self { enigo, screenshot })
        }

        fn key(&mut self, key: KeyName, direction: Direction) -> Result<(), ActionError> {
            self.enigo
                .key(to_enigo_key(key), direction)
                .map_err(|e| ActionError::Input(format!("{key:?}: {e:?}")))
        }
    }

    impl InputBackend for EnigoBackend {
        fn press_keys(&mut self, keys: &[KeyName]) -> Result<(), ActionError> {
            let mut pressed = Vec::with_capacity(keys.len());
            let mut result = Ok(());
            for &key in keys {
                if let Err(err) = self.key(key, Direction::Press) {
                    result = Err(err);
                    break;
                }
                pressed.push(key);
            }
            // Release whatever went down, even after a failure, so no modifier stays stuck.
            for &key in pressed.iter().rev() {
                if let Err(err) = self.key(key, Direction::Release) {
                    log::warn!("failed to release {key:?}: {err}");
                }
            }
            result
        }

        fn click(&mut self, kind: ClickKind, pointer: Option<(f32, f32)>) -> Result<(), ActionError> {
            if let Some((rx, ry)) = pointer {
                let (width, height) = self
                    .enigo
                    .main_display()
                    .map_err(|e| ActionError::Input(format!("{e:?}")))?;
                let x = (rx.clamp(0.0, 1.0) * width as f32) as i32;
                let y = (ry.clamp(0.0, 1.0) * height as f32) as i32;
                self.enigo
                    .move_mouse(x, y, Coordinate::Abs)
                    .map_err(|e| ActionError::Input(format!("{e:?}")))?;
            }

            let clicks = if kind == ClickKind::Double { 2 } else { 1 };
            for _ in 0..clicks {
                let button = match kind {
                    ClickKind::Right => Button::Right,
                    ClickKind::Left | ClickKind::Double => Button::Left,
                };
                self.enigo
                    .button(button, Direction::Click)
                    .map_err(|e| ActionError::Input(format!("{e:?}")))?;
            }
            Ok(())
        }

        fn scroll(&mut self, notches: i32) -> Result<(), ActionError> {
            // enigo scrolls down for positive lengths.
            self.enigo
                .scroll(-notches, Axis::Vertical)
                .map_err(|e| ActionError::Input(format!("{e:?}")))
        }

        fn screenshot(&mut self) -> Result<PathBuf, ActionError> {
            self.screenshot.capture()
        }
    }

    fn to_enigo_key(key: KeyName) -> Key {
        match key {
            KeyName::Control => Key::Control,
            KeyName::Shift => Key::Shift,
            KeyName::Alt => Key::Alt,
            KeyName::Meta => Key::Meta,
            KeyName::Return => Key::Return,
            KeyName::Tab => Key::Tab,
            KeyName::Escape => Key::Escape,
            KeyName::Space => Key::Space,
            KeyName::Backspace => Key::Backspace,
            KeyName::Delete => Key::Delete,
            KeyName::Home => Key::Home,
            KeyName::End => Key::End,
            KeyName::PageUp => Key::PageUp,
            KeyName::PageDown => Key::PageDown,
            KeyName::Up => Key::UpArrow,
            KeyName::Down => Key::DownArrow,
            KeyName::Left => Key::LeftArrow,
            KeyName::Right => Key::RightArrow,
            KeyName::F(n) => function_key(n),
            KeyName::Char(c) => Key::Unicode(c),
        }
    }

    fn function_key(n: u8) -> Key {
        match n {
            1 => Key::F1,
            2 => Key::F2,
            3 => Key::F3,
            4 => Key::F4,
            5 => Key::F5,
            6 => Key::F6,
            7 => Key::F7,
            8 => Key::F8,
            9 => Key::F9,
            10 => Key::F10,
            11 => Key::F11,
            _ => Key::F12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_names() {
        let keys = parse_keys(&["Ctrl".into(), "shift".into(), "p".into()]).unwrap();
        assert_eq!(keys, vec![KeyName::Control, KeyName::Shift, KeyName::Char('p')]);
        assert_eq!("enter".parse::<KeyName>().unwrap(), KeyName::Return);
        assert_eq!("F5".parse::<KeyName>().unwrap(), KeyName::F(5));
        assert_eq!("cmd".parse::<KeyName>().unwrap(), KeyName::Meta);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!("hyper".parse::<KeyName>(), Err(ActionError::UnknownKey(_))));
        assert!(matches!("f13".parse::<KeyName>(), Err(ActionError::UnknownKey(_))));
        assert!(matches!(parse_keys(&[]), Err(ActionError::MissingHotkey)));
    }

    #[test]
    fn failing_screenshot_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let command = ScreenshotCommand {
            program: "false".into(),
            args: Vec::new(),
            dir: dir.path().to_path_buf(),
        };
        assert!(matches!(command.capture(), Err(ActionError::Screenshot(_))));
    }
}
