use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use thiserror::Error;

use super::kind::{ActionDescriptor, ActionParams, ActionType};

pub const DEFAULT_ACTIONS_FILENAME: &str = "gesture_actions_config.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("gesture label must not be empty")]
    EmptyLabel,
    #[error("action type must not be empty")]
    EmptyActionType,
    #[error("failed to encode action mapping: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write action mapping to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One row of the mapping overview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingInfo {
    pub gesture: String,
    pub action_type: String,
    pub description: String,
    pub details: String,
}

/// Gesture label to action mapping, persisted as pretty JSON after every change.
#[derive(Debug)]
pub struct ActionStore {
    path: PathBuf,
    mappings: IndexMap<String, ActionDescriptor>,
}

pub fn default_mappings() -> IndexMap<String, ActionDescriptor> {
    [
        ("Open", ActionDescriptor::hotkey(["ctrl", "o"])),
        ("Close", ActionDescriptor::hotkey(["ctrl", "w"])),
        ("Pointer", ActionDescriptor::hotkey(["ctrl", "p"])),
        ("OK", ActionDescriptor::hotkey(["ctrl", "enter"])),
        (
            "Thumb Up",
            ActionDescriptor::new(ActionType::Save, ActionParams::hotkey(["ctrl", "s"])),
        ),
        ("Peace Sign", ActionDescriptor::hotkey(["ctrl", "shift", "p"])),
        ("Thumb Down", ActionDescriptor::hotkey(["ctrl", "shift", "f"])),
    ]
    .into_iter()
    .map(|(label, descriptor)| (label.to_string(), descriptor))
    .collect()
}

impl ActionStore {
    /// Store with the given mappings that persists to `path`; nothing is read or written yet.
    pub fn with_mappings(
        path: impl Into<PathBuf>,
        mappings: IndexMap<String, ActionDescriptor>,
    ) -> Self {
        Self {
            path: path.into(),
            mappings,
        }
    }

    /// Loads the mapping at `path`.
    ///
    /// A missing file is created with the built-in defaults. An unreadable
    /// document is moved aside to `<path>.corrupt` and replaced by the
    /// defaults; if it cannot be moved, it is left untouched. Write failures are logged; the in-memory mapping is usable
    /// either way.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let mappings = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<IndexMap<String, ActionDescriptor>>(&text) {
                Ok(mappings) => {
                    log::info!(
                        "loaded {} action mappings from {}",
                        mappings.len(),
                        path.display()
                    );
                    return Self { path, mappings };
                }
                Err(err) => {
                    log::error!("action mapping {} is corrupt: {err}", path.display());
                    let backup = corrupt_backup_path(&path);
                    if let Err(err) = fs::rename(&path, &backup) {
                        log::warn!(
                            "failed to move corrupt mapping aside to {}: {err}; using defaults without saving",
                            backup.display()
                        );
                        return Self {
                            path,
                            mappings: default_mappings(),
                        };
                    }
                    default_mappings()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "no action mapping at {}, writing defaults",
                    path.display()
                );
                default_mappings()
            }
            Err(err) => {
                log::error!(
                    "failed to read action mapping {}: {err}; using defaults",
                    path.display()
                );
                return Self {
                    path,
                    mappings: default_mappings(),
                };
            }
        };

        let store = Self { path, mappings };
        if let Err(err) = store.save() {
            log::error!("{err}");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn lookup(&self, label: &str) -> Option<&ActionDescriptor> {
        self.mappings.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionDescriptor)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Writes the whole document through a temp file renamed into place.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.mappings)?;
        write_atomically(&self.path, json.as_bytes()).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::info!("action mapping saved to {}", self.path.display());
        Ok(())
    }

    /// Inserts or replaces the mapping for `label`, then persists.
    ///
    /// On a write failure the new mapping stays active in memory and the
    /// error is returned.
    pub fn upsert(
        &mut self,
        label: &str,
        action_type: ActionType,
        params: ActionParams,
    ) -> Result<(), StoreError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        if action_type.as_str().trim().is_empty() {
            return Err(StoreError::EmptyActionType);
        }
        if !action_type.is_known() {
            log::warn!("mapping {label:?} to unsupported action {action_type}; it will not execute");
        }

        log::info!("mapping {label:?} -> {action_type}");
        self.mappings
            .insert(label.to_string(), ActionDescriptor::new(action_type, params));
        self.save()
    }

    /// Every action type the dispatcher can execute, with a description, in menu order.
    pub fn list_action_types() -> Vec<(ActionType, &'static str)> {
        ActionType::KNOWN
            .into_iter()
            .map(|action| {
                let description = action.description();
                (action, description)
            })
            .collect()
    }

    pub fn describe(&self) -> Vec<MappingInfo> {
        self.mappings
            .iter()
            .map(|(gesture, descriptor)| {
                let details = match (&descriptor.action_type, descriptor.params.hotkey_text()) {
                    (ActionType::CustomHotkey, Some(keys)) => {
                        let meaning = ide_hotkey_meaning(&keys.to_lowercase())
                            .unwrap_or("Custom key combination");
                        format!("{keys} - {meaning}")
                    }
                    _ => String::new(),
                };
                MappingInfo {
                    gesture: gesture.clone(),
                    action_type: descriptor.action_type.to_string(),
                    description: descriptor.action_type.description().to_string(),
                    details,
                }
            })
            .collect()
    }
}

fn ide_hotkey_meaning(keys: &str) -> Option<&'static str> {
    let meaning = match keys {
        "ctrl+o" => "Open file",
        "ctrl+w" => "Close file",
        "ctrl+p" => "Quick open",
        "ctrl+enter" => "Run command",
        "ctrl+s" => "Save file",
        "ctrl+shift+p" => "Command palette",
        "ctrl+shift+f" => "Search in files",
        "ctrl+shift+b" => "Build project",
        "f5" => "Start debugging",
        "ctrl+f5" => "Run without debugging",
        "ctrl+c" => "Copy",
        "ctrl+v" => "Paste",
        "ctrl+x" => "Cut",
        "ctrl+a" => "Select all",
        "alt+f4" => "Close window",
        _ => return None,
    };
    Some(meaning)
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".corrupt");
    PathBuf::from(name)
}

fn write_atomically(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = dest.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp_path, dest)
}
