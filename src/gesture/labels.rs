use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

pub const UNKNOWN_GESTURE: &str = "Unknown";

pub const DEFAULT_STATIC_LABELS: &[&str] = &["Open", "Close", "Pointer", "OK"];
pub const DEFAULT_MOTION_LABELS: &[&str] = &["Stop", "Clockwise", "Counter Clockwise", "Move"];

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("label name must not be empty")]
    EmptyName,
    #[error("label {0:?} already exists")]
    Duplicate(String),
    #[error("failed to append label to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Id to name table for one classifier, backed by a one-label-per-line file.
#[derive(Clone, Debug)]
pub struct LabelSet {
    labels: Vec<String>,
    path: Option<PathBuf>,
}

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            path: None,
        }
    }

    /// Reads `path`, falling back to `defaults` when it cannot be read or
    /// holds no labels.
    ///
    /// A byte-order mark is tolerated, blank lines are skipped and only the
    /// first comma-separated field of each line is used.
    pub fn load_or_default(path: &Path, defaults: &[&str]) -> Self {
        let labels = match fs::read_to_string(path) {
            Ok(text) => {
                let labels = parse_labels(&text);
                if labels.is_empty() {
                    log::warn!(
                        "no labels in {}; using built-in labels",
                        path.display()
                    );
                    defaults.iter().map(|s| s.to_string()).collect()
                } else {
                    labels
                }
            }
            Err(err) => {
                log::warn!(
                    "failed to read labels from {}: {err}; using built-in labels",
                    path.display()
                );
                defaults.iter().map(|s| s.to_string()).collect()
            }
        };
        log::info!("loaded {} labels for {}", labels.len(), path.display());

        Self {
            labels,
            path: Some(path.to_path_buf()),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Name for a classifier id, or [`UNKNOWN_GESTURE`] for an id the table
    /// doesn't cover.
    pub fn name_or_unknown(&self, id: usize) -> &str {
        self.get(id).unwrap_or(UNKNOWN_GESTURE)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Adds a label at runtime and appends it to the backing file.
    ///
    /// The classifier only learns to emit the new id after retraining.
    pub fn append(&mut self, name: &str) -> Result<usize, LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }
        if self.position(name).is_some() {
            return Err(LabelError::Duplicate(name.to_string()));
        }

        if let Some(path) = &self.path {
            append_line(path, name).map_err(|source| LabelError::Io {
                path: path.clone(),
                source,
            })?;
        }

        self.labels.push(name.to_string());
        Ok(self.labels.len() - 1)
    }
}

fn parse_labels(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .filter_map(|line| {
            let field = line.split(',').next().unwrap_or("").trim();
            (!field.is_empty()).then(|| field.to_string())
        })
        .collect()
}

fn append_line(path: &Path, name: &str) -> io::Result<()> {
    // Terminate a last line that lacks its newline.
    let needs_newline = match fs::read(path) {
        Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
        Err(err) if err.kind() == io::ErrorKind::NotFound => false,
        Err(err) => return Err(err),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_newline {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{name}")
}
