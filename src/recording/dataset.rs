use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

pub const STATIC_DATASET_FILENAME: &str = "keypoint.csv";
pub const MOTION_DATASET_FILENAME: &str = "point_history.csv";

#[derive(Debug, Error)]
#[error("failed to append sample to {path}: {source}")]
pub struct DatasetError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Append-only CSV store of labeled samples, one `label,f1,f2,...` row each.
#[derive(Clone, Debug)]
pub struct DatasetWriter {
    path: PathBuf,
}

impl DatasetWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, label: u8, features: &[f32]) -> Result<(), DatasetError> {
        self.try_append(label, features).map_err(|source| DatasetError {
            path: self.path.clone(),
            source,
        })
    }

    fn try_append(&self, label: u8, features: &[f32]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut row = label.to_string();
        for value in features {
            let _ = write!(row, ",{value}");
        }
        row.push('\n');

        // One write per row.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(row.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DatasetWriter::new(dir.path().join("data").join(STATIC_DATASET_FILENAME));
        writer.append(7, &[0.0, -0.5, 1.0]).unwrap();
        writer.append(2, &[0.25]).unwrap();

        let text = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(text, "7,0,-0.5,1\n2,0.25\n");
    }

    #[test]
    fn reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the open fail.
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();

        let err = DatasetWriter::new(&path).append(1, &[0.5]).unwrap_err();
        assert_eq!(err.path, path);
    }
}
