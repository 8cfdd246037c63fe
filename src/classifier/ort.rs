use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{Classifier, argmax};

#[derive(Clone, Debug)]
pub struct OrtClassifierConfig {
    pub model_path: PathBuf,
    /// Expected feature vector length (the model's second input dimension).
    pub input_len: usize,
    /// Scores below this floor resolve to `fallback_id` instead of the arg-max.
    pub min_score: Option<f32>,
    pub fallback_id: usize,
}

impl OrtClassifierConfig {
    pub fn new(model_path: impl Into<PathBuf>, input_len: usize) -> Self {
        Self {
            model_path: model_path.into(),
            input_len,
            min_score: None,
            fallback_id: 0,
        }
    }
}

/// Runs an ONNX classification model with a `(1, input_len)` float input and
/// one score per class as its first output.
pub struct OrtClassifier {
    session: Session,
    config: OrtClassifierConfig,
}

impl OrtClassifier {
    pub fn new(config: OrtClassifierConfig) -> Result<Self> {
        let session = load_session(&config.model_path)?;
        log::info!(
            "loaded gesture classification model from {} (input {})",
            config.model_path.display(),
            config.input_len
        );
        Ok(Self { session, config })
    }

    fn scores(&mut self, features: &[f32]) -> Result<Vec<f32>> {
        let input = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .context("failed to shape classifier input")?;
        let tensor = Tensor::from_array(input)?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("model inference failed")?;
        if outputs.len() < 1 {
            return Err(anyhow!("model returned no outputs"));
        }

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .context("failed to extract scores")?;
        Ok(logits.iter().copied().collect())
    }
}

impl Classifier for OrtClassifier {
    fn classify(&mut self, features: &[f32]) -> Result<usize> {
        if features.len() != self.config.input_len {
            return Err(anyhow!(
                "unexpected feature length: got {}, need {}",
                features.len(),
                self.config.input_len
            ));
        }

        let scores = self.scores(features)?;
        let (id, score) = argmax(&scores).ok_or_else(|| anyhow!("model returned no scores"))?;

        match self.config.min_score {
            Some(floor) if score < floor => Ok(self.config.fallback_id),
            _ => Ok(id),
        }
    }
}

fn load_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        return Err(anyhow!("model file {} does not exist", model_path.display()));
    }

    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(1)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))
}
