mod ort;

pub use self::ort::{OrtClassifier, OrtClassifierConfig};

/// A gesture classifier: fixed-length feature vector in, class id out.
///
/// Implementations should be deterministic. Returned ids are not trusted;
/// callers resolve them through a [`crate::gesture::LabelSet`].
pub trait Classifier {
    fn classify(&mut self, features: &[f32]) -> anyhow::Result<usize>;
}

impl<F> Classifier for F
where
    F: FnMut(&[f32]) -> usize,
{
    fn classify(&mut self, features: &[f32]) -> anyhow::Result<usize> {
        Ok(self(features))
    }
}

/// Index of the highest score; `None` for an empty slice.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_classifiers() {
        let mut classifier = |features: &[f32]| features.len();
        assert_eq!(Classifier::classify(&mut classifier, &[0.0; 42]).unwrap(), 42);
    }

    #[test]
    fn argmax_picks_highest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(argmax(&[]), None);
    }
}
