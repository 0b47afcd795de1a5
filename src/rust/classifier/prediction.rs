use std::fmt;

use super::error::ClassifierError;
use super::label::Label;
use super::utils::argmax;

/// Outcome of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: Label,
    /// Probability of `label` as a percentage in `[0, 100]`, unrounded
    pub confidence: f32,
    /// Every label with its probability, highest first
    pub scores: Vec<(Label, f32)>,
}

impl ClassificationResult {
    /// Selects the most probable label from a probability vector in `Label::ALL` order.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self, ClassifierError> {
        if probabilities.len() != Label::COUNT {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced {} scores, expected one per class ({})",
                probabilities.len(),
                Label::COUNT
            )));
        }
        if let Some(pos) = probabilities.iter().position(|p| !p.is_finite()) {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced a non-finite score for {}",
                Label::ALL[pos]
            )));
        }

        let best = argmax(probabilities)
            .ok_or_else(|| ClassifierError::PredictionError("Model produced no scores".into()))?;
        let label = Label::ALL[best];
        let confidence = (probabilities[best] * 100.0).clamp(0.0, 100.0);

        let mut scores: Vec<(Label, f32)> = Label::ALL.iter().copied().zip(probabilities.iter().copied()).collect();
        // Stable sort keeps index order among equal scores
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(Self { label, confidence, scores })
    }

    /// Confidence rounded to two decimals, for display.
    pub fn rounded_confidence(&self) -> f32 {
        (self.confidence * 100.0).round() / 100.0
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}%)", self.label, self.confidence)
    }
}
