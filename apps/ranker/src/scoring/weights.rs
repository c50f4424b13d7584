use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluatorKind;

/// Tolerance used when checking that a weight set sums to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-session importance weights for the four evaluation dimensions.
///
/// Produced by [`normalize`], so every stored or applied `WeightSet` sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub culture: f64,
}

impl Default for WeightSet {
    /// 40% skills, 35% experience, 15% education, 10% culture.
    fn default() -> Self {
        Self::STANDARD
    }
}

impl WeightSet {
    pub const STANDARD: WeightSet = WeightSet {
        skills: 0.40,
        experience: 0.35,
        education: 0.15,
        culture: 0.10,
    };

    fn divided_by(&self, divisor: f64) -> WeightSet {
        WeightSet {
            skills: self.skills / divisor,
            experience: self.experience / divisor,
            education: self.education / divisor,
            culture: self.culture / divisor,
        }
    }

    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.education + self.culture
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }

    pub fn weight_for(&self, kind: EvaluatorKind) -> f64 {
        match kind {
            EvaluatorKind::Skills => self.skills,
            EvaluatorKind::Experience => self.experience,
            EvaluatorKind::Education => self.education,
            EvaluatorKind::Culture => self.culture,
        }
    }
}

/// A caller-supplied weight override. Any subset of the four keys may be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<f64>,
}

impl From<WeightSet> for PartialWeights {
    fn from(w: WeightSet) -> Self {
        Self {
            skills: Some(w.skills),
            experience: Some(w.experience),
            education: Some(w.education),
            culture: Some(w.culture),
        }
    }
}

/// Resolves a partial weight map into a `WeightSet` that sums to 1.0.
///
/// Missing (or non-finite) fields take the standard value. If the resolved
/// values sum to exactly zero the standard weights are returned unchanged.
/// Negative values are accepted as-is.
pub fn normalize(partial: &PartialWeights) -> WeightSet {
    let std = WeightSet::STANDARD;
    let resolve = |value: Option<f64>, fallback: f64| match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    };

    let mut resolved = WeightSet {
        skills: resolve(partial.skills, std.skills),
        experience: resolve(partial.experience, std.experience),
        education: resolve(partial.education, std.education),
        culture: resolve(partial.culture, std.culture),
    };

    let mut total = resolved.sum();
    if !total.is_finite() {
        // Finite values can still overflow when added; bring them to unit scale first.
        let largest = [
            resolved.skills,
            resolved.experience,
            resolved.education,
            resolved.culture,
        ]
        .iter()
        .fold(0.0_f64, |max, v| max.max(v.abs()));
        resolved = resolved.divided_by(largest);
        total = resolved.sum();
    }
    if total == 0.0 || !total.is_finite() {
        return std;
    }

    resolved.divided_by(total)
}
