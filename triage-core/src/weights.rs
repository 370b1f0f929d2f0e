//! Weight configuration for the four scoring factors.

use serde::{Deserialize, Serialize};

/// Per-factor weights. Not normalized; they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependency: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            urgency: 0.4,
            importance: 0.4,
            effort: 0.1,
            dependency: 0.1,
        }
    }
}

impl Weights {
    pub fn new(urgency: f64, importance: f64, effort: f64, dependency: f64) -> Self {
        Self {
            urgency,
            importance,
            effort,
            dependency,
        }
    }

    /// Weighted sum of the four factor sub-scores.
    pub fn combine(&self, urgency: f64, importance: f64, effort: f64, dependency: f64) -> f64 {
        urgency * self.urgency
            + importance * self.importance
            + effort * self.effort
            + dependency * self.dependency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = Weights::default();
        assert_eq!(w, Weights::new(0.4, 0.4, 0.1, 0.1));
    }

    #[test]
    fn test_combine_is_plain_weighted_sum() {
        let w = Weights::new(1.0, 2.0, 0.0, 0.5);
        assert_eq!(w.combine(10.0, 10.0, 99.0, 4.0), 32.0);
    }

    #[test]
    fn test_partial_weights_fill_from_defaults() {
        let w: Weights = serde_json::from_str(r#"{ "urgency": 1.0 }"#).unwrap();
        assert_eq!(w.urgency, 1.0);
        assert_eq!(w.importance, 0.4);
        assert_eq!(w.dependency, 0.1);
    }
}
