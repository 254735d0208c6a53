use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

/// Agreement between a catalogue title and its extracted counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Correct,
    HasChanges,
    Incorrect,
    Missing,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Correct,
        Category::HasChanges,
        Category::Incorrect,
        Category::Missing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::HasChanges => "has changes",
            Self::Incorrect => "incorrect",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper bounds (exclusive) of the first three score bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub correct_below: f64,
    pub changes_below: f64,
    pub incorrect_below: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            correct_below: 0.13,
            changes_below: 0.65,
            incorrect_below: 0.99,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, score: f64) -> Category {
        if score < self.correct_below {
            Category::Correct
        } else if score < self.changes_below {
            Category::HasChanges
        } else if score < self.incorrect_below {
            Category::Incorrect
        } else {
            Category::Missing
        }
    }

    /// Bands must be non-decreasing and lie within `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.correct_below, self.changes_below, self.incorrect_below];
        if bounds.iter().any(|b| !(0.0..=1.0).contains(b)) {
            return Err(ReconError::Config(format!(
                "thresholds must lie in [0, 1]: {bounds:?}"
            )));
        }
        if bounds.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(ReconError::Config(format!(
                "thresholds must be non-decreasing: {bounds:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bounds_are_inclusive() {
        let t = Thresholds::default();
        assert_eq!(t.classify(0.0), Category::Correct);
        assert_eq!(t.classify(0.1299), Category::Correct);
        assert_eq!(t.classify(0.13), Category::HasChanges);
        assert_eq!(t.classify(0.6499), Category::HasChanges);
        assert_eq!(t.classify(0.65), Category::Incorrect);
        assert_eq!(t.classify(0.9899), Category::Incorrect);
        assert_eq!(t.classify(0.99), Category::Missing);
        assert_eq!(t.classify(1.0), Category::Missing);
    }

    #[test]
    fn labels() {
        let labels: Vec<String> = Category::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["correct", "has changes", "incorrect", "missing"]);
    }

    #[test]
    fn validate_rejects_unordered_or_out_of_range() {
        assert!(Thresholds::default().validate().is_ok());
        let unordered = Thresholds {
            correct_below: 0.7,
            ..Thresholds::default()
        };
        assert!(unordered.validate().is_err());
        let out_of_range = Thresholds {
            incorrect_below: 1.5,
            ..Thresholds::default()
        };
        assert!(out_of_range.validate().is_err());
    }
}
