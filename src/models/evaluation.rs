//! Evaluation model
//!
//! Evaluations are the weighted grades that make up a discipline's average.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DisciplineId, EvaluationId};

/// A graded piece of work with a weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub title: String,
    pub score: f64,
    pub weight: f64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub discipline_id: Option<DisciplineId>,
}

impl Evaluation {
    /// Create an evaluation with weight 1.0
    pub fn new(title: impl Into<String>, score: f64, date: DateTime<Utc>, discipline_id: DisciplineId) -> Self {
        Self {
            id: EvaluationId::new(),
            title: title.into(),
            score,
            weight: 1.0,
            date: super::time::to_seconds(date),
            discipline_id: Some(discipline_id),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}
