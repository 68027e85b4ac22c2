//! Exam model
//!
//! Exams carry an optional achieved score and a format (`ExamType`). The
//! serialized names of `ExamType` are the labels stored in backup files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{DisciplineId, ExamId};

/// Format of an exam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExamType {
    /// Written, multiple-choice exam
    #[default]
    #[serde(rename = "Teórica (Múltipla Escolha)")]
    Theory,
    /// Laboratory or clinical practice
    #[serde(rename = "Prática (Laboratório/Clínica)")]
    Practical,
    /// Objective structured clinical examination
    #[serde(rename = "OSCE")]
    Osce,
    #[serde(rename = "Seminário")]
    Seminar,
    #[serde(rename = "Trabalho Escrito")]
    WrittenAssignment,
}

impl ExamType {
    pub const ALL: [ExamType; 5] = [
        Self::Theory,
        Self::Practical,
        Self::Osce,
        Self::Seminar,
        Self::WrittenAssignment,
    ];

    /// Label used in backup files
    pub fn label(&self) -> &'static str {
        match self {
            Self::Theory => "Teórica (Múltipla Escolha)",
            Self::Practical => "Prática (Laboratório/Clínica)",
            Self::Osce => "OSCE",
            Self::Seminar => "Seminário",
            Self::WrittenAssignment => "Trabalho Escrito",
        }
    }

    /// Parse a backup label, falling back to the default for unknown text
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or_default()
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Theory => write!(f, "Theory"),
            Self::Practical => write!(f, "Practical"),
            Self::Osce => write!(f, "OSCE"),
            Self::Seminar => write!(f, "Seminar"),
            Self::WrittenAssignment => write!(f, "Written assignment"),
        }
    }
}

/// A scheduled exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub exam_date: DateTime<Utc>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub exam_type: ExamType,
    #[serde(default)]
    pub discipline_id: Option<DisciplineId>,
}

impl Exam {
    pub fn new(title: impl Into<String>, exam_date: DateTime<Utc>, exam_type: ExamType) -> Self {
        Self {
            id: ExamId::new(),
            title: title.into(),
            description: String::new(),
            exam_date: super::time::to_seconds(exam_date),
            score: None,
            exam_type,
            discipline_id: None,
        }
    }

    /// An exam is graded once a score has been recorded
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for exam_type in ExamType::ALL {
            assert_eq!(ExamType::from_label(exam_type.label()), exam_type);
        }
        assert_eq!(ExamType::from_label("Oral"), ExamType::Theory);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&ExamType::Osce).unwrap();
        assert_eq!(json, "\"OSCE\"");
        let parsed: ExamType = serde_json::from_str("\"Seminário\"").unwrap();
        assert_eq!(parsed, ExamType::Seminar);
    }
}
