//! Absence model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AbsenceId, DisciplineId};

/// Hours missed from a discipline on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    pub id: AbsenceId,
    pub date: DateTime<Utc>,
    pub hours: u32,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub discipline_id: Option<DisciplineId>,
}

impl Absence {
    pub fn new(date: DateTime<Utc>, hours: u32, discipline_id: DisciplineId) -> Self {
        Self {
            id: AbsenceId::new(),
            date: super::time::to_seconds(date),
            hours,
            remark: None,
            discipline_id: Some(discipline_id),
        }
    }
}
