//! Task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DisciplineId, TaskId};

/// A homework item or assignment with a due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub discipline_id: Option<DisciplineId>,
}

impl Task {
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            due_date: super::time::to_seconds(due_date),
            completed: false,
            discipline_id: None,
        }
    }

    pub fn for_discipline(
        title: impl Into<String>,
        due_date: DateTime<Utc>,
        discipline_id: DisciplineId,
    ) -> Self {
        let mut task = Self::new(title, due_date);
        task.discipline_id = Some(discipline_id);
        task
    }

    /// Whether the task is still open after `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_overdue() {
        let due = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
        let mut task = Task::new("Read ch.3", due);
        let later = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();

        assert!(task.is_overdue(later));
        task.completed = true;
        assert!(!task.is_overdue(later));
    }
}
