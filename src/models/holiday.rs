//! Holiday model
//!
//! Holidays either happen once on their date or, when recurring, on the same
//! month and day every year.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::HolidayId;

/// Scope of a holiday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HolidayKind {
    #[default]
    #[serde(rename = "Nacional")]
    National,
    #[serde(rename = "Municipal")]
    Municipal,
    /// Declared by the school or institution
    #[serde(rename = "Escolar/Institucional")]
    Institutional,
    #[serde(rename = "Outro")]
    Other,
}

impl HolidayKind {
    pub const ALL: [HolidayKind; 4] = [
        Self::National,
        Self::Municipal,
        Self::Institutional,
        Self::Other,
    ];

    /// Label used in backup files
    pub fn label(&self) -> &'static str {
        match self {
            Self::National => "Nacional",
            Self::Municipal => "Municipal",
            Self::Institutional => "Escolar/Institucional",
            Self::Other => "Outro",
        }
    }

    /// Parse a backup label, falling back to `National`
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.label() == label)
            .unwrap_or_default()
    }
}

impl fmt::Display for HolidayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::National => write!(f, "National"),
            Self::Municipal => write!(f, "Municipal"),
            Self::Institutional => write!(f, "Institutional"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A day off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: HolidayId,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub kind: HolidayKind,
    /// Repeats every year on the same month/day
    #[serde(default)]
    pub recurring: bool,
    /// Classes are suspended on this day
    #[serde(default = "default_blocks_classes")]
    pub blocks_classes: bool,
}

fn default_blocks_classes() -> bool {
    true
}

impl Holiday {
    /// Create a one-off national holiday that blocks classes
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: HolidayId::new(),
            name: name.into(),
            date: super::time::to_seconds(date),
            kind: HolidayKind::National,
            recurring: false,
            blocks_classes: true,
        }
    }

    /// Make this holiday repeat yearly
    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    /// Calendar day (UTC) the holiday was registered for
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Whether the holiday falls on `date`
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        let day = self.day();
        if self.recurring {
            day.month() == date.month() && day.day() == date.day()
        } else {
            day == date
        }
    }
}
