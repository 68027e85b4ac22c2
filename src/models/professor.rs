//! Professor model
//!
//! Professors keep contact details and an optional photo, and reference the
//! disciplines they teach. Deleting a discipline removes it from those lists.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{DisciplineId, ProfessorId};

/// Academic title shown before a professor's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcademicTitle {
    #[default]
    #[serde(rename = "Nenhum")]
    None,
    #[serde(rename = "Dr.")]
    Dr,
    #[serde(rename = "Dra.")]
    Dra,
    #[serde(rename = "Prof.")]
    Prof,
    #[serde(rename = "Profa.")]
    Profa,
    #[serde(rename = "MSc.")]
    Msc,
    #[serde(rename = "Esp.")]
    Esp,
}

impl AcademicTitle {
    pub const ALL: [AcademicTitle; 7] = [
        Self::None,
        Self::Dr,
        Self::Dra,
        Self::Prof,
        Self::Profa,
        Self::Msc,
        Self::Esp,
    ];

    /// Label used in backup files
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Nenhum",
            Self::Dr => "Dr.",
            Self::Dra => "Dra.",
            Self::Prof => "Prof.",
            Self::Profa => "Profa.",
            Self::Msc => "MSc.",
            Self::Esp => "Esp.",
        }
    }

    /// Parse a backup label; unknown or empty text means no title
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or_default()
    }
}

/// A professor with contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
    #[serde(default)]
    pub title: AcademicTitle,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub office_hours: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default, with = "photo_encoding", skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<u8>>,
    #[serde(default)]
    pub discipline_ids: Vec<DisciplineId>,
}

impl Professor {
    /// Create a professor with only a name set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProfessorId::new(),
            name: name.into(),
            title: AcademicTitle::None,
            specialty: String::new(),
            department: String::new(),
            email: String::new(),
            phone: String::new(),
            whatsapp: String::new(),
            office_hours: String::new(),
            room: String::new(),
            remarks: String::new(),
            photo: None,
            discipline_ids: Vec::new(),
        }
    }

    /// Name prefixed with the academic title, if any
    pub fn display_name(&self) -> String {
        match self.title {
            AcademicTitle::None => self.name.clone(),
            title => format!("{} {}", title.label(), self.name),
        }
    }

    /// Link a discipline, ignoring duplicates
    pub fn teach(&mut self, discipline_id: DisciplineId) {
        if !self.discipline_ids.contains(&discipline_id) {
            self.discipline_ids.push(discipline_id);
        }
    }
}

impl fmt::Display for Professor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Serde adapter storing photo bytes as standard base64 text
pub mod photo_encoding {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(photo: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match photo {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|text| STANDARD.decode(text.as_bytes()))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
