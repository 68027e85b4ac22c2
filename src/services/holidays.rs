//! Holiday service
//!
//! Calendar queries over stored holidays and seeding of the fixed national
//! holiday list.

use chrono::NaiveDate;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{time, Holiday};
use crate::storage::Storage;

/// Fixed-date national holidays (Paraguay), as (month, day, name)
pub const NATIONAL_HOLIDAYS: [(u32, u32, &str); 10] = [
    (1, 1, "Ano Novo"),
    (3, 1, "Dia dos Heróis"),
    (5, 1, "Dia do Trabalhador"),
    (5, 14, "Independência do Paraguai"),
    (5, 15, "Independência do Paraguai (Dia das Mães)"),
    (6, 12, "Paz do Chaco"),
    (8, 15, "Fundação de Assunção"),
    (9, 29, "Batalha de Boquerón"),
    (12, 8, "Dia da Virgem de Caacupé"),
    (12, 25, "Natal"),
];

/// Service for holiday queries and seeding
pub struct HolidayService<'a> {
    storage: &'a Storage,
}

impl<'a> HolidayService<'a> {
    /// Create a new holiday service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every holiday falling on `date`
    pub fn occurring_on(&self, date: NaiveDate) -> PlannerResult<Vec<Holiday>> {
        self.storage.holidays.filter(|h| h.occurs_on(date))
    }

    /// Holidays on `date` that suspend classes
    pub fn blocks_classes_on(&self, date: NaiveDate) -> PlannerResult<Vec<Holiday>> {
        self.storage
            .holidays
            .filter(|h| h.blocks_classes && h.occurs_on(date))
    }

    /// Whether classes run on `date`
    pub fn is_class_day(&self, date: NaiveDate) -> PlannerResult<bool> {
        Ok(self.blocks_classes_on(date)?.is_empty())
    }

    /// Insert the national holidays for `year`, returning those added
    ///
    /// A holiday is skipped when one with the same name already falls on
    /// that day, so seeding is safe to repeat.
    pub fn seed_national_holidays(&self, year: i32) -> PlannerResult<Vec<Holiday>> {
        let added = self.storage.transaction(|store| {
            let mut added = Vec::new();

            for (month, day, name) in NATIONAL_HOLIDAYS {
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    PlannerError::Validation(format!("Invalid holiday date {}-{:02}-{:02}", year, month, day))
                })?;

                let exists = store
                    .holidays
                    .filter(|h| h.name == name && h.occurs_on(date))?;
                if !exists.is_empty() {
                    continue;
                }

                let holiday = Holiday::new(name, time::start_of_day(date)).recurring();
                store.holidays.insert(holiday.clone())?;
                added.push(holiday);
            }

            Ok(added)
        })?;

        if added.is_empty() {
            return Ok(added);
        }

        let entries: Vec<AuditEntry> = added
            .iter()
            .map(|h| AuditEntry::create(EntityType::Holiday, h.id.to_string(), Some(h.name.clone()), h))
            .collect();
        self.storage.log(&entries);

        info!(year, count = added.len(), "Seeded national holidays");
        Ok(added)
    }
}
