//! The tracker core is organized in three parts:
//!  - [log_storage] keeps one record file per day with the completion marks.
//!  - [registry] keeps the ordered list of habits.
//!  - [aggregate] derives the checklist, week, month and year views.
//!
//! [HabitTracker] wires the three together behind the operations the
//! presentation layer calls.

pub mod aggregate;
pub mod entities;
pub mod error;
pub mod log_storage;
pub mod registry;

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Local, NaiveDate};

use crate::utils::{
    clock::{Clock, DefaultClock},
    time::{Year, YearMonth},
};

use aggregate::{HeatmapDay, MonthStat, WeekGrid};
use entities::{Habit, HabitId};
use error::TrackerError;
use log_storage::{LogStorage, LogStorageImpl};
use registry::{HabitRegistry, HabitRegistryImpl};

/// Everything a frontend needs: the store, the registry and a date provider.
/// All state lives in storage, so the tracker itself can be rebuilt at any
/// point without losing anything.
pub struct HabitTracker<S: LogStorage, R: HabitRegistry> {
    storage: S,
    registry: R,
    date_provider: Box<dyn Clock>,
}

impl HabitTracker<LogStorageImpl, HabitRegistryImpl> {
    /// Opens the file backed tracker inside the application directory.
    pub fn open(data_dir: &Path) -> Result<Self, std::io::Error> {
        Ok(Self::new(
            LogStorageImpl::new(data_dir.join("records"))?,
            HabitRegistryImpl::new(data_dir)?,
            Box::new(DefaultClock),
        ))
    }
}

impl<S: LogStorage + Sync, R: HabitRegistry + Sync> HabitTracker<S, R> {
    pub fn new(storage: S, registry: R, date_provider: Box<dyn Clock>) -> Self {
        Self {
            storage,
            registry,
            date_provider,
        }
    }

    pub fn now(&self) -> DateTime<Local> {
        self.date_provider.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.date_provider.today()
    }

    pub async fn add_habit(&self, name: &str) -> Result<Habit, TrackerError> {
        self.registry.add(name).await
    }

    pub async fn habits(&self) -> Result<Vec<Habit>, TrackerError> {
        Ok(self.registry.list().await?)
    }

    /// Records the completion flag for one habit on one day. Writing the
    /// same flag again changes nothing observable, writing the opposite flag
    /// replaces it.
    pub async fn set_completed(
        &self,
        habit_id: HabitId,
        day: NaiveDate,
        done: bool,
    ) -> Result<(), TrackerError> {
        Ok(self.storage.upsert(habit_id, day, done).await?)
    }

    pub async fn checklist(&self, day: NaiveDate) -> Result<HashMap<HabitId, bool>, TrackerError> {
        aggregate::daily_checklist(&self.registry, &self.storage, day).await
    }

    pub async fn week(&self, anchor: NaiveDate) -> Result<WeekGrid, TrackerError> {
        aggregate::week_grid(&self.registry, &self.storage, anchor).await
    }

    pub async fn month_stat(&self, month: YearMonth) -> Result<MonthStat, TrackerError> {
        aggregate::month_stat(&self.registry, &self.storage, month).await
    }

    pub async fn year_heatmap(&self, year: Year) -> Result<Vec<HeatmapDay>, TrackerError> {
        aggregate::year_heatmap(&self.storage, year).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        tracker::{log_storage::LogStorageImpl, registry::HabitRegistryImpl, HabitTracker},
        utils::clock::MockClock,
    };

    const TEST_DAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();

    #[tokio::test]
    async fn test_tracker_round_trip_with_a_fixed_clock() -> Result<()> {
        let dir = tempdir()?;

        let mut clock = MockClock::new();
        clock.expect_today().return_const(TEST_DAY);

        let tracker = HabitTracker::new(
            LogStorageImpl::new(dir.path().join("records"))?,
            HabitRegistryImpl::new(dir.path())?,
            Box::new(clock),
        );

        let read = tracker.add_habit("Read").await?;
        let run = tracker.add_habit("Run").await?;

        let today = tracker.today();
        assert_eq!(today, TEST_DAY);

        tracker.set_completed(read.id, today, true).await?;

        let checklist = tracker.checklist(today).await?;
        assert_eq!(checklist[&read.id], true);
        assert_eq!(checklist[&run.id], false);

        let week = tracker.week(today).await?;
        assert_eq!(week.grid[&(read.id, today)], true);

        let stat = tracker.month_stat("2024-02".parse()?).await?;
        assert_eq!(stat.completed, 1);
        assert_eq!(stat.capacity, 60);

        let heatmap = tracker.year_heatmap("2024".parse()?).await?;
        let today_cell = heatmap.iter().find(|v| v.date == today).unwrap();
        assert_eq!(today_cell.level, 1);
        Ok(())
    }
}
