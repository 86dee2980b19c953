use std::{
    collections::HashMap,
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{stream, Stream, StreamExt};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::utils::time::{date_to_log_name, parse_log_name, Year, YearMonth};

use super::{
    entities::{CompletionEntity, HabitId},
    error::StorageError,
};

/// Interface for abstracting storage of completion logs.
/// Queries never fail on missing data, a day nobody logged is an empty day.
pub trait LogStorage {
    /// Writes the completion flag for one habit on one day, replacing
    /// whatever was recorded for that pair before. Durable once the future
    /// resolves.
    fn upsert(
        &self,
        habit_id: HabitId,
        day: NaiveDate,
        value: bool,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Resolved completion flags for every habit with an entry on `day`.
    fn entries_for_day(
        &self,
        day: NaiveDate,
    ) -> impl Future<Output = Result<HashMap<HabitId, bool>, StorageError>> + Send;

    /// The full resolved mapping over every day ever logged. Walks the whole
    /// records directory, which is acceptable for one person's worth of data.
    fn all_entries(
        &self,
    ) -> impl Future<Output = Result<HashMap<(HabitId, NaiveDate), bool>, StorageError>> + Send;

    /// How many habit and day pairs resolved to done within the month.
    fn count_completed_in_month(
        &self,
        month: YearMonth,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Per day sum of done flags across all habits for the whole year. Days
    /// summing to zero are left out, the caller supplies the 0 default.
    fn sum_completed_by_day(
        &self,
        year: Year,
    ) -> impl Future<Output = Result<HashMap<NaiveDate, u32>, StorageError>> + Send;
}

impl<T: Deref + Sync> LogStorage for T
where
    T::Target: LogStorage + Sync,
{
    fn upsert(
        &self,
        habit_id: HabitId,
        day: NaiveDate,
        value: bool,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.deref().upsert(habit_id, day, value)
    }

    fn entries_for_day(
        &self,
        day: NaiveDate,
    ) -> impl Future<Output = Result<HashMap<HabitId, bool>, StorageError>> + Send {
        self.deref().entries_for_day(day)
    }

    fn all_entries(
        &self,
    ) -> impl Future<Output = Result<HashMap<(HabitId, NaiveDate), bool>, StorageError>> + Send
    {
        self.deref().all_entries()
    }

    fn count_completed_in_month(
        &self,
        month: YearMonth,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send {
        self.deref().count_completed_in_month(month)
    }

    fn sum_completed_by_day(
        &self,
        year: Year,
    ) -> impl Future<Output = Result<HashMap<NaiveDate, u32>, StorageError>> + Send {
        self.deref().sum_completed_by_day(year)
    }
}

/// The main realization of [LogStorage]. There is one file per day in the
/// records directory, every line is one [CompletionEntity]. Writing appends
/// a line, reading folds the lines in order so the newest write for a habit
/// wins.
pub struct LogStorageImpl {
    record_dir: PathBuf,
}

impl LogStorageImpl {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    fn day_path(&self, day: NaiveDate) -> PathBuf {
        self.record_dir.join(date_to_log_name(day))
    }

    async fn read_day(path: &Path) -> Result<HashMap<HabitId, bool>, StorageError> {
        async fn extract(path: &Path) -> Result<HashMap<HabitId, bool>, std::io::Error> {
            debug!("Extracting {path:?}");
            let file = File::open(path).await?;
            file.lock_shared()?;
            let buffer = BufReader::new(file);
            let mut lines = buffer.lines();
            let mut entries = HashMap::new();
            while let Ok(Some(v)) = lines.next_line().await {
                match serde_json::from_str::<CompletionEntity>(&v) {
                    Ok(v) => {
                        entries.insert(v.habit_id, v.value);
                    }
                    Err(e) => {
                        // ignore illegal values. Might happen after shutdowns
                        warn!(
                            "During parsing in path {:?} found illegal json string {}:  {e}",
                            path, &v
                        )
                    }
                }
            }

            lines.into_inner().into_inner().unlock_async().await?;

            Ok(entries)
        }

        match extract(path).await {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn append_entry(
        &self,
        day: NaiveDate,
        entity: CompletionEntity,
    ) -> Result<(), StorageError> {
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(self.day_path(day))
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::write_line(&mut file, entity).await;
        file.unlock_async().await?;
        result
    }

    async fn write_line(file: &mut File, entity: CompletionEntity) -> Result<(), StorageError> {
        let mut buffer = serde_json::to_vec(&entity)?;
        buffer.push(b'\n');

        file.write_all(&buffer).await?;
        file.flush().await?;
        // the caller must not observe success before the entry is on disk
        file.sync_all().await?;
        Ok(())
    }

    /// Days that have a record file, in date order. Anything else living in
    /// the directory is skipped with a warning.
    async fn recorded_days(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let mut read_dir = tokio::fs::read_dir(&self.record_dir).await?;
        let mut days = vec![];
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name();
            match parse_log_name(&name.to_string_lossy()) {
                Some(day) => days.push(day),
                None => warn!("Skipping unexpected file {name:?} in the records directory"),
            }
        }
        days.sort();
        Ok(days)
    }
}

impl LogStorage for LogStorageImpl {
    async fn upsert(
        &self,
        habit_id: HabitId,
        day: NaiveDate,
        value: bool,
    ) -> Result<(), StorageError> {
        self.append_entry(day, CompletionEntity { habit_id, value })
            .await
    }

    async fn entries_for_day(&self, day: NaiveDate) -> Result<HashMap<HabitId, bool>, StorageError> {
        Self::read_day(&self.day_path(day)).await
    }

    async fn all_entries(
        &self,
    ) -> Result<HashMap<(HabitId, NaiveDate), bool>, StorageError> {
        let days = self.recorded_days().await?;
        let mut entries = HashMap::new();
        let mut day_maps = std::pin::pin!(read_days(self, days));
        while let Some((day, data)) = day_maps.next().await {
            for (habit_id, value) in data? {
                entries.insert((habit_id, day), value);
            }
        }
        Ok(entries)
    }

    async fn count_completed_in_month(&self, month: YearMonth) -> Result<u64, StorageError> {
        let mut completed = 0u64;
        let mut day_maps = std::pin::pin!(read_days(self, month.days()));
        while let Some((_, data)) = day_maps.next().await {
            completed += data?.into_values().filter(|v| *v).count() as u64;
        }
        Ok(completed)
    }

    async fn sum_completed_by_day(
        &self,
        year: Year,
    ) -> Result<HashMap<NaiveDate, u32>, StorageError> {
        let mut sums = HashMap::new();
        let mut day_maps = std::pin::pin!(read_days(self, year.days()));
        while let Some((day, data)) = day_maps.next().await {
            let total = data?.into_values().filter(|v| *v).count() as u32;
            if total > 0 {
                sums.insert(day, total);
            }
        }
        Ok(sums)
    }
}

/// Reads many day files concurrently while keeping results in date order.
fn read_days<'a>(
    storage: &'a LogStorageImpl,
    days: impl IntoIterator<Item = NaiveDate> + 'a,
) -> impl Stream<Item = (NaiveDate, Result<HashMap<HabitId, bool>, StorageError>)> + 'a {
    stream::iter(days)
        .map(move |day| {
            let path = storage.day_path(day);
            async move { (day, LogStorageImpl::read_day(&path).await) }
        })
        .buffered(4)
}
