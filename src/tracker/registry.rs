use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::warn;

use super::{
    entities::Habit,
    error::{StorageError, TrackerError},
};

/// Interface for the ordered list of habits. There is no rename or delete,
/// a habit exists from the moment it's added.
pub trait HabitRegistry {
    /// Registers a habit at the end of the list and hands back its record.
    /// Empty and whitespace only names are rejected before anything is
    /// written.
    fn add(&self, name: &str) -> impl Future<Output = Result<Habit, TrackerError>> + Send;

    /// Every habit in insertion order, ascending id, stable across calls.
    fn list(&self) -> impl Future<Output = Result<Vec<Habit>, StorageError>> + Send;
}

impl<T: Deref + Sync> HabitRegistry for T
where
    T::Target: HabitRegistry + Sync,
{
    fn add(&self, name: &str) -> impl Future<Output = Result<Habit, TrackerError>> + Send {
        self.deref().add(name)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Habit>, StorageError>> + Send {
        self.deref().list()
    }
}

/// The main realization of [HabitRegistry]. The whole list lives in a single
/// habits file with one json line per habit.
pub struct HabitRegistryImpl {
    habits_file: PathBuf,
}

impl HabitRegistryImpl {
    pub fn new(data_dir: &Path) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(data_dir)?;

        Ok(Self {
            habits_file: data_dir.join("habits"),
        })
    }

    /// Reads the list and gives the file handle back so the caller can keep
    /// holding its lock.
    async fn read_habits(file: File) -> Result<(File, Vec<Habit>), StorageError> {
        let buffer = BufReader::new(file);
        let mut lines = buffer.lines();
        let mut habits: Vec<Habit> = vec![];
        while let Ok(Some(v)) = lines.next_line().await {
            match serde_json::from_str::<Habit>(&v) {
                Ok(v) => habits.push(v),
                Err(e) => {
                    // ignore illegal values. Might happen after shutdowns
                    warn!("Found illegal json string {} in the habits file:  {e}", &v)
                }
            }
        }
        habits.sort_by_key(|habit| habit.id);
        Ok((lines.into_inner().into_inner(), habits))
    }
}

impl HabitRegistry for HabitRegistryImpl {
    async fn add(&self, name: &str) -> Result<Habit, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyHabitName);
        }

        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.habits_file)
            .await
            .map_err(StorageError::from)?;

        file.lock_exclusive().map_err(StorageError::from)?;

        let (mut file, habits) = Self::read_habits(file).await?;

        let next_id = habits.iter().map(|habit| habit.id).max().unwrap_or(0) + 1;
        let habit = Habit {
            id: next_id,
            name: name.into(),
        };

        let write = async {
            let mut buffer = serde_json::to_vec(&habit)?;
            buffer.push(b'\n');

            file.seek(std::io::SeekFrom::End(0)).await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            // an add must be on disk before its habit is handed out
            file.sync_all().await?;
            Ok::<_, StorageError>(())
        }
        .await;

        file.unlock_async().await.map_err(StorageError::from)?;
        write?;

        Ok(habit)
    }

    async fn list(&self) -> Result<Vec<Habit>, StorageError> {
        let file = match File::open(&self.habits_file).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        let (file, habits) = Self::read_habits(file).await?;
        file.unlock_async().await?;

        Ok(habits)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::tracker::{
        error::TrackerError,
        registry::{HabitRegistry, HabitRegistryImpl},
    };

    #[tokio::test]
    async fn test_ids_grow_with_insertion_order() -> Result<()> {
        let dir = tempdir()?;
        let registry = HabitRegistryImpl::new(dir.path())?;

        let read = registry.add("Read").await?;
        let run = registry.add("Run").await?;
        let sleep = registry.add("Sleep early").await?;

        assert_eq!(read.id, 1);
        assert_eq!(run.id, 2);
        assert_eq!(sleep.id, 3);

        let habits = registry.list().await?;
        assert_eq!(habits, vec![read, run, sleep]);
        Ok(())
    }

    #[tokio::test]
    async fn test_ids_continue_after_reopen() -> Result<()> {
        let dir = tempdir()?;

        {
            let registry = HabitRegistryImpl::new(dir.path())?;
            registry.add("Read").await?;
            registry.add("Run").await?;
        }

        let registry = HabitRegistryImpl::new(dir.path())?;
        let stretch = registry.add("Stretch").await?;
        assert_eq!(stretch.id, 3);
        assert_eq!(registry.list().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_names_are_trimmed_and_blank_names_rejected() -> Result<()> {
        let dir = tempdir()?;
        let registry = HabitRegistryImpl::new(dir.path())?;

        assert!(matches!(
            registry.add("").await,
            Err(TrackerError::EmptyHabitName)
        ));
        assert!(matches!(
            registry.add("   \t").await,
            Err(TrackerError::EmptyHabitName)
        ));
        // nothing was written for the rejected names
        assert!(registry.list().await?.is_empty());

        let habit = registry.add("  Read  ").await?;
        assert_eq!(&*habit.name, "Read");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_registry_lists_nothing() -> Result<()> {
        let dir = tempdir()?;
        let registry = HabitRegistryImpl::new(dir.path())?;

        assert!(registry.list().await?.is_empty());
        Ok(())
    }
}
