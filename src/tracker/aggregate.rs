//! Derivations over the log store and the registry. Everything in here is a
//! pure function of its inputs, the only state is whatever the storage holds
//! at the moment of the call, so every view is safe to recompute.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::utils::time::{Year, YearMonth};

use super::{
    entities::HabitId,
    error::TrackerError,
    log_storage::LogStorage,
    registry::HabitRegistry,
};

/// Length of the rolling week view.
pub const WEEK_DAYS: usize = 7;

/// The year view always shows this many days from Jan 1. A leap year loses
/// its last day on screen.
pub const HEATMAP_DAYS: usize = 365;

/// Nominal days per month used for the monthly capacity, applied to every
/// month regardless of its real length.
pub const NOMINAL_MONTH_DAYS: u64 = 30;

/// Seven consecutive days starting at the anchor. Months and years roll over
/// through regular date arithmetic, there are no special cases.
pub fn week_window(anchor: NaiveDate) -> [NaiveDate; WEEK_DAYS] {
    std::array::from_fn(|i| anchor + Duration::days(i as i64))
}

/// Completion flag per registered habit for one day. A habit without an
/// entry reads as not done, same as an explicit false.
pub async fn daily_checklist(
    registry: impl HabitRegistry,
    storage: impl LogStorage,
    day: NaiveDate,
) -> Result<HashMap<HabitId, bool>, TrackerError> {
    let habits = registry.list().await?;
    let entries = storage.entries_for_day(day).await?;

    Ok(habits
        .into_iter()
        .map(|habit| {
            let done = entries.get(&habit.id).copied().unwrap_or(false);
            (habit.id, done)
        })
        .collect())
}

/// The week view. Every registered habit crossed with the 7 day window, with
/// the false defaults already filled in.
#[derive(Debug)]
pub struct WeekGrid {
    pub dates: [NaiveDate; WEEK_DAYS],
    pub grid: HashMap<(HabitId, NaiveDate), bool>,
}

pub async fn week_grid(
    registry: impl HabitRegistry,
    storage: impl LogStorage,
    anchor: NaiveDate,
) -> Result<WeekGrid, TrackerError> {
    let habits = registry.list().await?;
    let entries = storage.all_entries().await?;

    let dates = week_window(anchor);
    let mut grid = HashMap::with_capacity(habits.len() * WEEK_DAYS);
    for habit in &habits {
        for date in dates {
            let done = entries.get(&(habit.id, date)).copied().unwrap_or(false);
            grid.insert((habit.id, date), done);
        }
    }

    Ok(WeekGrid { dates, grid })
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MonthStat {
    pub completed: u64,
    pub capacity: u64,
}

/// Completions within the month against the nominal capacity of
/// `habit count * 30`.
pub async fn month_stat(
    registry: impl HabitRegistry,
    storage: impl LogStorage,
    month: YearMonth,
) -> Result<MonthStat, TrackerError> {
    let habits = registry.list().await?;
    let completed = storage.count_completed_in_month(month).await?;

    Ok(MonthStat {
        completed,
        capacity: habits.len() as u64 * NOMINAL_MONTH_DAYS,
    })
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub level: u8,
}

/// Buckets a day's total completions into the four heat levels. The
/// thresholds are fixed: 0, 1, 2 and everything from 3 up.
pub fn heat_level(count: u32) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

/// 365 heat levels starting Jan 1 of the year. The sum behind each level
/// covers every habit id ever logged that day, registered or not.
pub async fn year_heatmap(
    storage: impl LogStorage,
    year: Year,
) -> Result<Vec<HeatmapDay>, TrackerError> {
    let sums = storage.sum_completed_by_day(year).await?;

    let start = year.first_day();
    Ok((0..HEATMAP_DAYS)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            let count = sums.get(&date).copied().unwrap_or(0);
            HeatmapDay {
                date,
                level: heat_level(count),
            }
        })
        .collect())
}
