use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::warn;

use crate::{
    tracker::{
        entities::{Habit, HabitId},
        log_storage::LogStorageImpl,
        registry::HabitRegistryImpl,
        HabitTracker,
    },
    utils::{
        percentage::ratio_percentage,
        time::{parse_day, Year, YearMonth},
    },
};

use super::{output, Args};

/// The tracker as the cli opens it, file backed with the system clock.
pub type FileTracker = HabitTracker<LogStorageImpl, HabitRegistryImpl>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct DoneCommand {
    #[arg(help = "Id of the habit, see `habitgrid habits`")]
    habit: HabitId,
    #[arg(
        help = "Day to mark. Examples are \"2025-03-15\", \"yesterday\", \"15/03/2025\". Defaults to today"
    )]
    day: Option<String>,
    #[arg(long, help = "Mark the habit as not done instead")]
    undo: bool,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Debug, Parser)]
pub struct TodayCommand {
    #[arg(long, help = "Day to show instead of today")]
    day: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Debug, Parser)]
pub struct WeekCommand {
    #[arg(
        long = "start",
        short,
        help = "First day of the 7 day window. Defaults to today"
    )]
    start_day: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Debug, Parser)]
pub struct MonthCommand {
    #[arg(help = "Month to summarize as YYYY-MM. Defaults to the current month")]
    month: Option<YearMonth>,
}

#[derive(Debug, Parser)]
pub struct YearCommand {
    #[arg(help = "Year to draw as YYYY. Defaults to the current year")]
    year: Option<Year>,
}

pub async fn add_habit(tracker: &FileTracker, name: &str) -> Result<()> {
    let habit = tracker.add_habit(name).await?;
    println!("Added habit {} with id {}", habit.name, habit.id);
    Ok(())
}

pub async fn mark_done(
    tracker: &FileTracker,
    DoneCommand {
        habit,
        day,
        undo,
        date_style,
    }: DoneCommand,
) -> Result<()> {
    let day = parse_day_arg(day, date_style, tracker.now())?;

    let habits = tracker.habits().await?;
    if !habits.iter().any(|v| v.id == habit) {
        warn!("No habit with id {habit} is registered, recording the mark anyway");
    }

    tracker.set_completed(habit, day, !undo).await?;

    println!(
        "{day}\t{}\t{}",
        if undo { "not done" } else { "done" },
        habit_name(&habits, habit)
    );
    Ok(())
}

pub async fn show_today(
    tracker: &FileTracker,
    TodayCommand { day, date_style }: TodayCommand,
) -> Result<()> {
    let day = parse_day_arg(day, date_style, tracker.now())?;

    let habits = tracker.habits().await?;
    let checklist = tracker.checklist(day).await?;
    output::print_checklist(day, &habits, &checklist);
    Ok(())
}

pub async fn show_week(
    tracker: &FileTracker,
    WeekCommand {
        start_day,
        date_style,
    }: WeekCommand,
) -> Result<()> {
    let anchor = parse_day_arg(start_day, date_style, tracker.now())?;

    let habits = tracker.habits().await?;
    let week = tracker.week(anchor).await?;
    output::print_week(&habits, &week);
    Ok(())
}

pub async fn show_month(
    tracker: &FileTracker,
    MonthCommand { month }: MonthCommand,
) -> Result<()> {
    let month = month.unwrap_or_else(|| YearMonth::from_date(tracker.today()));

    let stat = tracker.month_stat(month).await?;
    println!(
        "{month}\tcompleted {} / {}\t{}%",
        stat.completed,
        stat.capacity,
        *ratio_percentage(stat.completed, stat.capacity) as i32
    );
    Ok(())
}

pub async fn show_year(tracker: &FileTracker, YearCommand { year }: YearCommand) -> Result<()> {
    let year = year.unwrap_or_else(|| Year::from_date(tracker.today()));

    let heatmap = tracker.year_heatmap(year).await?;
    println!("{year}");
    output::print_heatmap(&heatmap);
    Ok(())
}

pub async fn show_habits(tracker: &FileTracker) -> Result<()> {
    for habit in tracker.habits().await? {
        println!("{}\t{}", habit.id, habit.name);
    }
    Ok(())
}

fn habit_name(habits: &[Habit], id: HabitId) -> String {
    habits
        .iter()
        .find(|v| v.id == id)
        .map(|v| v.name.to_string())
        .unwrap_or_else(|| format!("habit {id}"))
}

/// Days are taken as ISO dates first, anything else goes through
/// chrono-english so "yesterday" works too. A missing day means today.
fn parse_day_arg(
    value: Option<String>,
    style: DateStyle,
    now: DateTime<Local>,
) -> Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(now.date_naive());
    };

    if let Ok(day) = parse_day(&value) {
        return Ok(day);
    }

    match parse_date_string(&value, now, style.into()) {
        Ok(v) => Ok(v.with_timezone(&Local).date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate day {value:?} {e}"),
            )
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone};

    use super::{parse_day_arg, DateStyle};

    fn test_now() -> chrono::DateTime<Local> {
        let date = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        Local
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .unwrap()
    }

    #[test]
    fn test_missing_day_means_today() -> Result<()> {
        let day = parse_day_arg(None, DateStyle::Uk, test_now())?;
        assert_eq!(day, test_now().date_naive());
        Ok(())
    }

    #[test]
    fn test_iso_days_bypass_the_dialect() -> Result<()> {
        let day = parse_day_arg(Some("2024-03-01".into()), DateStyle::Us, test_now())?;
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        Ok(())
    }

    #[test]
    fn test_english_phrases_are_relative_to_now() -> Result<()> {
        let day = parse_day_arg(Some("yesterday".into()), DateStyle::Uk, test_now())?;
        assert_eq!(day, test_now().date_naive() - Duration::days(1));
        Ok(())
    }

    #[test]
    fn test_garbage_days_are_rejected() {
        assert!(parse_day_arg(Some("not a day".into()), DateStyle::Uk, test_now()).is_err());
    }
}
