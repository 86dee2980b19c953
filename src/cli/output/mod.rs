use std::collections::HashMap;

use ansi_term::Colour;
use chrono::NaiveDate;

use crate::tracker::{
    aggregate::{HeatmapDay, WeekGrid},
    entities::{Habit, HabitId},
};

/// Week columns in the year grid, enough to cover 365 days.
const HEATMAP_COLUMNS: usize = 53;

/// Colour for a heat level, same greens the classic contribution graphs use.
pub fn heat_colour(level: u8) -> Colour {
    match level {
        0 => Colour::RGB(235, 237, 240),
        1 => Colour::RGB(198, 228, 139),
        2 => Colour::RGB(123, 201, 111),
        _ => Colour::RGB(35, 154, 59),
    }
}

pub fn checklist_mark(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn grid_mark(done: bool) -> &'static str {
    if done {
        "x"
    } else {
        "·"
    }
}

/// Day column header for the week table. Dropping the year keeps the columns
/// narrow, the full anchor date is printed above the table anyway.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

pub fn print_checklist(day: NaiveDate, habits: &[Habit], checklist: &HashMap<HabitId, bool>) {
    println!("{day}");
    for habit in habits {
        let done = checklist.get(&habit.id).copied().unwrap_or(false);
        println!("{} {}\t{}", checklist_mark(done), habit.id, habit.name);
    }
}

pub fn print_week(habits: &[Habit], week: &WeekGrid) {
    let header = week
        .dates
        .iter()
        .map(|date| short_date(*date))
        .collect::<Vec<_>>()
        .join("\t");
    println!("Habit\t{header}");

    for habit in habits {
        let cells = week
            .dates
            .iter()
            .map(|date| grid_mark(week.grid.get(&(habit.id, *date)).copied().unwrap_or(false)))
            .collect::<Vec<_>>()
            .join("\t");
        println!("{}\t{cells}", habit.name);
    }
}

/// Prints the year as 7 rows of week columns, one coloured cell per day.
pub fn print_heatmap(days: &[HeatmapDay]) {
    for row in 0..7 {
        let mut line = String::new();
        for column in 0..HEATMAP_COLUMNS {
            let Some(day) = days.get(column * 7 + row) else {
                break;
            };
            line.push_str(&heat_colour(day.level).paint("■ ").to_string());
        }
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{checklist_mark, grid_mark, heat_colour, short_date};

    #[test]
    fn test_marks() {
        assert_eq!(checklist_mark(true), "[x]");
        assert_eq!(checklist_mark(false), "[ ]");
        assert_eq!(grid_mark(true), "x");
        assert_eq!(grid_mark(false), "·");
    }

    #[test]
    fn test_short_date_drops_the_year() {
        assert_eq!(
            short_date(NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()),
            "02-27"
        );
    }

    #[test]
    fn test_levels_above_three_share_the_darkest_colour() {
        assert_eq!(heat_colour(3), heat_colour(200));
        assert_ne!(heat_colour(0), heat_colour(1));
    }
}
