//! Simple to use cli for tracking daily habits. Habits are registered once,
//! checked off per day, and read back as a daily checklist, a rolling 7 day
//! grid, a monthly completion count and a yearly heatmap.
//!

pub mod cli;
pub mod tracker;
pub mod utils;
