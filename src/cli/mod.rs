pub mod output;
pub mod views;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use views::{DoneCommand, MonthCommand, TodayCommand, WeekCommand, YearCommand};

use crate::{
    tracker::HabitTracker,
    utils::{dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Habitgrid", version, long_about = None)]
#[command(about = "Personal daily habit tracker", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_DATA_HOME or $HOME/.local/share"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Register a new habit")]
    Add {
        #[arg(help = "Name of the habit")]
        name: String,
    },
    #[command(about = "Mark a habit as done or not done for a day")]
    Done {
        #[command(flatten)]
        command: DoneCommand,
    },
    #[command(about = "Show the checklist for a day")]
    Today {
        #[command(flatten)]
        command: TodayCommand,
    },
    #[command(about = "Show a 7 day grid starting at a day")]
    Week {
        #[command(flatten)]
        command: WeekCommand,
    },
    #[command(about = "Show completions for a month against its nominal capacity")]
    Month {
        #[command(flatten)]
        command: MonthCommand,
    },
    #[command(about = "Draw the yearly heatmap")]
    Year {
        #[command(flatten)]
        command: YearCommand,
    },
    #[command(about = "List registered habits")]
    Habits,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    let data_dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    enable_logging(&data_dir, logging_level, args.log)?;

    let tracker = HabitTracker::open(&data_dir)?;

    match args.commands {
        Commands::Add { name } => views::add_habit(&tracker, &name).await,
        Commands::Done { command } => views::mark_done(&tracker, command).await,
        Commands::Today { command } => views::show_today(&tracker, command).await,
        Commands::Week { command } => views::show_week(&tracker, command).await,
        Commands::Month { command } => views::show_month(&tracker, command).await,
        Commands::Year { command } => views::show_year(&tracker, command).await,
        Commands::Habits => views::show_habits(&tracker).await,
    }
}
