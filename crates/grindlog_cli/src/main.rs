//! `grindlog` command-line entry point.
//!
//! # Responsibility
//! - Wire the SQLite repositories, system clock and core services together.
//! - Parse dates and ids at the boundary; core APIs only see typed values.

mod output;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use grindlog_core::clock::local_naive_to_ms;
use grindlog_core::db::open_db;
use grindlog_core::{
    default_log_level, init_logging, recent_window, Clock, CompletionSeriesAggregator,
    Difficulty, HistoryReconstructor, Item, ItemService, ItemStatus, ProgressAggregator,
    RepoError, SqliteItemRepository, SqliteProgressRepository, SqliteTopicRepository,
    SystemClock, TopicService, DEFAULT_RECENT_DAYS,
};
use log::info;
use output::Output;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "grindlog: practice progress tracker", long_about = None)]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "GRINDLOG_DB", default_value = "grindlog.sqlite3", global = true)]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "GRINDLOG_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error). Defaults by build mode.
    #[arg(long, env = "GRINDLOG_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Emit JSON instead of human-readable lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage topics.
    #[command(subcommand)]
    Topic(TopicCommand),
    /// Manage practice items.
    #[command(subcommand)]
    Item(ItemCommand),
    /// Show the stored aggregate (created on first use).
    Stats,
    /// Rescan all items and persist the aggregate and today's snapshot.
    Recompute,
    /// Show today's snapshot, computing it if none exists yet.
    Today,
    /// Daily snapshot history over a date range.
    History(RangeArgs),
    /// Items completed per day over a date range.
    Completions(RangeArgs),
    /// Most recently completed items.
    RecentCompleted {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Items with reminders.
    Reminders {
        /// Only reminders still in the future.
        #[arg(long)]
        upcoming: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TopicCommand {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    /// Rename a topic or change its description.
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
    },
    Notes {
        id: Uuid,
        /// New notes; omit to clear.
        notes: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    Add {
        #[arg(long)]
        topic: Uuid,
        #[arg(long)]
        number: i64,
        #[arg(long)]
        title: String,
        #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
        difficulty: DifficultyArg,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        important: bool,
        /// Local reminder time (YYYY-MM-DDTHH:MM).
        #[arg(long, value_parser = parse_reminder)]
        reminder: Option<NaiveDateTime>,
    },
    /// Change editable fields of an existing item.
    Update {
        id: Uuid,
        #[arg(long)]
        topic: Option<Uuid>,
        #[arg(long)]
        number: Option<i64>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,
        #[arg(long, conflicts_with = "clear_link")]
        link: Option<String>,
        #[arg(long)]
        clear_link: bool,
        /// Local reminder time (YYYY-MM-DDTHH:MM).
        #[arg(long, value_parser = parse_reminder, conflicts_with = "clear_reminder")]
        reminder: Option<NaiveDateTime>,
        #[arg(long)]
        clear_reminder: bool,
    },
    List {
        #[arg(long)]
        topic: Option<Uuid>,
    },
    Status {
        id: Uuid,
        #[arg(value_enum)]
        status: StatusArg,
    },
    Important {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// First date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date, requires = "end")]
    start: Option<NaiveDate>,
    /// Last date, inclusive (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date, requires = "start")]
    end: Option<NaiveDate>,
    /// Window ending today, used when no explicit range is given.
    #[arg(long, default_value_t = DEFAULT_RECENT_DAYS, conflicts_with_all = ["start", "end"])]
    days: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatusArg {
    Todo,
    InProgress,
    Done,
}

impl From<StatusArg> for ItemStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Todo => ItemStatus::Todo,
            StatusArg::InProgress => ItemStatus::InProgress,
            StatusArg::Done => ItemStatus::Done,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

fn parse_reminder(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .map_err(|err| format!("expected YYYY-MM-DDTHH:MM, got `{value}`: {err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        if let Err(err) = init_logging(level, log_dir) {
            bail!("failed to initialize logging: {err}");
        }
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let out = Output::new(cli.json);

    let aggregator = ProgressAggregator::new(
        SqliteItemRepository::new(&conn),
        SqliteProgressRepository::new(&conn),
        SystemClock,
    );

    info!("event=cli_command module=cli status=start command={:?}", cli.command);

    match cli.command {
        Commands::Topic(command) => {
            let topics = TopicService::new(SqliteTopicRepository::new(&conn), aggregator);
            run_topic(&topics, command, &out)?;
        }
        Commands::Item(command) => run_item(&ItemService::new(aggregator), command, &out)?,
        Commands::Stats => out.aggregate(&aggregator.get_current()?)?,
        Commands::Recompute => out.aggregate(&aggregator.recompute()?)?,
        Commands::Today => {
            let snapshot = HistoryReconstructor::new(aggregator).get_today()?;
            out.snapshots(&[snapshot])?;
        }
        Commands::History(range) => {
            let history = HistoryReconstructor::new(aggregator);
            let series = match (range.start, range.end) {
                (Some(start), Some(end)) => history.get_range(start, end)?,
                _ => history.get_recent(range.days)?,
            };
            out.snapshots(&series)?;
        }
        Commands::Completions(range) => {
            let (start, end) = match (range.start, range.end) {
                (Some(start), Some(end)) => (start, end),
                _ => days_window(range.days)?,
            };
            let series = CompletionSeriesAggregator::new(SqliteItemRepository::new(&conn))
                .get_daily_completions(start, end)?;
            out.completions(&series)?;
        }
        Commands::RecentCompleted { limit } => {
            out.items(&ItemService::new(aggregator).recent_completed(limit)?)?;
        }
        Commands::Reminders { upcoming } => {
            let items = ItemService::new(aggregator);
            let reminders = if upcoming {
                items.upcoming_reminders()?
            } else {
                items.reminders()?
            };
            out.items(&reminders)?;
        }
    }

    Ok(())
}

type SqliteTopics<'c> = TopicService<
    SqliteTopicRepository<'c>,
    SqliteItemRepository<'c>,
    SqliteProgressRepository<'c>,
    SystemClock,
>;

type SqliteItems<'c> =
    ItemService<SqliteItemRepository<'c>, SqliteProgressRepository<'c>, SystemClock>;

fn run_topic(topics: &SqliteTopics<'_>, command: TopicCommand, out: &Output) -> Result<()> {
    match command {
        TopicCommand::Add { name, description } => {
            let topic = topics.create_topic(name, description)?;
            out.message(&format!("created topic {}", topic.id))
        }
        TopicCommand::List => out.topics(&topics.list_topic_summaries()?),
        TopicCommand::Update {
            id,
            name,
            description,
            clear_description,
        } => {
            let mut topic = topics.get_topic(id)?.ok_or(RepoError::TopicNotFound(id))?;
            if let Some(name) = name {
                topic.name = name;
            }
            if description.is_some() || clear_description {
                topic.description = description;
            }
            let updated = topics.update_topic(&topic)?;
            out.message(&format!("updated topic {}", updated.id))
        }
        TopicCommand::Notes { id, notes } => {
            topics.update_notes(id, notes.as_deref())?;
            out.message(&format!("updated notes for topic {id}"))
        }
        TopicCommand::Delete { id } => {
            topics.delete_topic(id)?;
            out.message(&format!("deleted topic {id}"))
        }
    }
}

fn run_item(items: &SqliteItems<'_>, command: ItemCommand, out: &Output) -> Result<()> {
    match command {
        ItemCommand::Add {
            topic,
            number,
            title,
            difficulty,
            link,
            important,
            reminder,
        } => {
            let mut item = Item::new(topic, number, title, difficulty.into());
            item.link = link;
            item.is_important = important;
            item.reminder_at = reminder.map(local_naive_to_ms);
            let created = items.create_item(item)?;
            out.message(&format!("created item {}", created.id))
        }
        ItemCommand::Update {
            id,
            topic,
            number,
            title,
            difficulty,
            link,
            clear_link,
            reminder,
            clear_reminder,
        } => {
            let mut item = items.get_item(id)?.ok_or(RepoError::ItemNotFound(id))?;
            if let Some(topic_id) = topic {
                item.topic_id = topic_id;
            }
            if let Some(number) = number {
                item.external_number = number;
            }
            if let Some(title) = title {
                item.title = title;
            }
            if let Some(difficulty) = difficulty {
                item.difficulty = difficulty.into();
            }
            if link.is_some() || clear_link {
                item.link = link;
            }
            if reminder.is_some() || clear_reminder {
                item.reminder_at = reminder.map(local_naive_to_ms);
            }
            let updated = items.update_item(&item)?;
            out.items(&[updated])
        }
        ItemCommand::List { topic } => {
            let listed = match topic {
                Some(topic_id) => items.list_by_topic(topic_id)?,
                None => items.list_items()?,
            };
            out.items(&listed)
        }
        ItemCommand::Status { id, status } => {
            let updated = items.set_status(id, status.into())?;
            out.items(&[updated])
        }
        ItemCommand::Important { id } => {
            let updated = items.toggle_important(id)?;
            out.items(&[updated])
        }
        ItemCommand::Delete { id } => {
            items.delete_item(id)?;
            out.message(&format!("deleted item {id}"))
        }
    }
}

fn days_window(days: u32) -> Result<(NaiveDate, NaiveDate)> {
    match recent_window(SystemClock.today(), days)? {
        Some(window) => Ok(window),
        None => bail!("--days must be at least 1"),
    }
}
