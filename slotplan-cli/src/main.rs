use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use slotplan_core::{
    expand_series, outstanding_tasks, pending_exports, BlockKey, ExportRequest, ExportedBlock,
    Priority, RecurrenceRule, ScheduleResult, Scheduler, SeriesSpec, Task,
};
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

mod auth;
mod calendar;
mod config;
#[cfg(feature = "gcal")]
mod google_calendar;
mod inputs;
mod llm;
mod logging;
mod render;
mod state;

use calendar::{events_to_ics, CalendarEvent};
use config::Config;
use llm::ChatTurn;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SLOTPLAN_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "slotplan", version = VERSION, about = "Greedy multi-day task planner")]
struct Cli {
    /// -v for debug logs, -vv for trace (RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct PlanInputs {
    /// Task list as JSON (default: ~/.slotplan/tasks.json)
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Manual occupied slots as CSV (date,start,end,category,title)
    #[arg(long)]
    slots: Option<PathBuf>,

    /// Calendar events as JSON (default: ~/.slotplan/events.json if present)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Reference date, YYYY-MM-DD (default: local today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Days past today to consider (default: [planner] horizon_days)
    #[arg(long)]
    horizon: Option<u32>,

    /// Do not treat previously exported blocks as occupied
    #[arg(long)]
    no_ledger: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.slotplan/config.toml
    Init,

    /// Build the schedule and print the agenda
    Plan {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Also print the decision trace
        #[arg(long)]
        trace: bool,

        /// Write every scheduled block to an ICS file
        #[arg(long)]
        ics: Option<PathBuf>,
    },

    /// Turn free text into tasks with the configured LLM
    Extract {
        /// Text to analyse (read from stdin when omitted)
        #[arg(long)]
        text: Option<String>,

        /// Task file to append to (default: ~/.slotplan/tasks.json)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Add one task per occurrence of a recurring activity
    Recur {
        #[arg(long)]
        title: String,

        /// Hours per occurrence
        #[arg(long)]
        hours: f64,

        /// daily or weekly
        #[arg(long, default_value = "weekly", value_parser = parse_rule)]
        every: RecurrenceRule,

        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        until: NaiveDate,

        /// Pin every occurrence at this time, HH:MM
        #[arg(long)]
        at: Option<NaiveTime>,

        #[arg(long, default_value = "normal")]
        priority: Priority,

        #[arg(long, default_value = "")]
        notes: String,

        /// Task file to append to (default: ~/.slotplan/tasks.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export blocks not exported yet, as ICS or straight to a calendar
    Export {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Pipe the ICS into `gcalcli import`
        #[arg(long)]
        gcalcli: bool,

        /// Calendar name for gcalcli
        #[arg(long = "calendar")]
        calendar_name: Option<String>,

        /// Insert through the Google Calendar API (requires the gcal feature)
        #[arg(long)]
        gcal: bool,

        /// Write ICS here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Do not record the blocks in the export ledger
        #[arg(long)]
        dry_run: bool,
    },

    /// Ask the LLM for advice on the generated plan
    Advise {
        #[command(flatten)]
        inputs: PlanInputs,
    },

    /// Manage the LLM API key
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Google Calendar integration
    #[cfg(feature = "gcal")]
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an API key in ~/.slotplan/auth.json
    SetKey,
}

#[cfg(feature = "gcal")]
#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// Run the OAuth flow and cache tokens
    Connect,

    /// Fetch upcoming events into the cache read by `plan`
    Pull {
        #[arg(long, default_value_t = 30)]
        days: u64,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_rule(s: &str) -> Result<RecurrenceRule, String> {
    match s.trim().to_lowercase().as_str() {
        "daily" | "day" => Ok(RecurrenceRule::Daily),
        "weekly" | "week" => Ok(RecurrenceRule::Weekly),
        other => Err(format!("unknown recurrence '{other}' (expected daily or weekly)")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Plan {
            inputs,
            json,
            trace,
            ics,
        } => {
            let cfg = config::load_config()?;
            let (_, result) = build_schedule(&inputs, &cfg)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::render_agenda(&result));
                if trace {
                    print!("{}", render::render_trace(&result));
                }
            }

            if let Some(path) = ics {
                let events: Vec<CalendarEvent> = pending_exports(&result, &HashSet::new())
                    .iter()
                    .map(CalendarEvent::from)
                    .collect();
                let ics = events_to_ics(&events, reference_date(inputs.today));
                std::fs::write(&path, ics).with_context(|| format!("write {}", path.display()))?;
                eprintln!("Wrote {} events to {}", events.len(), path.display());
            }
        }

        Command::Extract { text, out, today } => {
            let cfg = config::load_config()?;
            let today = reference_date(today);
            let text = match text {
                Some(t) => t,
                None => {
                    let mut s = String::new();
                    std::io::stdin()
                        .read_to_string(&mut s)
                        .context("reading text from stdin")?;
                    s
                }
            };
            if text.trim().is_empty() {
                bail!("nothing to extract (pass --text or pipe text on stdin)");
            }

            let turns = [
                ChatTurn::system(slotplan_ingest::extraction_prompt(today)),
                ChatTurn::user(text),
            ];
            let content = llm::chat_complete(&cfg.llm, &turns, cfg.llm.temperature)?;
            let extraction = slotplan_ingest::parse_extraction(&content, today)
                .context("decoding extraction response")?;

            for t in &extraction.tasks {
                println!(
                    "+ {} ({:.1}h, {}, due {})",
                    t.title,
                    t.duration_hours,
                    t.priority,
                    t.deadline.format("%d/%m/%Y")
                );
            }
            if !extraction.planning_suggestions.is_empty() {
                println!("\n{}", extraction.planning_suggestions);
            }

            let path = output_path(out)?;
            let added = extraction.tasks.len();
            let total = inputs::append_tasks(&path, extraction.tasks)?;
            println!("\nAdded {added} tasks to {} ({total} total)", path.display());
        }

        Command::Recur {
            title,
            hours,
            every,
            from,
            until,
            at,
            priority,
            notes,
            out,
        } => {
            let spec = SeriesSpec {
                title,
                duration_hours: hours,
                priority,
                rule: every,
                from,
                until,
                at,
                notes,
            };
            let tasks = expand_series(&spec).context("invalid series")?;
            let path = output_path(out)?;
            let added = tasks.len();
            let total = inputs::append_tasks(&path, tasks)?;
            println!(
                "Added {added} occurrences of '{}' to {} ({total} total)",
                spec.title,
                path.display()
            );
        }

        Command::Export {
            inputs,
            gcalcli,
            calendar_name,
            gcal,
            out,
            dry_run,
        } => {
            let cfg = config::load_config()?;
            let ledger_path = state::ledger_path()?;
            let mut ledger = state::read_ledger(&ledger_path)?;
            let (_, result) = build_schedule(&inputs, &cfg)?;

            let pending = pending_exports(&result, &state::ledger_keys(&ledger));
            if pending.is_empty() {
                eprintln!("Nothing new to export.");
                return Ok(());
            }
            let events: Vec<CalendarEvent> = pending.iter().map(CalendarEvent::from).collect();

            if gcal {
                push_gcal(&cfg, &events).await?;
            } else {
                let ics = events_to_ics(&events, reference_date(inputs.today));
                if gcalcli {
                    calendar::push_ics_via_gcalcli(&ics, calendar_name.as_deref())?;
                } else if let Some(path) = &out {
                    std::fs::write(path, &ics).with_context(|| format!("write {}", path.display()))?;
                } else {
                    print!("{ics}");
                }
            }

            if dry_run {
                eprintln!("{} blocks exported (not recorded)", pending.len());
            } else {
                ledger.extend(pending.iter().map(|req| req.to_exported(task_title(req, &result))));
                state::write_ledger(&ledger_path, &ledger)?;
                info!(count = pending.len(), "export ledger updated");
                eprintln!(
                    "{} blocks exported and recorded in {}",
                    pending.len(),
                    ledger_path.display()
                );
            }
        }

        Command::Advise { inputs } => {
            let cfg = config::load_config()?;
            let (tasks, result) = build_schedule(&inputs, &cfg)?;
            if tasks.is_empty() {
                bail!("no tasks to advise on");
            }
            let prompt = slotplan_ingest::advice_prompt(
                &render::summarize_tasks(&tasks),
                &render::summarize_schedule(&result),
            );
            let advice = llm::chat_complete(&cfg.llm, &[ChatTurn::user(prompt)], 0.7)?;
            println!("{advice}");
        }

        Command::Auth { command } => match command {
            AuthCommand::SetKey => auth::set_key()?,
        },

        #[cfg(feature = "gcal")]
        Command::Calendar { command } => match command {
            CalendarCommand::Connect => {
                google_calendar::connect_interactive().await?;
            }
            CalendarCommand::Pull { days, out } => {
                let cfg = config::load_config()?;
                let tz = google_calendar::parse_timezone(&cfg.calendar.timezone)?;
                let events = google_calendar::pull_events(
                    &cfg.calendar.calendar_ids,
                    tz,
                    Local::now().date_naive(),
                    days,
                )
                .await?;
                let path = match out {
                    Some(p) => p,
                    None => state::events_cache_path()?,
                };
                let json = serde_json::json!({ "items": events });
                std::fs::write(&path, serde_json::to_string_pretty(&json)?)
                    .with_context(|| format!("write {}", path.display()))?;
                println!("Pulled {} events into {}", events.len(), path.display());
            }
        },
    }

    Ok(())
}

fn reference_date(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn output_path(out: Option<PathBuf>) -> Result<PathBuf> {
    match out {
        Some(p) => Ok(p),
        None => state::tasks_path(),
    }
}

/// Load every input, inject the export ledger and run the planner.
fn build_schedule(args: &PlanInputs, cfg: &Config) -> Result<(Vec<Task>, ScheduleResult)> {
    let tasks_path = match &args.tasks {
        Some(p) => p.clone(),
        None => state::tasks_path()?,
    };
    let tasks = inputs::read_tasks(&tasks_path)?;

    let events = match &args.events {
        Some(p) => Some(p.clone()),
        None => {
            let cache = state::events_cache_path()?;
            cache.exists().then_some(cache)
        }
    };
    let ledger: Vec<ExportedBlock> = if args.no_ledger {
        Vec::new()
    } else {
        state::read_ledger(&state::ledger_path()?)?
    };

    let occupied = inputs::load_occupied(args.slots.as_deref(), events.as_deref(), &ledger)?;
    // exported hours already sit in `occupied` as Exported slots
    let outstanding = outstanding_tasks(&tasks, &ledger);

    let scheduler = Scheduler::new(outstanding, occupied, cfg.constraints)
        .with_context(|| format!("invalid planning input in {}", tasks_path.display()))?
        .today(reference_date(args.today))
        .horizon_days(args.horizon.unwrap_or(cfg.planner.horizon_days));

    Ok((tasks, scheduler.run()))
}

fn task_title<'a>(req: &'a ExportRequest, result: &'a ScheduleResult) -> &'a str {
    result
        .scheduled
        .iter()
        .find(|p| {
            p.outcome
                .blocks
                .iter()
                .any(|b| BlockKey::new(&p.task.id, b) == req.key)
        })
        .map(|p| p.task.title.as_str())
        .unwrap_or(req.title.as_str())
}

#[cfg(feature = "gcal")]
async fn push_gcal(cfg: &Config, events: &[CalendarEvent]) -> Result<()> {
    let tz = google_calendar::parse_timezone(&cfg.calendar.timezone)?;
    google_calendar::push_events(&cfg.calendar.target_calendar, tz, events).await
}

#[cfg(not(feature = "gcal"))]
async fn push_gcal(_cfg: &Config, _events: &[CalendarEvent]) -> Result<()> {
    bail!("this build has no Google Calendar support; rebuild with --features gcal or use --gcalcli")
}
