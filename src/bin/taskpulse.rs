//! Runs the task engine against chat lines read from stdin.
//!
//! Usage:
//!
//! ```text
//! taskpulse run --config taskpulse.toml
//! ```
//!
//! Each input line is `<sender>: <message>`, for example
//! `919876543210@c.us: /create Pay rent, @918888777666, 2024-07-20`.
//! Outbound messages are written to the log. The process reconciles
//! reminders from the store at start and stops on EOF or Ctrl-C.
//!
//! The `PostgreSQL` store is used when `database_url` is configured or
//! `TASKPULSE_DATABASE_URL` is set; the schema lives under `migrations/`.

use clap::{Parser, Subcommand};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::{Result, WrapErr};
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use taskpulse::{
    command::{ChatCommandService, CommandOutcome},
    config::TaskpulseConfig,
    reminder::ReminderScheduler,
    task::{
        adapters::{
            log::TracingNotifier,
            memory::InMemoryTaskRepository,
            postgres::PostgresTaskRepository,
        },
        ports::{ReminderScheduling, TaskRepository},
        services::{TaskLifecycleService, TaskNotifications},
    },
    telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(name = "taskpulse", version, about = "Chat task tracker with due-date reminders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process chat lines from stdin until EOF or Ctrl-C.
    Run {
        /// Path to the TOML configuration file.
        #[arg(long, default_value = "taskpulse.toml")]
        config: PathBuf,
        /// `PostgreSQL` URL; overrides `database_url` from the file.
        #[arg(long, env = "TASKPULSE_DATABASE_URL")]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            database_url,
        } => {
            let settings = TaskpulseConfig::load(&config)
                .wrap_err_with(|| format!("loading {}", config.display()))?
                .with_database_url(database_url);
            telemetry::init(&settings.logging.filter)?;
            run(settings).await
        }
    }
}

async fn run(settings: TaskpulseConfig) -> Result<()> {
    match settings.database_url.clone() {
        Some(url) => {
            let pool = tokio::task::spawn_blocking(move || {
                Pool::builder().build(ConnectionManager::<PgConnection>::new(url))
            })
            .await?
            .wrap_err("connecting to PostgreSQL")?;
            info!("using PostgreSQL task store");
            serve(Arc::new(PostgresTaskRepository::new(pool)), &settings).await
        }
        None => {
            warn!("no database configured, tasks live in memory only");
            serve(Arc::new(InMemoryTaskRepository::new()), &settings).await
        }
    }
}

async fn serve<R>(repository: Arc<R>, settings: &TaskpulseConfig) -> Result<()>
where
    R: TaskRepository + 'static,
{
    let zone = settings.display_zone()?;
    info!(
        zone = %settings.timezone.label,
        lead_time_minutes = settings.reminder.lead_time_minutes,
        "starting task engine"
    );
    let clock = Arc::new(DefaultClock);
    let notifications = TaskNotifications::new(Arc::new(TracingNotifier), zone);
    let scheduler = Arc::new(ReminderScheduler::new(
        Arc::clone(&repository),
        notifications.clone(),
        Arc::clone(&clock),
        settings.reminder_policy(),
    ));
    scheduler
        .reconcile_from_store()
        .await
        .wrap_err("reconciling reminders")?;

    let lifecycle = TaskLifecycleService::new(
        repository,
        Arc::clone(&scheduler),
        notifications,
        Arc::clone(&clock),
    );
    let commands = ChatCommandService::new(lifecycle, clock);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("reading stdin")? else {
                    info!("input closed");
                    break;
                };
                dispatch(&commands, &line).await;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.wrap_err("listening for Ctrl-C")?;
                info!("interrupted");
                break;
            }
        }
    }

    scheduler.shutdown();
    Ok(())
}

async fn dispatch<R, S>(
    commands: &ChatCommandService<R, S, TracingNotifier, DefaultClock>,
    line: &str,
) where
    R: TaskRepository,
    S: ReminderScheduling,
{
    let Some((sender, text)) = line.split_once(':') else {
        if !line.trim().is_empty() {
            warn!(line, "expected '<sender>: <message>'");
        }
        return;
    };
    let outcome = commands.handle(sender.trim(), text.trim()).await;
    if outcome != CommandOutcome::Ignored {
        debug!(sender = sender.trim(), ?outcome, "message handled");
    }
}
