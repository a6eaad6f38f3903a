use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use roomcast::cli::{Cli, Command, JobArgs};
use roomcast::config::RoomcastConfig;
use roomcast::driver::{PendingNotification, RetryDriver};
use roomcast::notify::{DeliveryController, MessageComposer, Status};
use roomcast::ui::{self, DeliveryProgress};

const NOTIFIER_NAME: &str = "Teams";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "roomcast=debug" } else { "roomcast=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = RoomcastConfig::load(cli.config.as_deref())?;
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }

    match cli.command {
        Command::Preview(job) => preview(&config, &job),
        Command::Send(job) => send(&config, &job, cli.verbose).await,
    }
}

fn preview(config: &RoomcastConfig, job: &JobArgs) -> anyhow::Result<()> {
    let status = Status::from(job.status);
    let send_log_on: BTreeSet<Status> = config.send_log_on.iter().copied().collect();
    let logs = read_log_lines(job.log_file.as_deref(), send_log_on.contains(&status))?;

    let message = MessageComposer::new(&config.message_template).compose(
        status,
        &job.metadata(),
        &logs,
        &send_log_on,
    );
    ui::print_preview(&message);
    Ok(())
}

async fn send(config: &RoomcastConfig, job: &JobArgs, verbose: bool) -> anyhow::Result<()> {
    // Bad credentials or endpoint are fatal before any attempt.
    let notification = config.notification_config()?;
    let controller = DeliveryController::new(config.transport()?);

    let status = Status::from(job.status);
    let meta = job.metadata();
    let logs = read_log_lines(
        job.log_file.as_deref(),
        notification.send_log_on().contains(&status),
    )?;

    let pending = PendingNotification {
        controller: &controller,
        config: &notification,
        status,
        meta: &meta,
        logs: &logs,
    };
    let driver = RetryDriver::new(NOTIFIER_NAME, config.retry_config(), config.notify_on());

    let progress = DeliveryProgress::start(&format!("[{status}] {}", meta.label));
    match driver.perform(status, &pending, &progress).await {
        Ok(record) => {
            progress.complete(&record);
            if verbose {
                progress.print_record(&record);
            }
            Ok(())
        }
        Err(e) => {
            progress.fail(&e);
            Err(e.into())
        }
    }
}

/// Read log lines keeping their line breaks. Skipped when no attachment is needed.
fn read_log_lines(path: Option<&Path>, needed: bool) -> anyhow::Result<Vec<String>> {
    match path {
        Some(path) if needed => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read log file {}", path.display()))?;
            Ok(contents.split_inclusive('\n').map(str::to_string).collect())
        }
        _ => Ok(Vec::new()),
    }
}
