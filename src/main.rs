mod cli;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::*;
use console::{ConsoleView, Intent};
use repo_browser::{
    ConfigStore, DeepLinkHandler, DeepLinkRouter, FetchOrchestrator, FetchStatus, FileStore,
    GitHubClient, KeyValueStore, MemoryStore, RouteOutcome, SettingsController,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const FIRST_LOAD_TIMEOUT: Duration = Duration::from_secs(35);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Logs go to stderr, stdout is the rendered list
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store: Arc<dyn KeyValueStore> = if cli.memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            FileStore::open(&cli.store)
                .with_context(|| format!("Failed to open settings at {}", cli.store.display()))?,
        )
    };
    let config = ConfigStore::new(store).context("Failed to seed settings")?;

    println!("{}", "Repository Browser".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());
    console::print_configuration(&config.configuration());

    let client = GitHubClient::with_base_url(cli.api_url.clone())?;
    let orchestrator = FetchOrchestrator::spawn(&config, Arc::new(client)).await?;
    let settings = SettingsController::new(config.clone(), orchestrator.clone());

    let view = Arc::new(ConsoleView::new());
    let router = DeepLinkRouter::new(cli.scheme.clone());
    router.bind(&view);

    let list_subscription = orchestrator.current_list().subscribe({
        let view = Arc::clone(&view);
        move |repositories| view.update(repositories)
    });

    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<FetchStatus>();
    let status_subscription = orchestrator.status().subscribe({
        let view = Arc::clone(&view);
        move |status| {
            view.render_status(status);
            let _ = status_tx.send(status.clone());
        }
    });

    orchestrator.refresh();

    // Cold start: route the link once the first list is on screen
    if let Some(uri) = cli.open.as_deref() {
        let settled = tokio::time::timeout(FIRST_LOAD_TIMEOUT, async {
            while let Some(status) = status_rx.recv().await {
                if matches!(status, FetchStatus::Loaded { .. } | FetchStatus::Failed { .. }) {
                    break;
                }
            }
        })
        .await;
        if settled.is_err() {
            eprintln!("{}", "First load did not finish, routing link anyway".yellow());
        }
        report_route(router.open(uri));
    }

    println!("{}", "Type `help` for commands, Ctrl+C to quit.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
            // Only the cold-start path reads statuses; keep the channel drained.
            Some(_) = status_rx.recv() => {}
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match line.parse::<Intent>() {
                    Ok(Intent::Quit) => break,
                    Ok(intent) => {
                        if let Err(e) = apply(intent, &orchestrator, &settings, &router).await {
                            eprintln!("{}", e.to_string().red());
                        }
                    }
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
        }
    }

    orchestrator.current_list().unsubscribe(list_subscription);
    orchestrator.status().unsubscribe(status_subscription);
    orchestrator.shutdown();

    Ok(())
}

async fn apply(
    intent: Intent,
    orchestrator: &FetchOrchestrator,
    settings: &SettingsController,
    router: &DeepLinkRouter,
) -> repo_browser::Result<()> {
    match intent {
        Intent::Refresh => orchestrator.refresh(),
        Intent::ChangeName(name) => settings.save_target_name(&name)?,
        Intent::RestoreDefaultName => {
            let name = settings.restore_default_target_name()?;
            println!("Target restored to {}", name.bold());
        }
        Intent::ChangeKind(kind) => settings.save_kind(kind)?,
        Intent::ChangeToken(token) => settings.save_token(token.as_deref())?,
        Intent::Open(uri) => report_route(router.open(&uri)),
        Intent::ShowConfig => console::print_configuration(&settings.configuration()),
        Intent::ShowStats => {
            let stats = orchestrator.stats().await?;
            println!("Requests issued:    {}", stats.issued);
            println!("Results published:  {}", stats.published);
            println!("Stale discarded:    {}", stats.discarded);
            println!("Failed fetches:     {}", stats.failed);
            if let Some(at) = stats.last_published_at {
                println!("Last published at:  {}", at.to_rfc3339());
            }
        }
        Intent::Help => println!("{}", console::HELP),
        Intent::Quit => {}
    }
    Ok(())
}

fn report_route(outcome: RouteOutcome) {
    match outcome {
        RouteOutcome::Delivered => {}
        RouteOutcome::Unrecognized => eprintln!("{}", "Link not recognized".yellow()),
        RouteOutcome::NoTarget => eprintln!("{}", "No screen to open the link".yellow()),
    }
}
