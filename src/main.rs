//! League-notifier: fantasy league events to a GroupMe bot.
//!
//! One invocation runs one command to completion and exits:
//! 1. Refreshes franchise/player names from MFL
//! 2. Reports new trades and waiver results, and close live games
//! 3. Delivers queued messages to the chat bot
//!
//! Scheduling is external; re-running a command is always safe.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use common::{LeagueSource, MessageQueue, NotifierConfig};
use groupme_client::GroupMeClient;
use league_store::SqliteStore;
use mfl_client::MflClient;
use notifier::{chunk, CycleReport, DeliveryWorker, Pipeline};

/// Fantasy league notification bot
#[derive(Parser)]
#[command(name = "league-notifier", about = "Fantasy league notifications for GroupMe")]
struct Cli {
    /// Config file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print messages instead of publishing; record nothing.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Command {
    /// Report newly completed trades.
    Trades,
    /// Report waiver claims processed in the last day.
    Waivers,
    /// Report in-progress games within the close-game margin.
    CloseGames,
    /// Refresh franchise names.
    SyncFranchises,
    /// Refresh the player universe.
    SyncPlayers,
    /// Post queued messages to the chat bot.
    Deliver,
    /// Log in to MFL and fetch the league, then exit.
    CheckAuth,
    /// sync-franchises, trades, waivers, close-games, deliver.
    Run,
}

fn log_report(report: &CycleReport) {
    match serde_json::to_string(report) {
        Ok(line) => info!("cycle_report {}", line),
        Err(e) => warn!("Could not serialize cycle report: {}", e),
    }
}

async fn connect_mfl(cfg: &NotifierConfig) -> Result<MflClient> {
    config::require_mfl(cfg)?;
    let mfl = MflClient::new(&cfg.mfl);
    mfl.login().await.context("MFL login failed")?;
    Ok(mfl)
}

async fn sync_reference(
    pipeline: &Pipeline<'_, MflClient, SqliteStore>,
    mfl: &MflClient,
    players: bool,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        // Reference tables are left as they are.
        let count = if players {
            mfl.players().await?.len()
        } else {
            mfl.franchises().await?.len()
        };
        let what = if players { "players" } else { "franchises" };
        info!("[dry-run] fetched {} {}", count, what);
        return Ok(());
    }
    if players {
        pipeline.sync_players().await.context("player sync failed")?;
    } else {
        pipeline.sync_franchises().await.context("franchise sync failed")?;
    }
    Ok(())
}

async fn deliver(cfg: &NotifierConfig, store: &SqliteStore, dry_run: bool) -> Result<()> {
    if dry_run {
        let pending = store.receive(&cfg.store.queue_name, cfg.policy.delivery_batch_size)?;
        let bodies: Vec<&str> = pending.iter().map(|m| m.body.as_str()).collect();
        for c in chunk(&bodies, cfg.groupme.character_limit) {
            info!("[dry-run] would post:\n{}", c);
        }
        return Ok(());
    }

    config::require_groupme(cfg)?;
    let groupme = GroupMeClient::new(&cfg.groupme);
    let sent = DeliveryWorker::new(store, &groupme, cfg)
        .deliver_pending()
        .await
        .context("delivery failed")?;
    info!("Sent {} messages", sent.len());
    Ok(())
}

async fn run_upstream(
    command: Command,
    cfg: &NotifierConfig,
    store: &SqliteStore,
    dry_run: bool,
) -> Result<()> {
    let mfl = connect_mfl(cfg).await?;
    let pipeline = Pipeline::new(&mfl, store, cfg).dry_run(dry_run);

    match command {
        Command::Trades => log_report(&pipeline.run_trades().await.context("trade cycle failed")?),
        Command::Waivers => {
            log_report(&pipeline.run_waivers_now().await.context("waiver cycle failed")?)
        }
        Command::CloseGames => log_report(
            &pipeline
                .run_close_games()
                .await
                .context("close game cycle failed")?,
        ),
        Command::SyncFranchises => sync_reference(&pipeline, &mfl, false, dry_run).await?,
        Command::SyncPlayers => sync_reference(&pipeline, &mfl, true, dry_run).await?,
        Command::CheckAuth => {
            let franchises = mfl.franchises().await.context("league fetch failed")?;
            info!("✅ Auth successful! League has {} franchises", franchises.len());
        }
        Command::Run => {
            sync_reference(&pipeline, &mfl, false, dry_run).await?;
            log_report(&pipeline.run_trades().await.context("trade cycle failed")?);
            log_report(&pipeline.run_waivers_now().await.context("waiver cycle failed")?);
            log_report(
                &pipeline
                    .run_close_games()
                    .await
                    .context("close game cycle failed")?,
            );
            deliver(cfg, store, dry_run).await?;
        }
        Command::Deliver => deliver(cfg, store, dry_run).await?,
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_config(cli.config.as_deref()).context("configuration error")?;
    let store = SqliteStore::open(&cfg.store.db_path).context("failed to open store")?;

    match cli.command {
        // Delivery never talks to MFL.
        Command::Deliver => deliver(&cfg, &store, cli.dry_run).await,
        command => run_upstream(command, &cfg, &store, cli.dry_run).await,
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "league_notifier=info,notifier=info,mfl_client=info,league_store=info,groupme_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let span = info_span!("run", run_id = %Uuid::new_v4(), command = ?cli.command);

    let result = async {
        info!(
            "League notifier starting ({})",
            if cli.dry_run { "dry-run" } else { "live" }
        );
        run(cli).await
    }
    .instrument(span)
    .await;

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
